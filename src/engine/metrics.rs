use crate::observability::labels::Labels;
use metrics::{counter, histogram, Counter, Histogram};

const OUTCOME: &str = "outcome";

pub struct EngineMetrics {
    pub valid: Counter,
    pub invalid: Counter,
    pub national_checksum_unimplemented: Counter,
    pub suggestion_inputs_rejected: Counter,
    pub suggestion_count: Histogram,
}

impl EngineMetrics {
    pub fn new(labels: &Labels) -> Self {
        EngineMetrics {
            valid: counter!(
                "iban.verify",
                labels.clone_with_labels(&[(OUTCOME, "valid")])
            ),
            invalid: counter!(
                "iban.verify",
                labels.clone_with_labels(&[(OUTCOME, "invalid")])
            ),
            national_checksum_unimplemented: counter!(
                "iban.national_checksum.unimplemented",
                labels.clone()
            ),
            suggestion_inputs_rejected: counter!("iban.suggestions.rejected", labels.clone()),
            suggestion_count: histogram!("iban.suggestions.count", labels.clone()),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        EngineMetrics::new(&Labels::empty())
    }
}
