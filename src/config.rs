use crate::observability::labels::Labels;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DefaultOnNull;

/// Shortest input the suggester will consider an IBAN attempt.
pub const DEFAULT_MIN_SUGGESTION_INPUT_LENGTH: usize = 5;
/// Longest input the suggester will consider (the longest IBAN has 34 characters).
pub const DEFAULT_MAX_SUGGESTION_INPUT_LENGTH: usize = 34;

#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub labels: Labels,

    /// When false, a suggestion found by both search strategies is returned twice.
    pub deduplicate_suggestions: bool,

    pub min_suggestion_input_length: usize,
    pub max_suggestion_input_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            labels: Labels::empty(),
            deduplicate_suggestions: false,
            min_suggestion_input_length: DEFAULT_MIN_SUGGESTION_INPUT_LENGTH,
            max_suggestion_input_length: DEFAULT_MAX_SUGGESTION_INPUT_LENGTH,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self, labels: Labels) -> Self {
        self.mutate_clone(|x| x.labels = labels)
    }

    pub fn deduplicate_suggestions(&self, value: bool) -> Self {
        self.mutate_clone(|x| x.deduplicate_suggestions = value)
    }

    pub fn suggestion_input_length(&self, min: usize, max: usize) -> Self {
        self.mutate_clone(|x| {
            x.min_suggestion_input_length = min;
            x.max_suggestion_input_length = max;
        })
    }

    fn mutate_clone(&self, modify: impl FnOnce(&mut Self)) -> Self {
        let mut clone = self.clone();
        modify(&mut clone);
        clone
    }
}
