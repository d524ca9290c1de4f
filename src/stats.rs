use lazy_static::lazy_static;
use metrics::{counter, Counter};

lazy_static! {
    pub static ref GLOBAL_STATS: Stats = Stats::new();
}

/// Process-wide counters, independent of any engine.
pub struct Stats {
    pub registry_loads: Counter,
    pub mistranscription_loads: Counter,
    pub engine_creations: Counter,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            registry_loads: counter!("iban.registry.loads"),
            mistranscription_loads: counter!("iban.mistranscriptions.loads"),
            engine_creations: counter!("iban.engine.creations"),
        }
    }
}
