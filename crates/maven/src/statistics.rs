//! Resolved-request statistics hook.

use depot_core::Location;
use std::collections::HashMap;
use std::sync::Mutex;

/// Receives "artifact resolved" events from the facade.
///
/// Fire and forget: implementations must not fail the calling request, so
/// the hook returns nothing and swallows its own errors.
pub trait StatisticsHook: Send + Sync {
    fn record_resolved(&self, repository: &str, gav: &Location);
}

/// In-process counter keyed by repository and path.
#[derive(Default)]
pub struct InMemoryStatistics {
    counters: Mutex<HashMap<(String, String), u64>>,
}

impl InMemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, repository: &str, gav: &Location) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(&(repository.to_string(), gav.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.values().sum()
    }
}

impl StatisticsHook for InMemoryStatistics {
    fn record_resolved(&self, repository: &str, gav: &Location) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters
            .entry((repository.to_string(), gav.to_string()))
            .or_insert(0) += 1;
    }
}

/// Hook that drops every event. Used when statistics are disabled.
pub struct NoopStatistics;

impl StatisticsHook for NoopStatistics {
    fn record_resolved(&self, _repository: &str, _gav: &Location) {}
}
