//! Process-wide performance counters

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Counters reported in logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    /// Queries that completed a search
    pub total_queries: u64,
    /// Running mean of search time in milliseconds over all queries
    pub avg_response_ms: f64,
    /// Highest number of connections handled at once
    pub max_concurrent: usize,
}

/// Shared aggregator; every update takes the one lock
#[derive(Debug, Default)]
pub struct Stats {
    inner: Mutex<PerformanceStats>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one search time into the running average
    pub fn record_query(&self, response_ms: f64) -> PerformanceStats {
        let mut stats = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        stats.total_queries += 1;
        let n = stats.total_queries as f64;
        stats.avg_response_ms = (stats.avg_response_ms * (n - 1.0) + response_ms) / n;
        *stats
    }

    /// Raise the peak if `current` exceeds it; returns the peak
    pub fn observe_concurrency(&self, current: usize) -> usize {
        let mut stats = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        stats.max_concurrent = stats.max_concurrent.max(current);
        stats.max_concurrent
    }

    pub fn snapshot(&self) -> PerformanceStats {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
