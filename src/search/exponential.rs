//! Exponential search over the sorted view

use crate::dataset::Dataset;
use crate::search::SearchStrategy;
use crate::search::binary::contains_sorted;

/// Doubling probe on [`Dataset::sorted`] followed by a bounded binary search
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialSearch;

impl SearchStrategy for ExponentialSearch {
    fn name(&self) -> &'static str {
        "exponential"
    }

    fn prepare(&self, dataset: &Dataset) {
        dataset.sorted();
    }

    fn exists(&self, query: &str, dataset: &Dataset) -> bool {
        exponential_contains(dataset.sorted(), query)
    }
}

/// Exponential search on an ascending slice; an empty slice contains nothing
pub fn exponential_contains<S: AsRef<str>>(sorted: &[S], query: &str) -> bool {
    let n = sorted.len();
    if n == 0 {
        return false;
    }
    if sorted[0].as_ref() == query {
        return true;
    }

    let mut bound = 1;
    while bound < n && sorted[bound].as_ref() <= query {
        bound *= 2;
    }

    contains_sorted(&sorted[bound / 2..bound.min(n)], query)
}
