//! Binary search over the sorted view

use crate::dataset::Dataset;
use crate::search::SearchStrategy;

/// Lower-bound binary search on [`Dataset::sorted`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySearch;

impl SearchStrategy for BinarySearch {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn prepare(&self, dataset: &Dataset) {
        dataset.sorted();
    }

    fn exists(&self, query: &str, dataset: &Dataset) -> bool {
        contains_sorted(dataset.sorted(), query)
    }
}

/// Whether `query` occurs in an ascending slice.
///
/// Finds the first element not less than `query` and checks it for equality.
pub fn contains_sorted<S: AsRef<str>>(sorted: &[S], query: &str) -> bool {
    let idx = sorted.partition_point(|line| line.as_ref() < query);
    idx < sorted.len() && sorted[idx].as_ref() == query
}
