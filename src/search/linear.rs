//! Linear scan in file order

use crate::dataset::Dataset;
use crate::search::SearchStrategy;

/// Scans lines in file order; needs no lookup structure
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSearch;

impl SearchStrategy for LinearSearch {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn exists(&self, query: &str, dataset: &Dataset) -> bool {
        dataset.lines().iter().any(|line| &**line == query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_does_not_build_sorted_view() {
        let ds = Dataset::from_lines(["b", "a"]);
        assert!(LinearSearch.exists("a", &ds));
        assert!(!ds.has_sorted_view());
    }
}
