//! Jump search over the sorted view

use crate::dataset::Dataset;
use crate::search::SearchStrategy;

/// Block-skipping search on [`Dataset::sorted`] with blocks of ⌊√n⌋ lines
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpSearch;

impl SearchStrategy for JumpSearch {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn prepare(&self, dataset: &Dataset) {
        dataset.sorted();
    }

    fn exists(&self, query: &str, dataset: &Dataset) -> bool {
        jump_contains(dataset.sorted(), query)
    }
}

/// Jump search on an ascending slice
pub fn jump_contains<S: AsRef<str>>(sorted: &[S], query: &str) -> bool {
    let n = sorted.len();
    let block = n.isqrt().max(1);

    // Advance whole blocks while the block start is still <= query
    let mut prev = 0;
    let mut curr = 0;
    while curr < n && sorted[curr].as_ref() <= query {
        prev = curr;
        curr = (curr + block).min(n);
    }

    sorted[prev..curr].iter().any(|line| line.as_ref() == query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_block_boundaries() {
        // 16 entries, block size 4
        let sorted: Vec<String> = (0..16).map(|i| format!("{:02}", i * 2)).collect();
        for i in 0..16 {
            assert!(jump_contains(&sorted, &format!("{:02}", i * 2)));
            assert!(!jump_contains(&sorted, &format!("{:02}", i * 2 + 1)));
        }
        assert!(!jump_contains(&sorted, "-1"));
    }

    #[test]
    fn test_jump_small_inputs() {
        assert!(!jump_contains::<&str>(&[], "a"));
        assert!(jump_contains(&["a"], "a"));
        assert!(jump_contains(&["a", "b"], "b"));
        assert!(!jump_contains(&["a", "c"], "b"));
    }
}
