//! Hash-set membership

use crate::dataset::Dataset;
use crate::search::SearchStrategy;

/// Membership test against [`Dataset::membership`]; the server default
#[derive(Debug, Clone, Copy, Default)]
pub struct SetSearch;

impl SearchStrategy for SetSearch {
    fn name(&self) -> &'static str {
        "set"
    }

    fn prepare(&self, dataset: &Dataset) {
        dataset.membership();
    }

    fn exists(&self, query: &str, dataset: &Dataset) -> bool {
        dataset.membership().contains(query)
    }
}
