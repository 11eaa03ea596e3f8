//! In-memory dataset snapshots.
//!
//! A [`Dataset`] is one immutable materialization of the search file: the
//! ordered, trimmed, non-empty lines it contained when it was loaded. Lookup
//! structures (a sorted view and a hash set) are built lazily the first time a
//! strategy asks for them and then live as long as the snapshot does, so a
//! cached dataset pays the sort cost once per process instead of once per query.
//!
//! ## Modules
//!
//! - [`loader`] - Reading a file into lines, with distinct failure kinds
//! - [`provider`] - Cached vs reread-per-query snapshot policy
//! - [`sort`] - Offline numeric sort of dataset files

pub mod loader;
pub mod provider;
pub mod sort;

pub use loader::{DatasetError, load_lines};
pub use provider::DatasetProvider;

use ahash::AHashSet;
use rayon::prelude::*;
use std::sync::{Arc, OnceLock};

/// Above this many lines the sorted view is built with a parallel sort
const PARALLEL_SORT_THRESHOLD: usize = 64 * 1024;

/// An immutable snapshot of the dataset file
#[derive(Debug, Default)]
pub struct Dataset {
    /// Lines in original file order
    lines: Vec<Arc<str>>,
    /// Ascending copy of `lines`, built on first access
    sorted: OnceLock<Vec<Arc<str>>>,
    /// Hash set over `lines`, built on first access
    membership: OnceLock<AHashSet<Arc<str>>>,
}

impl Dataset {
    /// Wrap already-cleaned lines (order is preserved as given)
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter().map(Arc::from).collect(),
            sorted: OnceLock::new(),
            membership: OnceLock::new(),
        }
    }

    /// Build a dataset from raw lines, trimming and dropping blanks the same
    /// way the loader does
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            lines
                .into_iter()
                .map(|l| l.as_ref().trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in file order
    pub fn lines(&self) -> &[Arc<str>] {
        &self.lines
    }

    /// Lines in ascending byte order
    pub fn sorted(&self) -> &[Arc<str>] {
        self.sorted.get_or_init(|| {
            let mut sorted = self.lines.clone();
            if sorted.len() >= PARALLEL_SORT_THRESHOLD {
                sorted.par_sort_unstable();
            } else {
                sorted.sort_unstable();
            }
            sorted
        })
    }

    /// Hash set of every line, for O(1) membership tests
    pub fn membership(&self) -> &AHashSet<Arc<str>> {
        self.membership
            .get_or_init(|| self.lines.iter().cloned().collect())
    }

    /// Whether the sorted view has been materialized yet
    pub fn has_sorted_view(&self) -> bool {
        self.sorted.get().is_some()
    }
}
