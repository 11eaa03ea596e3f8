//! Dataset snapshot policy
//!
//! The provider is fixed to one of two modes when the server starts:
//!
//! - **Cached**: the file is loaded once; every request shares that snapshot.
//! - **Reread**: every request reloads the file. Reloads are serialized through
//!   one lock so concurrent requests don't issue overlapping reads; each reload
//!   still produces its own independent snapshot.

use crate::dataset::{Dataset, DatasetError, load_lines};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

/// Source of dataset snapshots for connection handlers
#[derive(Debug)]
pub enum DatasetProvider {
    /// Loaded once at startup
    Cached(Arc<Dataset>),
    /// Reloaded from `path` on every call to [`DatasetProvider::current`]
    Reread {
        path: PathBuf,
        reload_lock: Mutex<()>,
    },
}

impl DatasetProvider {
    /// Create a provider for `path`.
    ///
    /// In cached mode the file is loaded here and a failure is returned to the
    /// caller; in reread mode nothing is read until the first request.
    pub fn new(path: &Path, reread: bool) -> Result<Self, DatasetError> {
        if reread {
            info!("Reread mode: {} will be loaded on every query", path.display());
            return Ok(Self::Reread {
                path: path.to_path_buf(),
                reload_lock: Mutex::new(()),
            });
        }

        let start = Instant::now();
        let dataset = Dataset::new(load_lines(path)?);
        info!(
            "Loaded {} lines from {} in {:.2}ms",
            dataset.len(),
            path.display(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(Self::Cached(Arc::new(dataset)))
    }

    /// Wrap an already-loaded dataset as a cached provider
    pub fn cached(dataset: Dataset) -> Self {
        Self::Cached(Arc::new(dataset))
    }

    pub fn is_reread(&self) -> bool {
        matches!(self, Self::Reread { .. })
    }

    /// The snapshot a request should search
    pub fn current(&self) -> Result<Arc<Dataset>, DatasetError> {
        match self {
            Self::Cached(dataset) => Ok(Arc::clone(dataset)),
            Self::Reread { path, reload_lock } => {
                // The lock guards no data, only the I/O
                let _guard = reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

                debug!("Reading file: {}", path.display());
                let start = Instant::now();
                let lines = load_lines(path)?;
                info!(
                    "Reread search time: {:.2}ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );
                Ok(Arc::new(Dataset::new(lines)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cached_returns_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "one\ntwo\n").unwrap();

        let provider = DatasetProvider::new(&path, false).unwrap();
        assert!(!provider.is_reread());

        let a = provider.current().unwrap();
        let b = provider.current().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_cached_ignores_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "one\n").unwrap();

        let provider = DatasetProvider::new(&path, false).unwrap();
        fs::write(&path, "one\nthree\n").unwrap();

        assert!(!provider.current().unwrap().membership().contains("three"));
    }

    #[test]
    fn test_cached_missing_file_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let err = DatasetProvider::new(&dir.path().join("missing.txt"), false).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_reread_sees_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "one\n").unwrap();

        let provider = DatasetProvider::new(&path, true).unwrap();
        assert!(provider.is_reread());
        assert!(!provider.current().unwrap().membership().contains("three"));

        fs::write(&path, "one\nthree\n").unwrap();
        assert!(provider.current().unwrap().membership().contains("three"));
    }

    #[test]
    fn test_reread_failure_is_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");

        // Construction succeeds even though the file does not exist yet
        let provider = DatasetProvider::new(&path, true).unwrap();
        assert!(provider.current().unwrap_err().is_not_found());

        fs::write(&path, "late\n").unwrap();
        assert_eq!(provider.current().unwrap().len(), 1);
    }
}
