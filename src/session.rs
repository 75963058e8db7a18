//! Per-run shared state
//!
//! Extraction ids and the native resolver's dedup memoization live on an
//! explicit session object passed by reference into the orchestrator and
//! resolver, so two runs in the same process never leak state into each
//! other. The two guarded sets are the only concurrently-mutated state in
//! the whole pipeline; both use a locked check-then-insert so a path or
//! package is claimed at most once even under parallel workers.

use crate::clang::PackageDetails;
use crate::detector::ExtractionId;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct RunSession {
    extraction_counter: AtomicUsize,
    processed_dependency_files: Mutex<HashSet<PathBuf>>,
    processed_packages: Mutex<HashSet<PackageDetails>>,
}

impl RunSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next extraction id, monotonically increasing from 1.
    pub fn next_extraction_id(&self) -> ExtractionId {
        ExtractionId(self.extraction_counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Claims a dependency file for processing. Returns false when the file
    /// was already claimed earlier in this run.
    pub fn claim_dependency_file(&self, path: &Path) -> bool {
        let mut seen = self
            .processed_dependency_files
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        seen.insert(path.to_path_buf())
    }

    /// Claims a resolved package. Returns false when an equal (name,
    /// version, architecture) triple was already claimed in this run.
    pub fn claim_package(&self, package: &PackageDetails) -> bool {
        let mut seen = self
            .processed_packages
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        seen.insert(package.clone())
    }
}
