//! Detector registry

use super::clang::ClangDetector;
use super::conda::CondaDetector;
use super::gradle::GradleDetector;
use super::npm::NpmDetector;
use super::Detector;
use crate::exec::CommandRunner;
use crate::session::RunSession;
use std::sync::Arc;

/// Fixed table of registered detectors. Registration order is the
/// evaluation order within a directory, so it stays stable across runs.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(
        runner: Arc<dyn CommandRunner>,
        session: Arc<RunSession>,
        cleanup: bool,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ClangDetector::new(
            Arc::clone(&runner),
            session,
            cleanup,
        )));
        registry.register(Arc::new(CondaDetector::new(Arc::clone(&runner))));
        registry.register(Arc::new(GradleDetector::new(Arc::clone(&runner))));
        registry.register(Arc::new(NpmDetector));
        registry
    }

    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
