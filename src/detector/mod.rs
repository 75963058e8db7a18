//! Detector capability contract
//!
//! A detector recognizes one ecosystem's build metadata and extracts
//! dependencies from it. Detectors are stateless across directories and are
//! registered once as trait objects; the search phase asks every detector
//! about every visited directory.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod clang;
pub mod conda;
pub mod evaluation;
pub mod extraction;
pub mod gradle;
pub mod npm;
pub mod registry;

pub use evaluation::DetectorEvaluation;
pub use extraction::{Extraction, ExtractionContext, ExtractionId};
pub use registry::DetectorRegistry;

/// Ecosystem group a detector belongs to. Success/failure status is tracked
/// per group, not per detector instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DetectorType {
    Clang,
    Conda,
    Gradle,
    Npm,
}

impl DetectorType {
    pub const ALL: [DetectorType; 4] = [
        DetectorType::Clang,
        DetectorType::Conda,
        DetectorType::Gradle,
        DetectorType::Npm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DetectorType::Clang => "clang",
            DetectorType::Conda => "conda",
            DetectorType::Gradle => "gradle",
            DetectorType::Npm => "npm",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for DetectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Directory a detector is being evaluated against, plus its depth below
/// the scan root (root = 0).
#[derive(Debug, Clone)]
pub struct DetectorEnvironment {
    pub directory: PathBuf,
    pub depth: usize,
}

impl DetectorEnvironment {
    pub fn new(directory: PathBuf, depth: usize) -> Self {
        Self { directory, depth }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_file()
    }
}

/// Outcome of an applicability or extractability check. Failure reasons are
/// explicit variants so the reporting layer can render them uniformly; a
/// check that errors internally is captured as `Excepted`, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorResult {
    Passed,
    Excluded { reason: String },
    FileNotFound { pattern: String },
    ExecutableNotFound { name: String },
    Excepted { message: String },
}

impl DetectorResult {
    pub fn file_not_found(pattern: impl Into<String>) -> Self {
        DetectorResult::FileNotFound {
            pattern: pattern.into(),
        }
    }

    pub fn executable_not_found(name: impl Into<String>) -> Self {
        DetectorResult::ExecutableNotFound { name: name.into() }
    }

    pub fn passed(&self) -> bool {
        matches!(self, DetectorResult::Passed)
    }

    pub fn description(&self) -> String {
        match self {
            DetectorResult::Passed => "passed".to_string(),
            DetectorResult::Excluded { reason } => format!("excluded: {reason}"),
            DetectorResult::FileNotFound { pattern } => {
                format!("no file matching {pattern} was found")
            }
            DetectorResult::ExecutableNotFound { name } => {
                format!("the {name} executable was not found")
            }
            DetectorResult::Excepted { message } => format!("check failed: {message}"),
        }
    }
}

/// The three-method capability contract every ecosystem unit satisfies.
///
/// `applicable` must be a pure predicate over the filesystem; `extractable`
/// may probe for executables; `extract` does the work and reports its
/// outcome as an [`Extraction`], never by returning an error.
pub trait Detector: Send + Sync {
    fn detector_type(&self) -> DetectorType;

    /// Descriptive name, e.g. "clang compilation database".
    fn name(&self) -> &'static str;

    fn applicable(&self, env: &DetectorEnvironment) -> DetectorResult;

    fn extractable(&self, env: &DetectorEnvironment) -> DetectorResult;

    fn extract(&self, env: &DetectorEnvironment, ctx: &ExtractionContext) -> Extraction;
}

pub(crate) fn is_under_dir(dir: &Path, file: &Path) -> bool {
    file.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_type_roundtrip() {
        for t in DetectorType::ALL {
            assert_eq!(DetectorType::parse(t.name()), Some(t));
        }
        assert_eq!(DetectorType::parse("GRADLE"), Some(DetectorType::Gradle));
        assert_eq!(DetectorType::parse("cocoapods"), None);
    }

    #[test]
    fn test_result_descriptions() {
        assert_eq!(DetectorResult::Passed.description(), "passed");
        assert!(DetectorResult::file_not_found("package.json")
            .description()
            .contains("package.json"));
        assert!(DetectorResult::executable_not_found("conda")
            .description()
            .contains("conda"));
    }

    #[test]
    fn test_environment_file_lookup() {
        let env = DetectorEnvironment::new(std::env::temp_dir(), 0);
        assert!(!env.has_file("definitely-not-here.json"));
    }
}
