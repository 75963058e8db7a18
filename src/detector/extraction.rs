//! Extraction outcome types

use crate::graph::CodeLocation;
use std::fmt;
use std::path::PathBuf;

/// Run-scoped ordinal assigned to each extraction, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractionId(pub usize);

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extraction-{}", self.0)
    }
}

/// Per-extraction context handed to a detector: its run-scoped id and a
/// scratch directory it may write intermediate files into.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub id: ExtractionId,
    pub output_dir: PathBuf,
}

impl ExtractionContext {
    pub fn new(id: ExtractionId, run_output_dir: &std::path::Path) -> Self {
        Self {
            output_dir: run_output_dir.join(id.to_string()),
            id,
        }
    }
}

/// Tagged result of running one detector's extraction. Exactly one variant
/// applies; a success never also carries a failure reason.
#[derive(Debug)]
pub enum Extraction {
    Success {
        code_locations: Vec<CodeLocation>,
        project_name: Option<String>,
        project_version: Option<String>,
    },
    Failure {
        description: String,
    },
    Exception {
        error: anyhow::Error,
    },
}

impl Extraction {
    pub fn success(code_locations: Vec<CodeLocation>) -> Self {
        Extraction::Success {
            code_locations,
            project_name: None,
            project_version: None,
        }
    }

    pub fn success_with_project(
        code_locations: Vec<CodeLocation>,
        project_name: Option<String>,
        project_version: Option<String>,
    ) -> Self {
        Extraction::Success {
            code_locations,
            project_name,
            project_version,
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Extraction::Failure {
            description: description.into(),
        }
    }

    pub fn exception(error: anyhow::Error) -> Self {
        Extraction::Exception { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Extraction::Success { .. })
    }

    pub fn code_locations(&self) -> &[CodeLocation] {
        match self {
            Extraction::Success { code_locations, .. } => code_locations,
            _ => &[],
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Extraction::Success { code_locations, .. } => {
                format!("success: {} code location(s)", code_locations.len())
            }
            Extraction::Failure { description } => format!("failure: {description}"),
            Extraction::Exception { error } => format!("exception: {error:#}"),
        }
    }
}
