//! Exit classification
//!
//! Two disjoint call paths produce the process exit: an error that aborted
//! the run is classified by its variant, and a run that completed is
//! classified from the per-detector-type status fold. The two are never
//! combined.

use crate::detector::DetectorType;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCodeType {
    Success,
    FailureDetector,
    FailureConfiguration,
    FailureFeatureError,
    FailureGeneralError,
    FailureUnknownError,
}

impl ExitCodeType {
    pub fn code(self) -> i32 {
        match self {
            ExitCodeType::Success => 0,
            ExitCodeType::FailureDetector => 1,
            ExitCodeType::FailureConfiguration => 2,
            ExitCodeType::FailureFeatureError => 3,
            ExitCodeType::FailureGeneralError => 4,
            ExitCodeType::FailureUnknownError => 100,
        }
    }
}

/// Final per-type outcome after the success-overlays-failure fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorStatus {
    Success,
    Failure,
}

/// Errors that abort a run.
///
/// `ServiceApi` and `Rest` model the out-of-scope upload client's failure
/// modes; they must still classify correctly when that collaborator raises
/// them through this layer.
#[derive(Debug, Error)]
pub enum RunError {
    /// User-actionable configuration or environment problem. Carries its
    /// own exit classification.
    #[error("{message}")]
    Configuration {
        message: String,
        exit_code: ExitCodeType,
    },

    /// The remote service rejected a request at the API level.
    #[error("service api error: {0}")]
    ServiceApi(String),

    /// A REST-level failure talking to the remote service.
    #[error("service rest error (status {status}): {message}")]
    Rest { status: u16, message: String },

    /// Any other failure in the integration layer.
    #[error("integration error: {0}")]
    Integration(String),

    /// Anything unrecognized.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl RunError {
    pub fn configuration(message: impl Into<String>) -> Self {
        RunError::Configuration {
            message: message.into(),
            exit_code: ExitCodeType::FailureConfiguration,
        }
    }
}

/// Classifies an error that aborted the run, most specific first.
pub fn exit_code_from_error(error: &RunError) -> ExitCodeType {
    match error {
        RunError::Configuration { exit_code, .. } => *exit_code,
        RunError::ServiceApi(_) => ExitCodeType::FailureFeatureError,
        RunError::Rest { .. } => ExitCodeType::FailureFeatureError,
        RunError::Integration(_) => ExitCodeType::FailureGeneralError,
        RunError::Unexpected(_) => ExitCodeType::FailureUnknownError,
    }
}

/// Classifies a completed run from its folded per-type statuses.
pub fn exit_code_from_statuses(
    statuses: &BTreeMap<DetectorType, DetectorStatus>,
) -> ExitCodeType {
    if statuses
        .values()
        .any(|status| *status == DetectorStatus::Failure)
    {
        ExitCodeType::FailureDetector
    } else {
        ExitCodeType::Success
    }
}
