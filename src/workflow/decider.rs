//! Project identity decision
//!
//! Resolves the final project name and version from a priority chain:
//! explicit configuration, then the preferred detector type's suggestion,
//! then the shallowest suggestion, then filesystem/time fallbacks. Each
//! level is consulted only when the previous produced nothing.

use crate::config::{ScoutConfig, VersionScheme};
use crate::detector::DetectorType;
use chrono::Utc;
use tracing::info;

/// A name/version suggestion from one successful extraction.
#[derive(Debug, Clone)]
pub struct DetectorProjectInfo {
    pub detector_type: DetectorType,
    pub depth: usize,
    pub name: String,
    pub version: Option<String>,
}

/// Decides the project (name, version) pair.
pub fn decide_project_name_version(
    config: &ScoutConfig,
    suggestions: &[DetectorProjectInfo],
) -> (String, String) {
    let suggestion = choose_suggestion(config, suggestions);

    let name = match non_blank(config.project_name.as_deref()) {
        Some(explicit) => explicit.to_string(),
        None => match &suggestion {
            Some(info) => info.name.clone(),
            None => {
                info!("A project name could not be decided. Using the source directory name.");
                config
                    .source_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "project".to_string())
            }
        },
    };

    let version = match non_blank(config.project_version.as_deref()) {
        Some(explicit) => explicit.to_string(),
        None => match suggestion.as_ref().and_then(|s| non_blank(s.version.as_deref())) {
            Some(suggested) => suggested.to_string(),
            None => fallback_version(config),
        },
    };

    (name, version)
}

/// Preferred detector type first; otherwise the shallowest suggestion.
/// Ties break to the first encountered, which is stable because the
/// extraction loop runs in deterministic order.
fn choose_suggestion(
    config: &ScoutConfig,
    suggestions: &[DetectorProjectInfo],
) -> Option<DetectorProjectInfo> {
    if let Some(preferred) = config.preferred_detector_type {
        let from_preferred = suggestions
            .iter()
            .filter(|s| s.detector_type == preferred)
            .min_by_key(|s| s.depth);
        if let Some(chosen) = from_preferred {
            return Some(chosen.clone());
        }
    }

    suggestions.iter().min_by_key(|s| s.depth).cloned()
}

fn fallback_version(config: &ScoutConfig) -> String {
    match config.version_scheme {
        VersionScheme::Timestamp => {
            info!("A project version could not be decided. Using the current timestamp.");
            Utc::now().format(&config.version_timeformat).to_string()
        }
        VersionScheme::Text => {
            info!("A project version could not be decided. Using the default version text.");
            config.version_text.clone()
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
