//! Configuration for a scan run
//!
//! Settings come from CLI arguments with `BOMSCOUT_*` environment-variable
//! fallbacks and sensible defaults. A config is validated once, before the
//! run starts; validation failures are user-actionable and carry the
//! configuration exit classification.
//!
//! # Environment Variables
//!
//! - `BOMSCOUT_OUTPUT_DIR`: output directory - default: system temp dir + "bomscout-output"
//! - `BOMSCOUT_MAX_DEPTH`: search depth bound - default: "10"
//! - `BOMSCOUT_LOG_LEVEL`: logging level - default: "info"

use crate::detector::DetectorType;
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 10;
const DEFAULT_VERSION_TIMEFORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const DEFAULT_VERSION_TEXT: &str = "Default Version";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Source path does not exist: {0}")]
    SourcePathNotFound(PathBuf),

    #[error("Source path is not a directory: {0}")]
    SourcePathNotDirectory(PathBuf),

    #[error("Unknown detector type: {0}. Valid types: clang, conda, gradle, npm")]
    UnknownDetectorType(String),

    #[error("Invalid version scheme: {0}. Valid schemes: text, timestamp")]
    InvalidVersionScheme(String),
}

/// How the project version falls back when nothing declared one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionScheme {
    #[default]
    Text,
    Timestamp,
}

impl VersionScheme {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "text" => Ok(VersionScheme::Text),
            "timestamp" => Ok(VersionScheme::Timestamp),
            other => Err(ConfigError::InvalidVersionScheme(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// Root of the source tree to scan
    pub source_path: PathBuf,

    /// Directory extraction scratch files and BOM documents land in
    pub output_dir: PathBuf,

    /// Maximum directory depth the search descends to
    pub max_depth: usize,

    /// Detector types skipped during search
    pub excluded_detector_types: BTreeSet<DetectorType>,

    /// Explicit project name; wins over every suggestion
    pub project_name: Option<String>,

    /// Explicit project version; wins over every suggestion
    pub project_version: Option<String>,

    /// Detector type whose name/version suggestion is preferred
    pub preferred_detector_type: Option<DetectorType>,

    /// When set, all code locations merge into one document of this name
    pub aggregate_name: Option<String>,

    /// Fallback scheme when no version was decided
    pub version_scheme: VersionScheme,

    /// chrono format string used by the timestamp scheme
    pub version_timeformat: String,

    /// Fixed fallback used by the text scheme
    pub version_text: String,

    /// Remove intermediate dependency files after extraction
    pub cleanup: bool,
}

impl ScoutConfig {
    /// Creates a config for `source_path` with environment-variable
    /// fallbacks applied to everything else.
    pub fn new(source_path: PathBuf) -> Self {
        let output_dir = env::var("BOMSCOUT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("bomscout-output"));

        let max_depth = env::var("BOMSCOUT_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_DEPTH);

        Self {
            source_path,
            output_dir,
            max_depth,
            excluded_detector_types: BTreeSet::new(),
            project_name: None,
            project_version: None,
            preferred_detector_type: None,
            aggregate_name: None,
            version_scheme: VersionScheme::default(),
            version_timeformat: DEFAULT_VERSION_TIMEFORMAT.to_string(),
            version_text: DEFAULT_VERSION_TEXT.to_string(),
            cleanup: true,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source_path.exists() {
            return Err(ConfigError::SourcePathNotFound(self.source_path.clone()));
        }
        if !self.source_path.is_dir() {
            return Err(ConfigError::SourcePathNotDirectory(
                self.source_path.clone(),
            ));
        }
        Ok(())
    }

    /// Parses a comma-separated list of detector type names.
    pub fn parse_detector_types(value: &str) -> Result<BTreeSet<DetectorType>, ConfigError> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                DetectorType::parse(s).ok_or_else(|| ConfigError::UnknownDetectorType(s.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_validate_accepts_directory() {
        let dir = TempDir::new().unwrap();
        let config = ScoutConfig::new(dir.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_path() {
        let config = ScoutConfig::new(PathBuf::from("/no/such/source"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourcePathNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_file_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ScoutConfig::new(file.path().to_path_buf());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SourcePathNotDirectory(_))
        ));
    }

    #[test]
    fn test_parse_detector_types() {
        let types = ScoutConfig::parse_detector_types("npm, gradle").unwrap();
        assert_eq!(
            types,
            BTreeSet::from([DetectorType::Npm, DetectorType::Gradle])
        );
        assert!(ScoutConfig::parse_detector_types("npm,maven").is_err());
    }

    #[test]
    fn test_version_scheme_parse() {
        assert_eq!(VersionScheme::parse("text").unwrap(), VersionScheme::Text);
        assert_eq!(
            VersionScheme::parse("TIMESTAMP").unwrap(),
            VersionScheme::Timestamp
        );
        assert!(VersionScheme::parse("semver").is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_max_depth() {
        env::set_var("BOMSCOUT_MAX_DEPTH", "3");
        let dir = TempDir::new().unwrap();
        let config = ScoutConfig::new(dir.path().to_path_buf());
        assert_eq!(config.max_depth, 3);
        env::remove_var("BOMSCOUT_MAX_DEPTH");
    }

    #[test]
    #[serial]
    fn test_default_max_depth_without_env() {
        env::remove_var("BOMSCOUT_MAX_DEPTH");
        let dir = TempDir::new().unwrap();
        let config = ScoutConfig::new(dir.path().to_path_buf());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }
}
