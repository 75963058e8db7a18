//! bomscout - ecosystem-agnostic dependency discovery for source trees
//!
//! This library scans a source tree to discover which build/package
//! ecosystems are present, extracts a dependency graph from each, and
//! assembles the results into a deduplicated bill of materials per project.
//!
//! # Core Concepts
//!
//! - **Detector**: pluggable unit that recognizes one ecosystem's build
//!   metadata (npm manifests, gradle builds, conda environments, clang
//!   compilation databases) and extracts dependencies from it
//! - **Evaluation**: per-(directory, detector) record tracking the
//!   applicability, extractability, and extraction pipeline
//! - **Code Location**: a named dependency subgraph produced by one
//!   successful extraction
//!
//! # Example Usage
//!
//! ```no_run
//! use bomscout::config::ScoutConfig;
//! use bomscout::detector::DetectorRegistry;
//! use bomscout::exec::SystemCommandRunner;
//! use bomscout::progress::LoggingHandler;
//! use bomscout::session::RunSession;
//! use bomscout::workflow::ProjectScanner;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! fn scan(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScoutConfig::new(path);
//!     let session = Arc::new(RunSession::new());
//!     let registry = DetectorRegistry::with_defaults(
//!         Arc::new(SystemCommandRunner),
//!         Arc::clone(&session),
//!         config.cleanup,
//!     );
//!     let scanner = ProjectScanner::new(&config, &registry, &LoggingHandler);
//!     let outcome = scanner.scan(&session)?;
//!     println!("{} {}", outcome.project.name, outcome.project.version);
//!     Ok(())
//! }
//! ```

// Public modules
pub mod clang;
pub mod cli;
pub mod config;
pub mod detector;
pub mod exec;
pub mod extraction;
pub mod graph;
pub mod progress;
pub mod search;
pub mod session;
pub mod util;
pub mod workflow;

// Re-export key types for convenient access
pub use config::{ConfigError, ScoutConfig, VersionScheme};
pub use detector::{Detector, DetectorRegistry, DetectorType, Extraction};
pub use exec::{CommandRunner, SystemCommandRunner};
pub use graph::{CodeLocation, Dependency, DependencyGraph, ExternalId, Forge};
pub use session::RunSession;
pub use util::{init_for_cli, init_logging, LoggingConfig};
pub use workflow::{ExitCodeType, ProjectModel, ProjectScanner, RunError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_bomscout() {
        assert_eq!(NAME, "bomscout");
    }
}
