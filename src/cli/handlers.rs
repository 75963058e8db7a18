//! Subcommand handlers

use super::commands::ScanArgs;
use crate::config::{ConfigError, ScoutConfig, VersionScheme};
use crate::detector::{DetectorRegistry, DetectorType};
use crate::exec::SystemCommandRunner;
use crate::progress::{ConsoleHandler, LoggingHandler, ProgressHandler};
use crate::session::RunSession;
use crate::workflow::{exit_code_from_error, ExitCodeType, ProjectScanner};
use std::sync::Arc;
use tracing::{error, info};

/// Runs a scan and returns the process exit code.
pub fn handle_scan(args: &ScanArgs, quiet: bool) -> i32 {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCodeType::FailureConfiguration.code();
        }
    };

    let runner = Arc::new(SystemCommandRunner);
    let session = Arc::new(RunSession::new());
    let registry = DetectorRegistry::with_defaults(runner, Arc::clone(&session), config.cleanup);

    let progress: Box<dyn ProgressHandler> = if quiet || args.no_progress {
        Box::new(LoggingHandler)
    } else {
        Box::new(ConsoleHandler::new())
    };

    let scanner = ProjectScanner::new(&config, &registry, progress.as_ref());
    match scanner.scan(&session) {
        Ok(outcome) => {
            info!(
                name = %outcome.project.name,
                version = %outcome.project.version,
                documents = outcome.project.bom_files.len(),
                "Project assembled"
            );
            for file in &outcome.project.bom_files {
                info!("\t{}", file.display());
            }
            outcome.exit_code.code()
        }
        Err(err) => {
            error!("{err:#}");
            exit_code_from_error(&err).code()
        }
    }
}

/// Lists the registered detectors.
pub fn handle_detectors() -> i32 {
    let session = Arc::new(RunSession::new());
    let registry =
        DetectorRegistry::with_defaults(Arc::new(SystemCommandRunner), session, true);
    for detector in registry.detectors() {
        println!("{:8} {}", detector.detector_type().to_string(), detector.name());
    }
    ExitCodeType::Success.code()
}

fn build_config(args: &ScanArgs) -> Result<ScoutConfig, ConfigError> {
    let source_path = args
        .source_path
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let mut config = ScoutConfig::new(source_path);

    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    if let Some(excluded) = &args.exclude_detectors {
        config.excluded_detector_types = ScoutConfig::parse_detector_types(excluded)?;
    }
    config.project_name = args.project_name.clone();
    config.project_version = args.project_version.clone();
    if let Some(preferred) = &args.preferred_detector {
        config.preferred_detector_type = Some(
            DetectorType::parse(preferred)
                .ok_or_else(|| ConfigError::UnknownDetectorType(preferred.clone()))?,
        );
    }
    config.aggregate_name = args.aggregate.clone();
    if let Some(scheme) = &args.version_scheme {
        config.version_scheme = VersionScheme::parse(scheme)?;
    }
    if let Some(text) = &args.version_text {
        config.version_text = text.clone();
    }
    config.cleanup = !args.no_cleanup;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn scan_args(argv: &[&str]) -> ScanArgs {
        let mut full = vec!["bomscout", "scan"];
        full.extend(argv);
        let crate::cli::CliArgs {
            command: crate::cli::Commands::Scan(args),
            ..
        } = crate::cli::CliArgs::parse_from(full)
        else {
            panic!("expected scan command");
        };
        args
    }

    #[test]
    fn test_build_config_applies_flags() {
        let args = scan_args(&[
            "/src",
            "--depth",
            "4",
            "--preferred-detector",
            "npm",
            "--version-scheme",
            "timestamp",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.preferred_detector_type, Some(DetectorType::Npm));
        assert_eq!(config.version_scheme, VersionScheme::Timestamp);
        assert!(config.cleanup);
    }

    #[test]
    fn test_build_config_rejects_bad_detector() {
        let args = scan_args(&["--preferred-detector", "maven"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_handle_detectors_lists_without_error() {
        assert_eq!(handle_detectors(), 0);
    }

    #[test]
    fn test_handle_scan_with_missing_path_is_configuration_failure() {
        let args = scan_args(&["/definitely/not/a/path"]);
        // Validation happens inside the scanner; the handler maps it to the
        // configuration exit classification.
        assert_eq!(
            handle_scan(&args, true),
            ExitCodeType::FailureConfiguration.code()
        );
    }
}
