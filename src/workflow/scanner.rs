//! End-to-end scan workflow
//!
//! Ties the pipeline together: search, extraction, identity decision,
//! assembly, and the status fold that decides the exit classification.

use super::assembler::assemble;
use super::decider::{decide_project_name_version, DetectorProjectInfo};
use super::status::{exit_code_from_statuses, DetectorStatus, ExitCodeType, RunError};
use crate::config::ScoutConfig;
use crate::detector::{DetectorEvaluation, DetectorRegistry, DetectorType, Extraction};
use crate::extraction::{print_extraction_summary, ExtractionOrchestrator};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::search::{print_search_summary, search};
use crate::session::RunSession;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Final project model handed to the downstream serializer/uploader.
#[derive(Debug, Clone)]
pub struct ProjectModel {
    pub name: String,
    pub version: String,
    pub bom_files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub project: ProjectModel,
    pub exit_code: ExitCodeType,
}

pub struct ProjectScanner<'a> {
    config: &'a ScoutConfig,
    registry: &'a DetectorRegistry,
    progress: &'a dyn ProgressHandler,
}

impl<'a> ProjectScanner<'a> {
    pub fn new(
        config: &'a ScoutConfig,
        registry: &'a DetectorRegistry,
        progress: &'a dyn ProgressHandler,
    ) -> Self {
        Self {
            config,
            registry,
            progress,
        }
    }

    pub fn scan(&self, session: &RunSession) -> Result<ScanOutcome, RunError> {
        let start = Instant::now();

        self.config
            .validate()
            .map_err(|e| RunError::configuration(e.to_string()))?;

        self.progress.on_progress(&ProgressEvent::SearchStarted {
            root: self.config.source_path.display().to_string(),
        });

        let mut evaluations = search(self.config, self.registry)?;
        print_search_summary(&evaluations);

        let directories = count_directories(&evaluations);
        let applicable = evaluations.iter().filter(|e| e.is_applicable()).count();
        self.progress.on_progress(&ProgressEvent::SearchComplete {
            directories,
            applicable,
        });

        let orchestrator = ExtractionOrchestrator::new(self.config, session, self.progress);
        let extraction_result = orchestrator.perform_extractions(&mut evaluations);
        print_extraction_summary(&evaluations);

        let suggestions = collect_project_infos(&evaluations);
        let (project_name, project_version) =
            decide_project_name_version(self.config, &suggestions);
        info!(
            name = %project_name,
            version = %project_version,
            "Decided project identity"
        );

        let assembly = assemble(
            &extraction_result.code_locations,
            &project_name,
            &project_version,
            self.config,
        )?;

        // Failures first (extraction then assembly), successes overlaid
        // last: a type that succeeded anywhere is never reported failed.
        let mut statuses: BTreeMap<DetectorType, DetectorStatus> = BTreeMap::new();
        for failed in &extraction_result.failed_types {
            statuses.insert(*failed, DetectorStatus::Failure);
        }
        for failed in &assembly.failed_types {
            statuses.insert(*failed, DetectorStatus::Failure);
        }
        for succeeded in &extraction_result.successful_types {
            statuses.insert(*succeeded, DetectorStatus::Success);
        }
        debug!(?statuses, "Folded detector statuses");

        let exit_code = exit_code_from_statuses(&statuses);

        self.progress.on_progress(&ProgressEvent::Completed {
            extractions: extraction_result.code_locations.len(),
            total_time: start.elapsed(),
        });

        Ok(ScanOutcome {
            project: ProjectModel {
                name: project_name,
                version: project_version,
                bom_files: assembly.bom_files,
            },
            exit_code,
        })
    }
}

fn count_directories(evaluations: &[DetectorEvaluation]) -> usize {
    let mut dirs: Vec<&std::path::Path> = evaluations
        .iter()
        .map(|e| e.environment.directory.as_path())
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs.len()
}

fn collect_project_infos(evaluations: &[DetectorEvaluation]) -> Vec<DetectorProjectInfo> {
    evaluations
        .iter()
        .filter(|e| e.is_extraction_success())
        .filter_map(|e| match &e.extraction {
            Some(Extraction::Success {
                project_name: Some(name),
                project_version,
                ..
            }) => Some(DetectorProjectInfo {
                detector_type: e.detector_type(),
                depth: e.environment.depth,
                name: name.clone(),
                version: project_version.clone(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoOpHandler;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn registry(session: &Arc<RunSession>) -> DetectorRegistry {
        DetectorRegistry::with_defaults(
            Arc::new(crate::exec::SystemCommandRunner),
            Arc::clone(session),
            true,
        )
    }

    fn config_for(tree: &TempDir, out: &TempDir) -> ScoutConfig {
        let mut config = ScoutConfig::new(tree.path().to_path_buf());
        config.output_dir = out.path().to_path_buf();
        config
    }

    #[test]
    fn test_scan_empty_tree_is_success() {
        let tree = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let config = config_for(&tree, &out);
        let session = Arc::new(RunSession::new());
        let registry = registry(&session);

        let outcome = ProjectScanner::new(&config, &registry, &NoOpHandler)
            .scan(&session)
            .unwrap();

        assert_eq!(outcome.exit_code, ExitCodeType::Success);
        assert!(outcome.project.bom_files.is_empty());
        // Name falls back to the source directory, version to the default
        // text.
        assert_eq!(
            outcome.project.name,
            tree.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn test_scan_npm_tree_produces_project() {
        let tree = TempDir::new().unwrap();
        fs::write(
            tree.path().join("package.json"),
            r#"{"name": "webapp", "version": "2.0.1", "dependencies": {"express": "4.18.2"}}"#,
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let config = config_for(&tree, &out);
        let session = Arc::new(RunSession::new());
        let registry = registry(&session);

        let outcome = ProjectScanner::new(&config, &registry, &NoOpHandler)
            .scan(&session)
            .unwrap();

        assert_eq!(outcome.exit_code, ExitCodeType::Success);
        assert_eq!(outcome.project.name, "webapp");
        assert_eq!(outcome.project.version, "2.0.1");
        assert_eq!(outcome.project.bom_files.len(), 1);
        assert!(outcome.project.bom_files[0].exists());
    }

    #[test]
    fn test_scan_missing_source_is_configuration_error() {
        let out = TempDir::new().unwrap();
        let mut config = ScoutConfig::new(PathBuf::from("/no/such/tree"));
        config.output_dir = out.path().to_path_buf();
        let session = Arc::new(RunSession::new());
        let registry = registry(&session);

        let error = ProjectScanner::new(&config, &registry, &NoOpHandler)
            .scan(&session)
            .unwrap_err();
        assert!(matches!(error, RunError::Configuration { .. }));
    }

    #[test]
    fn test_explicit_name_overrides_detector_suggestion() {
        let tree = TempDir::new().unwrap();
        fs::write(
            tree.path().join("package.json"),
            r#"{"name": "suggested", "version": "1.0.0", "dependencies": {"x": "1.0"}}"#,
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let mut config = config_for(&tree, &out);
        config.project_name = Some("explicit".to_string());
        let session = Arc::new(RunSession::new());
        let registry = registry(&session);

        let outcome = ProjectScanner::new(&config, &registry, &NoOpHandler)
            .scan(&session)
            .unwrap();
        assert_eq!(outcome.project.name, "explicit");
    }

    #[test]
    fn test_aggregate_mode_writes_single_document() {
        let tree = TempDir::new().unwrap();
        fs::write(
            tree.path().join("package.json"),
            r#"{"name": "a", "version": "1.0.0", "dependencies": {"x": "1.0"}}"#,
        )
        .unwrap();
        fs::create_dir(tree.path().join("web")).unwrap();
        fs::write(
            tree.path().join("web/package.json"),
            r#"{"name": "b", "version": "1.0.0", "dependencies": {"y": "2.0"}}"#,
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let mut config = config_for(&tree, &out);
        config.aggregate_name = Some("all-in-one".to_string());
        let session = Arc::new(RunSession::new());
        let registry = registry(&session);

        let outcome = ProjectScanner::new(&config, &registry, &NoOpHandler)
            .scan(&session)
            .unwrap();
        assert_eq!(outcome.project.bom_files.len(), 1);
        assert_eq!(outcome.exit_code, ExitCodeType::Success);
    }

    #[test]
    fn test_empty_location_marks_type_failed() {
        let tree = TempDir::new().unwrap();
        // A manifest with no dependencies extracts successfully but its
        // code location carries nothing usable. Extraction succeeded, so
        // the overlay keeps the type successful.
        fs::write(
            tree.path().join("package.json"),
            r#"{"name": "bare", "version": "0.1.0"}"#,
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let config = config_for(&tree, &out);
        let session = Arc::new(RunSession::new());
        let registry = registry(&session);

        let outcome = ProjectScanner::new(&config, &registry, &NoOpHandler)
            .scan(&session)
            .unwrap();
        assert_eq!(outcome.exit_code, ExitCodeType::Success);
        assert!(outcome.project.bom_files.is_empty());
    }
}
