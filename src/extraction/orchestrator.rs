//! Extraction orchestration
//!
//! Two phases, never interleaved per record: prepare (extractability over
//! all applicable records) and extract (sequential, in record order, so
//! extraction ids and progress output reproduce across runs; extractors
//! may share working directories, which rules out running them
//! concurrently).

use super::report::print_preparation_summary;
use crate::config::ScoutConfig;
use crate::detector::{
    DetectorEvaluation, DetectorResult, DetectorType, Extraction, ExtractionContext,
};
use crate::graph::CodeLocation;
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::session::RunSession;
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info};

/// Aggregate of one extraction pass.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub code_locations: Vec<CodeLocation>,
    pub successful_types: BTreeSet<DetectorType>,
    pub failed_types: BTreeSet<DetectorType>,
}

pub struct ExtractionOrchestrator<'a> {
    config: &'a ScoutConfig,
    session: &'a RunSession,
    progress: &'a dyn ProgressHandler,
}

impl<'a> ExtractionOrchestrator<'a> {
    pub fn new(
        config: &'a ScoutConfig,
        session: &'a RunSession,
        progress: &'a dyn ProgressHandler,
    ) -> Self {
        Self {
            config,
            session,
            progress,
        }
    }

    pub fn perform_extractions(
        &self,
        evaluations: &mut [DetectorEvaluation],
    ) -> ExtractionResult {
        self.prepare(evaluations);
        print_preparation_summary(evaluations);

        let applicable = evaluations.iter().filter(|e| e.is_applicable()).count();
        let extractable = evaluations.iter().filter(|e| e.is_extractable()).count();
        self.progress.on_progress(&ProgressEvent::PreparationComplete {
            extractable,
            applicable,
        });

        self.extract(evaluations);
        aggregate(evaluations)
    }

    fn prepare(&self, evaluations: &mut [DetectorEvaluation]) {
        for evaluation in evaluations.iter_mut() {
            if !evaluation.is_applicable() {
                continue;
            }
            let detector = evaluation.detector.clone();
            let env = evaluation.environment.clone();
            // A check that panics is recorded on the record, not raised.
            let outcome = catch_unwind(AssertUnwindSafe(|| detector.extractable(&env)))
                .unwrap_or_else(|panic| DetectorResult::Excepted {
                    message: panic_message(panic),
                });
            evaluation.extractable = Some(outcome);
        }
    }

    fn extract(&self, evaluations: &mut [DetectorEvaluation]) {
        let extractable_indices: Vec<usize> = evaluations
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_extractable())
            .map(|(i, _)| i)
            .collect();
        let total = extractable_indices.len();

        for (ordinal, index) in extractable_indices.into_iter().enumerate() {
            let percent = ordinal * 100 / total;
            let evaluation = &mut evaluations[index];
            let detector_type = evaluation.detector_type();
            let directory = evaluation.environment.directory.display().to_string();

            self.progress.on_progress(&ProgressEvent::ExtractionStarted {
                index: ordinal + 1,
                total,
                percent,
                detector: detector_type,
                directory: directory.clone(),
            });
            info!(
                detector = %detector_type,
                dir = %directory,
                "Extracting {} of {} ({}%)",
                ordinal + 1,
                total,
                percent
            );

            let id = self.session.next_extraction_id();
            let ctx = ExtractionContext::new(id, &self.config.output_dir);
            debug!(extraction = %ctx.id, detector = %detector_type, "Starting extraction");

            let detector = evaluation.detector.clone();
            let env = evaluation.environment.clone();
            let extraction = catch_unwind(AssertUnwindSafe(|| detector.extract(&env, &ctx)))
                .unwrap_or_else(|panic| {
                    Extraction::exception(anyhow::anyhow!(panic_message(panic)))
                });

            debug!(extraction = %ctx.id, outcome = %extraction.describe(), "Finished extraction");
            let success = extraction.is_success();
            evaluation.extraction = Some(extraction);

            self.progress.on_progress(&ProgressEvent::ExtractionComplete {
                index: ordinal + 1,
                total,
                detector: detector_type,
                success,
            });
        }
    }
}

/// Folds per-record outcomes into per-type status sets. The failed set is
/// computed first, over every applicable record that did not reach a
/// successful extraction; successes overlay it afterwards, so one success
/// anywhere in the tree suppresses failure status for that type. The
/// overlay order is load-bearing; do not symmetrize it.
fn aggregate(evaluations: &[DetectorEvaluation]) -> ExtractionResult {
    let mut failed_types = BTreeSet::new();
    for evaluation in evaluations {
        if evaluation.is_applicable() && !evaluation.is_extraction_success() {
            failed_types.insert(evaluation.detector_type());
        }
    }

    let mut successful_types = BTreeSet::new();
    for evaluation in evaluations {
        if evaluation.is_extraction_success() {
            successful_types.insert(evaluation.detector_type());
        }
    }
    for success in &successful_types {
        failed_types.remove(success);
    }

    let code_locations: Vec<CodeLocation> = evaluations
        .iter()
        .filter(|e| e.is_extraction_success())
        .flat_map(|e| {
            e.extraction
                .as_ref()
                .map(|x| x.code_locations().to_vec())
                .unwrap_or_default()
        })
        .collect();

    ExtractionResult {
        code_locations,
        successful_types,
        failed_types,
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "detector panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{Detector, DetectorEnvironment};
    use crate::graph::{CodeLocation, DependencyGraph, ExternalId, NPMJS};
    use crate::progress::NoOpHandler;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Scripted detector: behavior is fixed at construction.
    struct ScriptedDetector {
        detector_type: DetectorType,
        extractable: DetectorResult,
        outcome: fn() -> Extraction,
    }

    impl Detector for ScriptedDetector {
        fn detector_type(&self) -> DetectorType {
            self.detector_type
        }

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn applicable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            DetectorResult::Passed
        }

        fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            self.extractable.clone()
        }

        fn extract(&self, _env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
            (self.outcome)()
        }
    }

    fn success_extraction() -> Extraction {
        let id = ExternalId::name_version(NPMJS, "pkg", "1.0.0");
        Extraction::success(vec![CodeLocation::new(
            PathBuf::from("/src"),
            DetectorType::Npm,
            id,
            DependencyGraph::default(),
        )])
    }

    fn evaluation(
        detector_type: DetectorType,
        dir: &str,
        extractable: DetectorResult,
        outcome: fn() -> Extraction,
    ) -> DetectorEvaluation {
        let mut eval = DetectorEvaluation::new(
            Arc::new(ScriptedDetector {
                detector_type,
                extractable,
                outcome,
            }),
            DetectorEnvironment::new(PathBuf::from(dir), 0),
            DetectorResult::Passed,
        );
        eval.applicable = Some(DetectorResult::Passed);
        eval
    }

    fn run(evaluations: &mut [DetectorEvaluation]) -> ExtractionResult {
        let out = TempDir::new().unwrap();
        let config = ScoutConfig::new(out.path().to_path_buf());
        let session = RunSession::new();
        let orchestrator = ExtractionOrchestrator::new(&config, &session, &NoOpHandler);
        orchestrator.perform_extractions(evaluations)
    }

    #[test]
    fn test_success_collects_code_locations() {
        let mut evals = vec![evaluation(
            DetectorType::Npm,
            "/a",
            DetectorResult::Passed,
            success_extraction,
        )];
        let result = run(&mut evals);
        assert_eq!(result.code_locations.len(), 1);
        assert!(result.successful_types.contains(&DetectorType::Npm));
        assert!(result.failed_types.is_empty());
    }

    #[test]
    fn test_success_anywhere_suppresses_failure() {
        let mut evals = vec![
            evaluation(DetectorType::Gradle, "/a", DetectorResult::Passed, || {
                Extraction::failure("broken build file")
            }),
            evaluation(
                DetectorType::Gradle,
                "/b",
                DetectorResult::Passed,
                success_extraction,
            ),
        ];
        let result = run(&mut evals);
        assert!(result.successful_types.contains(&DetectorType::Gradle));
        assert!(!result.failed_types.contains(&DetectorType::Gradle));
    }

    #[test]
    fn test_failure_without_success_is_reported() {
        let mut evals = vec![evaluation(DetectorType::Conda, "/a", DetectorResult::Passed, || {
            Extraction::exception(anyhow::anyhow!("conda blew up"))
        })];
        let result = run(&mut evals);
        assert!(result.failed_types.contains(&DetectorType::Conda));
        assert!(result.successful_types.is_empty());
        assert!(matches!(
            evals[0].extraction,
            Some(Extraction::Exception { .. })
        ));
    }

    #[test]
    fn test_unextractable_record_counts_as_failed() {
        let mut evals = vec![evaluation(
            DetectorType::Gradle,
            "/a",
            DetectorResult::executable_not_found("gradle"),
            success_extraction,
        )];
        let result = run(&mut evals);
        assert!(evals[0].extraction.is_none());
        assert!(result.failed_types.contains(&DetectorType::Gradle));
    }

    #[test]
    fn test_extraction_ids_are_sequential_per_run() {
        let mut evals = vec![
            evaluation(DetectorType::Npm, "/a", DetectorResult::Passed, success_extraction),
            evaluation(DetectorType::Npm, "/b", DetectorResult::Passed, success_extraction),
        ];
        let out = TempDir::new().unwrap();
        let config = ScoutConfig::new(out.path().to_path_buf());
        let session = RunSession::new();
        let orchestrator = ExtractionOrchestrator::new(&config, &session, &NoOpHandler);
        orchestrator.perform_extractions(&mut evals);
        // Two extractions consumed ids 1 and 2; the next is 3.
        assert_eq!(session.next_extraction_id().0, 3);
    }

    #[test]
    fn test_zero_applicable_yields_empty_result() {
        let mut evals: Vec<DetectorEvaluation> = Vec::new();
        let result = run(&mut evals);
        assert!(result.code_locations.is_empty());
        assert!(result.successful_types.is_empty());
        assert!(result.failed_types.is_empty());
    }

    /// Detector whose extractability check itself blows up.
    struct PanickyPrepDetector;

    impl Detector for PanickyPrepDetector {
        fn detector_type(&self) -> DetectorType {
            DetectorType::Conda
        }

        fn name(&self) -> &'static str {
            "panicky"
        }

        fn applicable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            DetectorResult::Passed
        }

        fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            panic!("extractability probe bug")
        }

        fn extract(&self, _env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
            Extraction::success(vec![])
        }
    }

    #[test]
    fn test_panicking_extractability_check_is_captured() {
        let mut eval = DetectorEvaluation::new(
            Arc::new(PanickyPrepDetector),
            DetectorEnvironment::new(PathBuf::from("/a"), 0),
            DetectorResult::Passed,
        );
        eval.applicable = Some(DetectorResult::Passed);
        let mut evals = vec![eval];

        let result = run(&mut evals);
        assert!(matches!(
            evals[0].extractable,
            Some(DetectorResult::Excepted { .. })
        ));
        assert!(evals[0].extraction.is_none());
        assert!(result.failed_types.contains(&DetectorType::Conda));
    }

    #[test]
    fn test_panicking_extraction_is_captured() {
        let mut evals = vec![evaluation(DetectorType::Npm, "/a", DetectorResult::Passed, || {
            panic!("detector bug")
        })];
        let result = run(&mut evals);
        assert!(result.failed_types.contains(&DetectorType::Npm));
        assert!(matches!(
            evals[0].extraction,
            Some(Extraction::Exception { .. })
        ));
    }
}
