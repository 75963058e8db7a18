//! Preparation and extraction summary reporting

use crate::detector::{DetectorEvaluation, Extraction};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const HEADING: &str = "----------------------------------------------------------------";

/// Lists records that applied but cannot be extracted, with reasons.
pub fn print_preparation_summary(evaluations: &[DetectorEvaluation]) {
    let mut not_extractable: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for evaluation in evaluations {
        if evaluation.is_applicable() && !evaluation.is_extractable() {
            let reason = evaluation
                .extractable
                .as_ref()
                .map(|r| r.description())
                .unwrap_or_else(|| "not checked".to_string());
            not_extractable
                .entry(evaluation.environment.directory.clone())
                .or_default()
                .push(format!("{}: {}", evaluation.detector.name(), reason));
        }
    }

    if not_extractable.is_empty() {
        debug!("All applicable detectors are extractable");
        return;
    }

    info!("{HEADING}");
    info!("Preparation results: detectors that cannot be extracted");
    info!("{HEADING}");
    for (directory, lines) in not_extractable {
        info!("{}", directory.display());
        for line in lines {
            info!("\t{line}");
        }
    }
    info!("{HEADING}");
}

/// Per-detector outcome summary printed after the extraction loop.
pub fn print_extraction_summary(evaluations: &[DetectorEvaluation]) {
    info!("{HEADING}");
    info!("Extraction results");
    info!("{HEADING}");
    for evaluation in evaluations {
        let Some(extraction) = &evaluation.extraction else {
            continue;
        };
        let directory = evaluation.environment.directory.display();
        match extraction {
            Extraction::Success { code_locations, .. } => {
                info!(
                    "{} / {}: SUCCESS ({} code location(s))",
                    directory,
                    evaluation.detector.name(),
                    code_locations.len()
                );
            }
            Extraction::Failure { description } => {
                warn!(
                    "{} / {}: FAILURE - {}",
                    directory,
                    evaluation.detector.name(),
                    description
                );
            }
            Extraction::Exception { error } => {
                warn!(
                    "{} / {}: EXCEPTION - {:#}",
                    directory,
                    evaluation.detector.name(),
                    error
                );
            }
        }
    }
    info!("{HEADING}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{
        Detector, DetectorEnvironment, DetectorResult, DetectorType, ExtractionContext,
    };
    use std::sync::Arc;

    struct StubDetector;

    impl Detector for StubDetector {
        fn detector_type(&self) -> DetectorType {
            DetectorType::Gradle
        }

        fn name(&self) -> &'static str {
            "stub"
        }

        fn applicable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            DetectorResult::Passed
        }

        fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            DetectorResult::executable_not_found("gradle")
        }

        fn extract(&self, _env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
            Extraction::failure("unused")
        }
    }

    #[test]
    fn test_reports_do_not_panic() {
        let mut eval = DetectorEvaluation::new(
            Arc::new(StubDetector),
            DetectorEnvironment::new(PathBuf::from("/src"), 0),
            DetectorResult::Passed,
        );
        eval.applicable = Some(DetectorResult::Passed);
        eval.extractable = Some(DetectorResult::executable_not_found("gradle"));

        print_preparation_summary(std::slice::from_ref(&eval));

        eval.extractable = Some(DetectorResult::Passed);
        eval.extraction = Some(Extraction::failure("report was empty"));
        print_extraction_summary(std::slice::from_ref(&eval));
    }
}
