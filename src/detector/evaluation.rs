//! Per-(directory, detector) evaluation record

use super::{Detector, DetectorEnvironment, DetectorResult, DetectorType, Extraction};
use std::sync::Arc;

/// State holder threaded through the pipeline for one (directory, detector)
/// pair. Outcomes are populated in strict order: search, then applicability,
/// then extractability, then extraction; a later outcome is never set when
/// an earlier required stage did not pass. Once extraction completes the
/// record is no longer mutated.
pub struct DetectorEvaluation {
    pub detector: Arc<dyn Detector>,
    pub environment: DetectorEnvironment,
    pub searchable: DetectorResult,
    pub applicable: Option<DetectorResult>,
    pub extractable: Option<DetectorResult>,
    pub extraction: Option<Extraction>,
}

impl DetectorEvaluation {
    pub fn new(
        detector: Arc<dyn Detector>,
        environment: DetectorEnvironment,
        searchable: DetectorResult,
    ) -> Self {
        Self {
            detector,
            environment,
            searchable,
            applicable: None,
            extractable: None,
            extraction: None,
        }
    }

    pub fn detector_type(&self) -> DetectorType {
        self.detector.detector_type()
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable.passed()
    }

    pub fn is_applicable(&self) -> bool {
        self.is_searchable() && matches!(&self.applicable, Some(r) if r.passed())
    }

    pub fn is_extractable(&self) -> bool {
        self.is_applicable() && matches!(&self.extractable, Some(r) if r.passed())
    }

    pub fn is_extraction_success(&self) -> bool {
        self.is_extractable() && matches!(&self.extraction, Some(e) if e.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ExtractionContext;
    use std::path::PathBuf;

    struct StubDetector;

    impl Detector for StubDetector {
        fn detector_type(&self) -> DetectorType {
            DetectorType::Npm
        }

        fn name(&self) -> &'static str {
            "stub"
        }

        fn applicable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            DetectorResult::Passed
        }

        fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
            DetectorResult::Passed
        }

        fn extract(&self, _env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
            Extraction::success(vec![])
        }
    }

    fn evaluation(searchable: DetectorResult) -> DetectorEvaluation {
        DetectorEvaluation::new(
            Arc::new(StubDetector),
            DetectorEnvironment::new(PathBuf::from("/tmp"), 0),
            searchable,
        )
    }

    #[test]
    fn test_stage_gating() {
        let mut eval = evaluation(DetectorResult::Passed);
        assert!(!eval.is_applicable());
        assert!(!eval.is_extractable());
        assert!(!eval.is_extraction_success());

        eval.applicable = Some(DetectorResult::Passed);
        assert!(eval.is_applicable());
        assert!(!eval.is_extractable());

        eval.extractable = Some(DetectorResult::Passed);
        assert!(eval.is_extractable());
        assert!(!eval.is_extraction_success());

        eval.extraction = Some(Extraction::success(vec![]));
        assert!(eval.is_extraction_success());
    }

    #[test]
    fn test_excluded_search_blocks_later_stages() {
        let mut eval = evaluation(DetectorResult::Excluded {
            reason: "excluded by configuration".to_string(),
        });
        eval.applicable = Some(DetectorResult::Passed);
        assert!(!eval.is_applicable());
    }

    #[test]
    fn test_failed_extraction_is_not_success() {
        let mut eval = evaluation(DetectorResult::Passed);
        eval.applicable = Some(DetectorResult::Passed);
        eval.extractable = Some(DetectorResult::Passed);
        eval.extraction = Some(Extraction::failure("tool output was empty"));
        assert!(!eval.is_extraction_success());
    }
}
