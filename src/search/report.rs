//! Search summary reporting

use crate::detector::DetectorEvaluation;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

const HEADING: &str = "----------------------------------------------------------------";

/// Prints which detectors applied where: an info-level digest of applying
/// directories, and a debug-level breakdown including everything that did
/// not apply and why.
pub fn print_search_summary(evaluations: &[DetectorEvaluation]) {
    let by_directory = group_by_directory(evaluations);

    info!("{HEADING}");
    info!("Search results");
    info!("{HEADING}");
    for (directory, evals) in &by_directory {
        let mut applied: Vec<String> = evals
            .iter()
            .filter(|e| e.is_applicable())
            .map(|e| e.detector.name().to_string())
            .collect();
        if applied.is_empty() {
            continue;
        }
        applied.sort();
        info!("{}", directory.display());
        info!("\tAPPLIES: {}", applied.join(", "));
    }
    info!("{HEADING}");

    for (directory, evals) in &by_directory {
        debug!("Detailed search results for {}", directory.display());
        let mut lines: Vec<String> = evals
            .iter()
            .map(|e| {
                if e.is_applicable() {
                    format!("      APPLIED: {}", e.detector.name())
                } else {
                    let reason = e
                        .applicable
                        .as_ref()
                        .map(|r| r.description())
                        .unwrap_or_else(|| e.searchable.description());
                    format!("DID NOT APPLY: {} - {}", e.detector.name(), reason)
                }
            })
            .collect();
        lines.sort();
        for line in lines {
            debug!("{line}");
        }
    }
}

fn group_by_directory(
    evaluations: &[DetectorEvaluation],
) -> BTreeMap<PathBuf, Vec<&DetectorEvaluation>> {
    let mut by_directory: BTreeMap<PathBuf, Vec<&DetectorEvaluation>> = BTreeMap::new();
    for evaluation in evaluations {
        by_directory
            .entry(evaluation.environment.directory.clone())
            .or_default()
            .push(evaluation);
    }
    by_directory
}
