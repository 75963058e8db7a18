//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::SearchStarted { root } => {
                info!(root = %root, "Searching for detectors");
            }
            ProgressEvent::SearchComplete {
                directories,
                applicable,
            } => {
                info!(directories, applicable, "Search complete");
            }
            ProgressEvent::PreparationComplete {
                extractable,
                applicable,
            } => {
                info!(extractable, applicable, "Preparation complete");
            }
            ProgressEvent::ExtractionStarted {
                index,
                total,
                percent,
                detector,
                directory,
            } => {
                info!(
                    detector = %detector,
                    dir = %directory,
                    "Extracting {} of {} ({}%)",
                    index,
                    total,
                    percent
                );
            }
            ProgressEvent::ExtractionComplete {
                index,
                total,
                detector,
                success,
            } => {
                if *success {
                    info!(detector = %detector, "Extraction {} of {} succeeded", index, total);
                } else {
                    warn!(detector = %detector, "Extraction {} of {} failed", index, total);
                }
            }
            ProgressEvent::Completed {
                extractions,
                total_time,
            } => {
                info!(
                    extractions,
                    total_time_ms = total_time.as_millis(),
                    "Scan complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Scan failed");
            }
        }
    }
}
