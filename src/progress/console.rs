//! Interactive console progress bar

use super::{ProgressEvent, ProgressHandler};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Handler that renders the extraction loop as an indicatif progress bar.
/// Non-extraction events pass through to stderr-friendly bar messages.
#[derive(Default)]
pub struct ConsoleHandler {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_bar(&self, total: usize) -> ProgressBar {
        let mut guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .get_or_insert_with(|| {
                let bar = ProgressBar::new(total as u64);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner} [{bar:30}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
                );
                bar
            })
            .clone()
    }

    fn finish(&self) {
        let guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = guard.as_ref() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressHandler for ConsoleHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::ExtractionStarted {
                total,
                detector,
                directory,
                ..
            } => {
                let bar = self.ensure_bar(*total);
                bar.set_message(format!("{detector}: {directory}"));
            }
            ProgressEvent::ExtractionComplete { index, .. } => {
                let guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(bar) = guard.as_ref() {
                    bar.set_position(*index as u64);
                }
            }
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. } => {
                self.finish();
            }
            _ => {}
        }
    }
}
