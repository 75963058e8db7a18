//! Progress handler trait and events

use crate::detector::DetectorType;
use std::time::Duration;

/// Events emitted while a scan run progresses.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Tree search started
    SearchStarted { root: String },

    /// Tree search completed
    SearchComplete {
        directories: usize,
        applicable: usize,
    },

    /// Extractability checks completed
    PreparationComplete {
        extractable: usize,
        applicable: usize,
    },

    /// One extraction is starting
    ExtractionStarted {
        index: usize,
        total: usize,
        percent: usize,
        detector: DetectorType,
        directory: String,
    },

    /// One extraction finished
    ExtractionComplete {
        index: usize,
        total: usize,
        detector: DetectorType,
        success: bool,
    },

    /// The whole run completed
    Completed {
        extractions: usize,
        total_time: Duration,
    },

    /// The run aborted with an error
    Failed { error: String },
}

/// Trait for handling progress events during a scan.
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {
        // Intentionally empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::SearchStarted {
            root: "/src".to_string(),
        });
    }

    #[test]
    fn test_events_are_delivered() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::SearchStarted {
            root: "/src".to_string(),
        });
        handler.on_progress(&ProgressEvent::ExtractionStarted {
            index: 1,
            total: 4,
            percent: 0,
            detector: DetectorType::Npm,
            directory: "/src".to_string(),
        });
        handler.on_progress(&ProgressEvent::Completed {
            extractions: 4,
            total_time: Duration::from_secs(2),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
