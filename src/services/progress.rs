//! Analysis progress reporting
//!
//! The Analyzing phase publishes its progress on a `watch` channel so a host
//! can render it without blocking on the analysis itself. Receivers only ever
//! observe the latest value.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisProgress {
    pub session_id: Uuid,
    pub processed: usize,
    pub total: usize,
}

impl AnalysisProgress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.processed as f64 * 100.0 / self.total as f64
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Throttled progress publisher owned by the analysis task
#[derive(Debug)]
pub struct ProgressReporter {
    session_id: Uuid,
    interval: usize,
    sender: watch::Sender<AnalysisProgress>,
}

impl ProgressReporter {
    pub fn new(
        session_id: Uuid,
        total: usize,
        interval: usize,
    ) -> (Self, watch::Receiver<AnalysisProgress>) {
        let (sender, receiver) = watch::channel(AnalysisProgress {
            session_id,
            processed: 0,
            total,
        });
        let reporter = Self {
            session_id,
            interval: interval.max(1),
            sender,
        };
        (reporter, receiver)
    }

    /// Publish every `interval` channels and on completion
    pub fn report(&self, processed: usize, total: usize) {
        if processed % self.interval != 0 && processed < total {
            return;
        }
        // No receivers left is fine: nobody is watching.
        let _ = self.sender.send(AnalysisProgress {
            session_id: self.session_id,
            processed,
            total,
        });
    }
}
