//! Run observation.
//!
//! Components report what happens during a run through a [`RunObserver`]
//! handed to them. [`LogObserver`] forwards everything to the `log` facade.

use crate::error::AppError;
use crate::models::{ExtractionSkip, PostId, RawPost, RunReport};
use crate::services::StepFailure;

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Fetch,
    ExtractAll,
    Dispatch,
    Persist,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Init => "init",
            RunPhase::Fetch => "fetch",
            RunPhase::ExtractAll => "extract",
            RunPhase::Dispatch => "dispatch",
            RunPhase::Persist => "persist",
            RunPhase::Done => "done",
        }
    }
}

/// Receives run events. Every method has a no-op default.
pub trait RunObserver: Send + Sync {
    fn phase(&self, _phase: RunPhase) {}

    fn fetched(&self, _source: &str, _count: usize) {}

    fn extraction_skipped(&self, _reason: &ExtractionSkip) {}

    fn step_failed(&self, _failure: &StepFailure) {}

    fn no_identity(&self, _post: &RawPost) {}

    fn already_seen(&self, _id: &PostId) {}

    fn new_post(&self, _id: &PostId, _post: &RawPost) {}

    fn dispatched(&self, _id: &PostId, _title: &str) {}

    fn dry_run(&self, _id: &PostId, _title: &str) {}

    fn dispatch_failed(&self, _id: &PostId, _error: &AppError) {}

    fn persisted(&self, _location: &str, _count: usize) {}

    fn finished(&self, _report: &RunReport) {}
}

/// Observer that writes to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn phase(&self, phase: RunPhase) {
        log::debug!("Phase: {}", phase.as_str());
    }

    fn fetched(&self, source: &str, count: usize) {
        log::info!("Fetched {count} records from {source}");
    }

    fn extraction_skipped(&self, reason: &ExtractionSkip) {
        log::debug!("Skipping record: {reason}");
    }

    fn step_failed(&self, failure: &StepFailure) {
        log::debug!("Browser step {} skipped: {}", failure.index, failure.reason);
    }

    fn no_identity(&self, post: &RawPost) {
        log::debug!(
            "No stable identity for post '{}' (url: '{}'), skipping",
            post.label(),
            post.url
        );
    }

    fn already_seen(&self, id: &PostId) {
        log::debug!("Already notified: {id}");
    }

    fn new_post(&self, id: &PostId, post: &RawPost) {
        log::info!("New post found: {} ({id})", post.label());
    }

    fn dispatched(&self, _id: &PostId, title: &str) {
        log::info!("Notification sent: {title}");
    }

    fn dry_run(&self, id: &PostId, title: &str) {
        log::info!("[dry run] Would notify {id}: {title}");
    }

    fn dispatch_failed(&self, id: &PostId, error: &AppError) {
        log::error!("Failed to send notification for {id}: {error}");
    }

    fn persisted(&self, location: &str, count: usize) {
        log::debug!("Seen-set saved to {location} ({count} ids)");
    }

    fn finished(&self, report: &RunReport) {
        log::info!("Processed {} new posts", report.notified);
        log::info!("[SUMMARY] Run complete");
        for (key, value) in report.summary_items() {
            log::info!("    {key}: {value}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Observer that records events for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RunObserver for RecordingObserver {
        fn phase(&self, phase: RunPhase) {
            self.push(format!("phase:{}", phase.as_str()));
        }

        fn extraction_skipped(&self, _reason: &ExtractionSkip) {
            self.push("skip:extraction".into());
        }

        fn step_failed(&self, failure: &StepFailure) {
            self.push(format!("step_failed:{}", failure.index));
        }

        fn no_identity(&self, post: &RawPost) {
            self.push(format!("no_identity:{}", post.url));
        }

        fn already_seen(&self, id: &PostId) {
            self.push(format!("seen:{id}"));
        }

        fn dispatched(&self, id: &PostId, _title: &str) {
            self.push(format!("dispatched:{id}"));
        }

        fn dry_run(&self, id: &PostId, _title: &str) {
            self.push(format!("dry_run:{id}"));
        }

        fn dispatch_failed(&self, id: &PostId, _error: &AppError) {
            self.push(format!("dispatch_failed:{id}"));
        }
    }
}
