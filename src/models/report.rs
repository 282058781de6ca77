//! Run statistics.

use chrono::{DateTime, Utc};

/// What one run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Records returned by the source
    pub fetched: usize,
    /// Records that produced no post
    pub extraction_skipped: usize,
    /// Posts without a usable identity
    pub no_identity: usize,
    /// Posts already in the seen-set
    pub already_seen: usize,
    /// Posts dispatched (or listed, in a dry run)
    pub notified: usize,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            fetched: 0,
            extraction_skipped: 0,
            no_identity: 0,
            already_seen: 0,
            notified: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, once finished.
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    /// Summary lines for logging.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Fetched", self.fetched.to_string()),
            ("Skipped (extraction)", self.extraction_skipped.to_string()),
            ("Skipped (no identity)", self.no_identity.to_string()),
            ("Already seen", self.already_seen.to_string()),
            ("Notified", self.notified.to_string()),
            (
                "Duration",
                self.elapsed_ms()
                    .map_or_else(|| "-".to_string(), |ms| format!("{ms}ms")),
            ),
        ]
    }
}
