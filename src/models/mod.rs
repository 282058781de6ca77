// src/models/mod.rs

//! Domain models for the notifier.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod post;
mod report;
mod seen;
mod selectors;

// Re-export all public types
pub use config::{BrowserConfig, Config, HttpConfig, NotificationConfig, SourceKind};
pub use post::{ExtractionSkip, PostId, RawPost};
pub use report::RunReport;
pub use seen::SeenSet;
pub use selectors::PageSelectors;
