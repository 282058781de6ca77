//! Service layer: where posts come from and where notifications go.
//!
//! - [`FeedSource`]: posts from an RSS/Atom feed
//! - [`PageSource`]: posts scraped from a page rendered by a [`PageRenderer`]
//! - [`NtfyNotifier`]: push delivery through ntfy

pub mod browser;
pub mod feed;
pub mod ntfy;
pub mod page;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ExtractionSkip, RawPost};
use crate::pipeline::RunObserver;

pub use browser::{
    BrowserStep, BrowserlessRenderer, PageRenderer, RenderedPage, StepAction, StepFailure,
};
pub use feed::FeedSource;
pub use ntfy::{Notification, Notifier, NtfyNotifier};
pub use page::PageSource;

/// A source of posts, newest first.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// One raw record as delivered by the source.
    type Record: Send + Sync;

    /// Where the records come from, for log lines.
    fn describe(&self) -> String;

    /// Fetch a complete batch of records. An empty batch is not an error.
    async fn fetch(&self, observer: &dyn RunObserver) -> Result<Vec<Self::Record>>;

    /// Turn one record into a post, or explain why it was dropped.
    fn extract(&self, record: &Self::Record) -> std::result::Result<RawPost, ExtractionSkip>;
}
