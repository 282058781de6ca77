//! Storage abstractions for the seen-set.
//!
//! The seen-set is the only durable state. It lives in a single JSON file:
//!
//! ```text
//! {"seen_ids": ["pfbid02abc...", "pfbid0xyz..."]}
//! ```
//!
//! Nothing locks the file; two overlapping runs can lose each other's writes.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SeenSet;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for seen-set storage backends.
#[async_trait]
pub trait SeenStorage: Send + Sync {
    /// Load the seen-set. A missing store is an empty set, not an error.
    async fn load(&self) -> Result<SeenSet>;

    /// Persist the seen-set, replacing whatever was stored before.
    async fn save(&self, seen: &SeenSet) -> Result<()>;

    /// Human-readable location, for log lines.
    fn location(&self) -> String;
}
