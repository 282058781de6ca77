//! Run pipeline.
//!
//! - `identity`: stable post identities
//! - `compose`: notification text
//! - `observer`: run events
//! - `run`: the orchestrator tying sources, seen-set and notifier together

pub mod compose;
pub mod identity;
pub mod observer;
pub mod run;

pub use compose::NotificationComposer;
pub use identity::IdentityPolicy;
pub use observer::{LogObserver, RunObserver, RunPhase};
pub use run::Runner;
