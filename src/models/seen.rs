//! The set of posts already notified.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::PostId;

/// Identifiers of posts that have already been dispatched.
///
/// Grows monotonically; nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenSet {
    #[serde(default)]
    seen_ids: BTreeSet<PostId>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the post has already been notified.
    pub fn contains(&self, id: &PostId) -> bool {
        self.seen_ids.contains(id)
    }

    /// Record a post as notified. Returns `false` if it was already present.
    pub fn mark_seen(&mut self, id: PostId) -> bool {
        self.seen_ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostId> {
        self.seen_ids.iter()
    }
}

impl FromIterator<PostId> for SeenSet {
    fn from_iter<I: IntoIterator<Item = PostId>>(iter: I) -> Self {
        Self {
            seen_ids: iter.into_iter().collect(),
        }
    }
}
