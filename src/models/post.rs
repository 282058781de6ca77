//! Post data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A post as extracted from one source record.
///
/// Built once by an extractor and only read afterwards: once by the identity
/// resolver and once when the notification is composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPost {
    /// Permalink (may be empty)
    pub url: String,

    /// Human-readable body (may be empty)
    pub text: String,

    /// First image found in the post
    pub image_url: Option<String>,

    /// Feed-provided title
    pub title: Option<String>,

    /// Feed-provided entry id
    pub entry_id: Option<String>,
}

impl RawPost {
    /// Create a post with just a permalink and body text.
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Attach an image URL.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach a feed entry id.
    pub fn with_entry_id(mut self, entry_id: impl Into<String>) -> Self {
        self.entry_id = Some(entry_id.into());
        self
    }

    /// Short label for log lines.
    pub fn label(&self) -> String {
        let source = self
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.text);
        let first_line = source.lines().next().unwrap_or("").trim();
        first_line.chars().take(50).collect()
    }
}

/// Stable identifier of one logical post across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a source record produced no post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSkip {
    /// Nothing usable (no link, no title, no text)
    Empty,
}

impl fmt::Display for ExtractionSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionSkip::Empty => f.write_str("record has no link or content"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_title() {
        let post = RawPost::new("", "Body text\nmore").with_title("Saturday update");
        assert_eq!(post.label(), "Saturday update");
    }

    #[test]
    fn test_label_falls_back_to_first_line() {
        let post = RawPost::new("", "  First line of the post  \nsecond");
        assert_eq!(post.label(), "First line of the post");
    }

    #[test]
    fn test_post_id_serializes_as_string() {
        let id = PostId::new("pfbidABC123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"pfbidABC123\"");
    }
}
