//! Post identity resolution.
//!
//! Every post that reaches the dispatcher needs an identifier that stays the
//! same across runs, otherwise it is notified again. Scraped pages are noisy:
//! rendered text shifts between scrapes and many anchors look like posts but
//! point at photos or stories. The default policy for pages therefore only
//! trusts the platform's permanent `pfbid` permalink token and returns no
//! identity at all when it is missing.
//!
//! | Policy       | Identity                                        | Missing when       |
//! |--------------|-------------------------------------------------|--------------------|
//! | `permalink`  | `pfbid…` token from `/posts/pfbid…`             | no token in URL    |
//! | `loose_url`  | `pfbid…` token, else numeric post/story id      | no pattern matches |
//! | `text_hash`  | SHA-256 of the first 100 characters of the text | text is blank      |
//! | `feed_entry` | feed entry id, else SHA-256 of link + title     | never              |

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::models::{PostId, RawPost};

/// Characters of body text hashed by [`IdentityPolicy::TextHash`].
pub const TEXT_HASH_PREFIX_CHARS: usize = 100;

static PFBID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/posts/(pfbid[0-9A-Za-z]+)").expect("valid regex"));

static LOOSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/posts/(\d+)",
        r"[?&]story_fbid=(\d+)",
        r"/permalink/(\d+)",
        r"[?&]fbid=(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// How a post's identity is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// Only the `pfbid` permalink token counts
    Permalink,
    /// `pfbid` token, then looser numeric URL patterns
    LooseUrl,
    /// Hash of the leading body text
    TextHash,
    /// Feed entry id, falling back to a hash of link and title
    FeedEntry,
}

impl IdentityPolicy {
    /// Derive the identity of a post. `None` means the post must be skipped.
    pub fn resolve(&self, post: &RawPost) -> Option<PostId> {
        match self {
            IdentityPolicy::Permalink => permalink_id(&post.url),
            IdentityPolicy::LooseUrl => {
                permalink_id(&post.url).or_else(|| loose_url_id(&post.url))
            }
            IdentityPolicy::TextHash => text_hash_id(&post.text),
            IdentityPolicy::FeedEntry => Some(feed_entry_id(post)),
        }
    }
}

/// `pfbid…` token from a `/posts/pfbid…` permalink.
pub fn permalink_id(url: &str) -> Option<PostId> {
    PFBID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| PostId::new(m.as_str()))
}

fn loose_url_id(url: &str) -> Option<PostId> {
    LOOSE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| PostId::new(m.as_str()))
    })
}

fn text_hash_id(text: &str) -> Option<PostId> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let prefix: String = text.chars().take(TEXT_HASH_PREFIX_CHARS).collect();
    Some(PostId::new(sha256_hex(prefix.as_bytes())))
}

fn feed_entry_id(post: &RawPost) -> PostId {
    if let Some(id) = post.entry_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        return PostId::new(id);
    }
    let mut content = post.url.clone();
    content.push_str(post.title.as_deref().unwrap_or(""));
    PostId::new(sha256_hex(content.as_bytes()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
