//! Turning posts into notifications.

use crate::models::RawPost;
use crate::services::Notification;
use crate::utils::text::clip_chars;

/// Headline length inside the title.
pub const HEADLINE_CHARS: usize = 50;

/// Body length shown in the notification before "..." is appended.
pub const MESSAGE_CHARS: usize = 500;

const FALLBACK_HEADLINE: &str = "New Post";

/// Builds the notification shown for a post.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    title_prefix: String,
}

impl NotificationComposer {
    pub fn new(title_prefix: impl Into<String>) -> Self {
        Self {
            title_prefix: title_prefix.into(),
        }
    }

    pub fn compose(&self, post: &RawPost) -> Notification {
        let headline = Self::headline(post);
        let title = if self.title_prefix.trim().is_empty() {
            headline.clone()
        } else {
            format!("{}: {}", self.title_prefix.trim(), headline)
        };

        let text = post.text.trim();
        let message = if text.is_empty() {
            headline
        } else {
            let (shown, clipped) = clip_chars(text, MESSAGE_CHARS);
            if clipped {
                format!("{shown}...")
            } else {
                shown.to_string()
            }
        };

        Notification {
            title,
            message,
            click_url: Some(post.url.clone()).filter(|u| !u.trim().is_empty()),
            attach_url: post.image_url.clone(),
        }
    }

    fn headline(post: &RawPost) -> String {
        let source = post
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| post.text.lines().map(str::trim).find(|l| !l.is_empty()))
            .unwrap_or(FALLBACK_HEADLINE);
        clip_chars(source, HEADLINE_CHARS).0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> NotificationComposer {
        NotificationComposer::new("Newark Parkrun")
    }

    #[test]
    fn test_feed_post_uses_title() {
        let post = RawPost::new("https://example.com/p/1", "Body")
            .with_title("Cancelled this week")
            .with_image("https://cdn.example.com/1.jpg");

        let n = composer().compose(&post);
        assert_eq!(n.title, "Newark Parkrun: Cancelled this week");
        assert_eq!(n.message, "Body");
        assert_eq!(n.click_url.as_deref(), Some("https://example.com/p/1"));
        assert_eq!(n.attach_url.as_deref(), Some("https://cdn.example.com/1.jpg"));
    }

    #[test]
    fn test_scraped_post_uses_first_line() {
        let post = RawPost::new("", "\nToken: volunteers needed\nmore details");
        let n = composer().compose(&post);
        assert_eq!(n.title, "Newark Parkrun: Token: volunteers needed");
        assert_eq!(n.click_url, None);
    }

    #[test]
    fn test_headline_clipped_to_50() {
        let post = RawPost::new("", "z".repeat(80));
        let n = composer().compose(&post);
        assert_eq!(n.title, format!("Newark Parkrun: {}", "z".repeat(50)));
    }

    #[test]
    fn test_long_message_gets_ellipsis() {
        let post = RawPost::new("", "w".repeat(501));
        let n = composer().compose(&post);
        assert_eq!(n.message, format!("{}...", "w".repeat(500)));
    }

    #[test]
    fn test_exact_length_message_has_no_ellipsis() {
        let post = RawPost::new("", "w".repeat(500));
        let n = composer().compose(&post);
        assert_eq!(n.message, "w".repeat(500));
    }

    #[test]
    fn test_limits_count_characters_not_clusters() {
        // 300 clusters, 600 characters
        let text = "e\u{301}".repeat(300);
        let n = composer().compose(&RawPost::new("", text.clone()));

        let (shown, _) = text.split_at(text.char_indices().nth(500).unwrap().0);
        assert_eq!(n.message, format!("{shown}..."));
        assert_eq!(
            n.title,
            format!("Newark Parkrun: {}", "e\u{301}".repeat(25))
        );
    }

    #[test]
    fn test_empty_post_falls_back() {
        let n = NotificationComposer::new("").compose(&RawPost::new("https://x.test/", ""));
        assert_eq!(n.title, "New Post");
        assert_eq!(n.message, "New Post");
    }
}
