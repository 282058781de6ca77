// src/services/ntfy.rs

//! Push delivery through ntfy.
//!
//! ntfy carries the title in an HTTP header, so it is reduced to ASCII before
//! sending. Titles are capped at 256 characters and bodies at 4096 bytes,
//! the limits ntfy documents; the body is cut on a character boundary and no
//! ellipsis is added here.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::text::{to_ascii, truncate_bytes};
use crate::utils::url::header_safe;

/// Maximum title length accepted by ntfy.
pub const MAX_TITLE_CHARS: usize = 256;

/// Maximum message size accepted by ntfy.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// A notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Opened when the notification is tapped
    pub click_url: Option<String>,
    /// Image attached to the notification
    pub attach_url: Option<String>,
}

/// Delivers notifications. One call, one delivery attempt.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// [`Notifier`] posting to an ntfy topic.
pub struct NtfyNotifier {
    client: Client,
    endpoint: String,
    tags: String,
    priority: Option<u8>,
}

impl NtfyNotifier {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.ntfy_endpoint(),
            tags: to_ascii(&config.notification.tags),
            priority: config.notification.priority,
        }
    }

    /// Build the HTTP request for a notification without sending it.
    pub fn build_request(&self, notification: &Notification) -> Result<reqwest::Request> {
        let title = to_ascii(&notification.title);
        let title = truncate_bytes(&title, MAX_TITLE_CHARS);
        let body = truncate_bytes(&notification.message, MAX_MESSAGE_BYTES).to_string();

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Title", title)
            .body(body);

        if !self.tags.is_empty() {
            request = request.header("Tags", self.tags.as_str());
        }
        if let Some(click) = notification.click_url.as_deref().and_then(header_safe) {
            request = request.header("Click", click);
        }
        if let Some(attach) = notification.attach_url.as_deref().and_then(header_safe) {
            request = request.header("Attach", attach);
        }
        if let Some(priority) = self.priority {
            request = request.header("Priority", priority.to_string());
        }

        request.build().map_err(AppError::dispatch)
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let request = self.build_request(notification)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(AppError::dispatch)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::dispatch(format!(
                "ntfy returned {status}: {}",
                body.trim()
            )));
        }

        log::debug!("ntfy accepted notification ({status})");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> NtfyNotifier {
        let config = Config::parse(
            r#"{
                "rss_url": "https://rss.example.com/feed.xml",
                "ntfy_topic": "parkrun",
                "ntfy_server": "https://ntfy.example.com/",
                "notification": {"priority": 4}
            }"#,
            false,
        )
        .unwrap();
        NtfyNotifier::new(Client::new(), &config)
    }

    fn notification(message: String) -> Notification {
        Notification {
            title: "Newark Parkrun: Results".into(),
            message,
            click_url: Some("https://www.facebook.com/newarkparkrun/posts/pfbid02a".into()),
            attach_url: None,
        }
    }

    fn header<'a>(request: &'a reqwest::Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_request_shape() {
        let request = notifier()
            .build_request(&notification("Hello".into()))
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://ntfy.example.com/parkrun");
        assert_eq!(header(&request, "Title"), Some("Newark Parkrun: Results"));
        assert_eq!(header(&request, "Tags"), Some("running,facebook,parkrun"));
        assert_eq!(
            header(&request, "Click"),
            Some("https://www.facebook.com/newarkparkrun/posts/pfbid02a")
        );
        assert_eq!(header(&request, "Priority"), Some("4"));
        assert!(header(&request, "Attach").is_none());
        assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&b"Hello"[..]));
    }

    #[test]
    fn test_body_truncated_to_4096_bytes_without_ellipsis() {
        let request = notifier()
            .build_request(&notification("a".repeat(5000)))
            .unwrap();

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body.len(), MAX_MESSAGE_BYTES);
        assert!(body.iter().all(|&b| b == b'a'));
    }

    #[test]
    fn test_body_truncation_respects_utf8() {
        // 3-byte characters: 4096 is not a multiple of 3
        let request = notifier()
            .build_request(&notification("€".repeat(2000)))
            .unwrap();

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body.len(), 4095);
        assert!(std::str::from_utf8(body).is_ok());
    }

    #[test]
    fn test_title_sanitized_and_capped() {
        let mut n = notification("x".into());
        n.title = format!("🏃 It\u{2019}s \u{201C}on\u{201D} {}", "y".repeat(400));

        let request = notifier().build_request(&n).unwrap();
        let title = header(&request, "Title").unwrap();
        assert!(title.starts_with("It's \"on\" yyy"));
        assert_eq!(title.len(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_attachment_url_is_encoded() {
        let mut n = notification("x".into());
        n.attach_url = Some("https://scontent.example.com/photo é.jpg".into());

        let request = notifier().build_request(&n).unwrap();
        assert_eq!(
            header(&request, "Attach"),
            Some("https://scontent.example.com/photo%20%C3%A9.jpg")
        );
    }
}
