//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::PageSelectors;
use crate::pipeline::IdentityPolicy;

/// Root application configuration.
///
/// The top-level keys mirror the JSON document users write by hand; the
/// nested sections are optional tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// RSS/Atom feed generated for the page
    #[serde(default)]
    pub rss_url: Option<String>,

    /// Page URL to scrape through a headless browser
    #[serde(default)]
    pub facebook_page: Option<String>,

    /// ntfy topic that receives notifications
    pub ntfy_topic: String,

    /// ntfy server base URL
    #[serde(default = "defaults::ntfy_server")]
    pub ntfy_server: String,

    /// Where the seen-set is persisted
    #[serde(default = "defaults::seen_posts_file")]
    pub seen_posts_file: PathBuf,

    /// Identity policy override (defaults depend on the source kind)
    #[serde(default)]
    pub identity_policy: Option<IdentityPolicy>,

    /// Notification formatting
    #[serde(default)]
    pub notification: NotificationConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Headless browser settings (page sources only)
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Scraping selectors (page sources only)
    #[serde(default)]
    pub selectors: PageSelectors,
}

/// Where posts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Server-generated RSS/Atom feed
    Feed { url: String },
    /// Rendered page scraped through a headless browser
    Page { url: String },
}

impl SourceKind {
    /// URL of the source.
    pub fn url(&self) -> &str {
        match self {
            SourceKind::Feed { url } | SourceKind::Page { url } => url,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file (or TOML, by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::config_not_found(path));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content, Self::is_toml(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text without touching the filesystem.
    pub fn parse(content: &str, toml: bool) -> Result<Self> {
        if toml {
            toml::from_str(content).map_err(|e| AppError::config_invalid(e.to_string()))
        } else {
            serde_json::from_str(content).map_err(|e| AppError::config_invalid(e.to_string()))
        }
    }

    fn is_toml(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
    }

    /// Resolve the configured source. Exactly one of `rss_url` and
    /// `facebook_page` must be set.
    pub fn source(&self) -> Result<SourceKind> {
        let rss = non_blank(self.rss_url.as_deref());
        let page = non_blank(self.facebook_page.as_deref());

        match (rss, page) {
            (Some(url), None) => Ok(SourceKind::Feed { url: url.to_string() }),
            (None, Some(url)) => Ok(SourceKind::Page { url: url.to_string() }),
            (Some(_), Some(_)) => Err(AppError::config_invalid(
                "set only one of rss_url and facebook_page",
            )),
            (None, None) => Err(AppError::config_invalid(
                "missing source: set rss_url or facebook_page",
            )),
        }
    }

    /// Identity policy in effect: the explicit override, or the default for
    /// the configured source kind.
    pub fn effective_identity_policy(&self) -> Result<IdentityPolicy> {
        if let Some(policy) = self.identity_policy {
            return Ok(policy);
        }
        Ok(match self.source()? {
            SourceKind::Feed { .. } => IdentityPolicy::FeedEntry,
            SourceKind::Page { .. } => IdentityPolicy::Permalink,
        })
    }

    /// Full ntfy endpoint for the configured topic.
    pub fn ntfy_endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.ntfy_server.trim_end_matches('/'),
            self.ntfy_topic.trim_matches('/')
        )
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.ntfy_topic.trim().is_empty() {
            return Err(AppError::config_invalid("ntfy_topic is empty"));
        }
        url::Url::parse(&self.ntfy_server)
            .map_err(|e| AppError::config_invalid(format!("ntfy_server: {e}")))?;

        let source = self.source()?;
        url::Url::parse(source.url())
            .map_err(|e| AppError::config_invalid(format!("source url: {e}")))?;

        if self.http.timeout_secs == 0 {
            return Err(AppError::config_invalid("http.timeout_secs must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config_invalid("http.user_agent is empty"));
        }
        if let Some(priority) = self.notification.priority {
            if !(1..=5).contains(&priority) {
                return Err(AppError::config_invalid(
                    "notification.priority must be between 1 and 5",
                ));
            }
        }
        if self.selectors.min_text_length == 0 {
            return Err(AppError::config_invalid(
                "selectors.min_text_length must be > 0",
            ));
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Notification formatting settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Prefix placed before every notification title
    #[serde(default = "defaults::title_prefix")]
    pub title_prefix: String,

    /// Comma-separated ntfy tags
    #[serde(default = "defaults::tags")]
    pub tags: String,

    /// ntfy priority (1-5)
    #[serde(default)]
    pub priority: Option<u8>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title_prefix: defaults::title_prefix(),
            tags: defaults::tags(),
            priority: None,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Browserless base URL
    #[serde(default = "defaults::browserless_url")]
    pub browserless_url: String,

    /// Browserless API token
    #[serde(default)]
    pub browserless_token: Option<String>,

    /// Buttons clicked (best effort) to close cookie and login dialogs
    #[serde(default = "defaults::dismiss_selectors")]
    pub dismiss_selectors: Vec<String>,

    /// Number of scroll passes used to trigger lazy loading
    #[serde(default = "defaults::scroll_passes")]
    pub scroll_passes: u32,

    /// Pixels scrolled per pass
    #[serde(default = "defaults::scroll_pixels")]
    pub scroll_pixels: u32,

    /// Pause after each step, in milliseconds
    #[serde(default = "defaults::settle_ms")]
    pub settle_ms: u64,

    /// Timeout for the whole render, in seconds
    #[serde(default = "defaults::render_timeout")]
    pub render_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browserless_url: defaults::browserless_url(),
            browserless_token: None,
            dismiss_selectors: defaults::dismiss_selectors(),
            scroll_passes: defaults::scroll_passes(),
            scroll_pixels: defaults::scroll_pixels(),
            settle_ms: defaults::settle_ms(),
            render_timeout_secs: defaults::render_timeout(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn ntfy_server() -> String {
        "https://ntfy.sh".into()
    }
    pub fn seen_posts_file() -> PathBuf {
        PathBuf::from("./seen_posts.json")
    }

    // Notification defaults
    pub fn title_prefix() -> String {
        "Newark Parkrun".into()
    }
    pub fn tags() -> String {
        "running,facebook,parkrun".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; fb-notifier/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Browser defaults
    pub fn browserless_url() -> String {
        "http://localhost:3000".into()
    }
    pub fn dismiss_selectors() -> Vec<String> {
        vec![
            r#"[aria-label="Decline optional cookies"]"#.into(),
            r#"[aria-label="Only allow essential cookies"]"#.into(),
            r#"[data-cookiebanner="accept_only_essential_button"]"#.into(),
            r#"div[role="dialog"] [aria-label="Close"]"#.into(),
        ]
    }
    pub fn scroll_passes() -> u32 {
        3
    }
    pub fn scroll_pixels() -> u32 {
        2000
    }
    pub fn settle_ms() -> u64 {
        1500
    }
    pub fn render_timeout() -> u64 {
        60
    }
}
