// src/services/browser.rs

//! Headless browser rendering.
//!
//! Pages are rendered by a Browserless instance through its `/function`
//! endpoint. Before the HTML is captured the browser walks a list of
//! best-effort [`BrowserStep`]s (dismiss cookie and login dialogs, scroll to
//! trigger lazy loading). Each step is attempted on its own; a step that fails
//! is reported back in [`RenderedPage::failed_steps`] and the rest still run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::BrowserConfig;

/// Puppeteer function executed by Browserless. Receives the page URL, the
/// steps and a navigation timeout through `context`.
const RENDER_FUNCTION: &str = r#"
export default async function ({ page, context }) {
  await page.goto(context.url, { waitUntil: "networkidle2", timeout: context.timeoutMs });
  const failed = [];
  for (const [index, step] of context.steps.entries()) {
    try {
      if (step.action === "click") {
        const el = await page.$(step.selector);
        if (!el) throw new Error(`no element matches ${step.selector}`);
        await el.click();
      } else if (step.action === "scroll") {
        await page.evaluate((px) => window.scrollBy(0, px), step.pixels);
      }
      if (step.settle_ms > 0) {
        await new Promise((resolve) => setTimeout(resolve, step.settle_ms));
      }
    } catch (e) {
      failed.push({ index, reason: String(e && e.message ? e.message : e) });
    }
  }
  return { data: { html: await page.content(), failed_steps: failed }, type: "application/json" };
}
"#;

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Click the first element matching the selector
    Click,
    /// Scroll the window down
    Scroll { pixels: u32 },
}

/// One best-effort interaction: a selector (if the action targets an
/// element) paired with an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserStep {
    pub selector: Option<String>,
    #[serde(flatten)]
    pub action: StepAction,
    /// Pause after the step so the page can settle
    pub settle_ms: u64,
}

impl BrowserStep {
    pub fn click(selector: impl Into<String>, settle_ms: u64) -> Self {
        Self {
            selector: Some(selector.into()),
            action: StepAction::Click,
            settle_ms,
        }
    }

    pub fn scroll(pixels: u32, settle_ms: u64) -> Self {
        Self {
            selector: None,
            action: StepAction::Scroll { pixels },
            settle_ms,
        }
    }
}

/// A step that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepFailure {
    /// Position of the step in the submitted list
    pub index: usize,
    pub reason: String,
}

/// HTML captured after all steps ran.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderedPage {
    pub html: String,
    #[serde(default)]
    pub failed_steps: Vec<StepFailure>,
}

/// Steps run before capturing a page: dismiss dialogs, then scroll.
pub fn interaction_steps(config: &BrowserConfig) -> Vec<BrowserStep> {
    let dismiss = config
        .dismiss_selectors
        .iter()
        .map(|selector| BrowserStep::click(selector, config.settle_ms));
    let scroll = (0..config.scroll_passes)
        .map(|_| BrowserStep::scroll(config.scroll_pixels, config.settle_ms));
    dismiss.chain(scroll).collect()
}

/// Renders a page in a headless browser.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, steps: &[BrowserStep]) -> Result<RenderedPage>;
}

/// [`PageRenderer`] backed by a Browserless instance.
pub struct BrowserlessRenderer {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl BrowserlessRenderer {
    pub fn new(client: Client, config: &BrowserConfig) -> Self {
        Self {
            client,
            base_url: config.browserless_url.trim_end_matches('/').to_string(),
            token: config.browserless_token.clone(),
            timeout: Duration::from_secs(config.render_timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/function", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    fn request_body(&self, url: &str, steps: &[BrowserStep]) -> serde_json::Value {
        serde_json::json!({
            "code": RENDER_FUNCTION,
            "context": {
                "url": url,
                "steps": steps,
                "timeoutMs": self.timeout.as_millis() as u64,
            },
        })
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str, steps: &[BrowserStep]) -> Result<RenderedPage> {
        log::debug!("Rendering {} with {} steps", url, steps.len());

        let resp = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&self.request_body(url, steps))
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::fetch(
                url,
                format!("browserless returned {status}: {message}"),
            ));
        }

        resp.json::<RenderedPage>()
            .await
            .map_err(|e| AppError::fetch(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_steps_dismiss_then_scroll() {
        let config = BrowserConfig {
            dismiss_selectors: vec!["#cookies".into(), "#login-close".into()],
            scroll_passes: 2,
            scroll_pixels: 1000,
            settle_ms: 10,
            ..BrowserConfig::default()
        };

        let steps = interaction_steps(&config);
        assert_eq!(
            steps,
            vec![
                BrowserStep::click("#cookies", 10),
                BrowserStep::click("#login-close", 10),
                BrowserStep::scroll(1000, 10),
                BrowserStep::scroll(1000, 10),
            ]
        );
    }

    #[test]
    fn test_step_serialization() {
        let click = serde_json::to_value(BrowserStep::click("#x", 5)).unwrap();
        assert_eq!(
            click,
            serde_json::json!({"selector": "#x", "action": "click", "settle_ms": 5})
        );

        let scroll = serde_json::to_value(BrowserStep::scroll(300, 0)).unwrap();
        assert_eq!(
            scroll,
            serde_json::json!({"selector": null, "action": "scroll", "pixels": 300, "settle_ms": 0})
        );
    }

    #[test]
    fn test_endpoint_with_token() {
        let config = BrowserConfig {
            browserless_url: "https://chrome.example.com/".into(),
            browserless_token: Some("secret".into()),
            ..BrowserConfig::default()
        };
        let renderer = BrowserlessRenderer::new(Client::new(), &config);
        assert_eq!(
            renderer.endpoint(),
            "https://chrome.example.com/function?token=secret"
        );
    }

    #[test]
    fn test_rendered_page_failures_default_empty() {
        let page: RenderedPage = serde_json::from_str(r#"{"html": "<html></html>"}"#).unwrap();
        assert!(page.failed_steps.is_empty());
    }
}
