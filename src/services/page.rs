// src/services/page.rs

//! Scraped page source.
//!
//! Renders the page, splits it into top-level post containers, and pulls a
//! body, an image and a permalink out of each one using the configured
//! [`PageSelectors`].

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ExtractionSkip, PageSelectors, RawPost};
use crate::pipeline::RunObserver;
use crate::services::browser::{BrowserStep, PageRenderer, StepFailure};
use crate::services::PostSource;
use crate::utils::parse_selector;
use crate::utils::url::{page_slug, resolve};

/// Selectors parsed once when the source is built.
struct Parsed {
    article: Selector,
    markers: Vec<Selector>,
    img: Selector,
    anchor: Selector,
}

/// Posts scraped from a rendered page.
pub struct PageSource<R: PageRenderer> {
    page_url: String,
    /// Substring a permalink must contain, e.g. `/newarkparkrun/posts/`
    permalink_marker: String,
    selectors: PageSelectors,
    parsed: Parsed,
    steps: Vec<BrowserStep>,
    renderer: R,
}

impl<R: PageRenderer> PageSource<R> {
    /// Create a page source. All selectors are checked up front.
    pub fn new(
        page_url: impl Into<String>,
        selectors: PageSelectors,
        steps: Vec<BrowserStep>,
        renderer: R,
    ) -> Result<Self> {
        let page_url = page_url.into();
        let slug = page_slug(&page_url).ok_or_else(|| {
            AppError::config_invalid(format!("page URL has no page name: {page_url}"))
        })?;
        let permalink_marker = format!("/{}/{}/", slug, selectors.post_path_segment);

        let parsed = Parsed {
            article: parse_selector(&selectors.article_selector)?,
            markers: selectors
                .text_selectors
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
            img: parse_selector("img[src]")?,
            anchor: parse_selector("a[href]")?,
        };

        Ok(Self {
            page_url,
            permalink_marker,
            selectors,
            parsed,
            steps,
            renderer,
        })
    }

    /// Drop steps whose selector cannot even be parsed, reporting each one.
    /// Kept steps carry their position in the configured list.
    fn usable_steps(&self, observer: &dyn RunObserver) -> Vec<(usize, BrowserStep)> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(index, step)| match step.selector.as_deref().map(parse_selector) {
                Some(Err(e)) => {
                    observer.step_failed(&StepFailure {
                        index,
                        reason: e.to_string(),
                    });
                    None
                }
                _ => Some((index, step.clone())),
            })
            .collect()
    }

    /// Outer HTML of each top-level post container, in page order. Containers
    /// nested in another container (comments, shared posts) are left out.
    pub fn split_articles(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let article = &self.parsed.article;

        document
            .select(article)
            .filter(|el| {
                !el.ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|ancestor| article.matches(&ancestor))
            })
            .map(|el| el.html())
            .collect()
    }

    fn extract_text(&self, root: ElementRef<'_>) -> String {
        self.parsed
            .markers
            .iter()
            .flat_map(|marker| root.select(marker))
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|text| text.chars().count() >= self.selectors.min_text_length)
            .unwrap_or_default()
    }

    fn extract_image(&self, root: ElementRef<'_>) -> Option<String> {
        root.select(&self.parsed.img)
            .filter_map(|el| el.value().attr("src"))
            .find(|src| src.contains(&self.selectors.image_src_marker))
            .map(String::from)
    }

    fn extract_permalink(&self, root: ElementRef<'_>) -> String {
        root.select(&self.parsed.anchor)
            .filter_map(|el| el.value().attr("href"))
            .find(|href| href.contains(&self.permalink_marker))
            .map(|href| resolve(&self.page_url, href))
            .unwrap_or_default()
    }
}

#[async_trait]
impl<R: PageRenderer> PostSource for PageSource<R> {
    type Record = String;

    fn describe(&self) -> String {
        format!("page {}", self.page_url)
    }

    async fn fetch(&self, observer: &dyn RunObserver) -> Result<Vec<String>> {
        log::info!("Rendering page: {}", self.page_url);
        let (positions, steps): (Vec<usize>, Vec<BrowserStep>) =
            self.usable_steps(observer).into_iter().unzip();
        let rendered = self.renderer.render(&self.page_url, &steps).await?;

        for failure in &rendered.failed_steps {
            let index = positions.get(failure.index).copied().unwrap_or(failure.index);
            observer.step_failed(&StepFailure {
                index,
                reason: failure.reason.clone(),
            });
        }

        Ok(self.split_articles(&rendered.html))
    }

    fn extract(&self, record: &String) -> std::result::Result<RawPost, ExtractionSkip> {
        let fragment = Html::parse_fragment(record);
        let root = fragment.root_element();

        let text = self.extract_text(root);
        let url = self.extract_permalink(root);

        if text.is_empty() && url.is_empty() {
            return Err(ExtractionSkip::Empty);
        }

        Ok(RawPost {
            url,
            text,
            image_url: self.extract_image(root),
            title: None,
            entry_id: None,
        })
    }
}
