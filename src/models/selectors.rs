// src/models/selectors.rs

//! CSS selectors for scraping a rendered page.

use serde::Deserialize;

/// CSS selectors and heuristics for pulling posts out of a rendered page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSelectors {
    /// Selector for each post container
    #[serde(default = "default_article_selector")]
    pub article_selector: String,

    /// Candidate body elements, tried in order
    #[serde(default = "default_text_selectors")]
    pub text_selectors: Vec<String>,

    /// Candidates shorter than this are labels or timestamps, not bodies
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Substring an image `src` must contain to count as post content
    #[serde(default = "default_image_src_marker")]
    pub image_src_marker: String,

    /// Path segment that marks a post permalink under the page
    #[serde(default = "default_post_path_segment")]
    pub post_path_segment: String,
}

fn default_article_selector() -> String {
    r#"div[role="article"]"#.to_string()
}

fn default_text_selectors() -> Vec<String> {
    vec![
        r#"div[data-ad-preview="message"]"#.to_string(),
        r#"div[data-ad-comet-preview="message"]"#.to_string(),
        r#"div[dir="auto"]"#.to_string(),
    ]
}

fn default_min_text_length() -> usize {
    20
}

fn default_image_src_marker() -> String {
    "scontent".to_string()
}

fn default_post_path_segment() -> String {
    "posts".to_string()
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            article_selector: default_article_selector(),
            text_selectors: default_text_selectors(),
            min_text_length: default_min_text_length(),
            image_src_marker: default_image_src_marker(),
            post_path_segment: default_post_path_segment(),
        }
    }
}
