// src/utils/text.rs

//! Text cleanup and truncation helpers.

use scraper::{Html, Selector};

/// Typographic characters and their ASCII stand-ins.
const ASCII_SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
    ('\u{201B}', "'"),
    ('\u{2032}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{201F}', "\""),
    ('\u{2033}', "\""),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2015}', "-"),
    ('\u{2212}', "-"),
    ('\u{2026}', "..."),
    ('\u{2022}', "*"),
    ('\u{00B7}', "-"),
    ('\u{00A0}', " "),
    ('\u{2009}', " "),
    ('\u{202F}', " "),
    ('\u{00D7}', "x"),
];

/// Reduce text to printable ASCII: typographic punctuation is substituted,
/// any other non-ASCII character is dropped, control characters become
/// spaces and runs of whitespace collapse to one.
pub fn to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some((_, replacement)) = ASCII_SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            out.push_str(replacement);
        } else if c.is_ascii_control() {
            out.push(' ');
        } else if c.is_ascii() {
            out.push(c);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Longest prefix of `text` that fits in `max_bytes` without splitting a
/// character.
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// First `max` characters of `text`, and whether anything was cut.
pub fn clip_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Visible text of an HTML fragment, one trimmed text node per line.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `src` of every `<img>` in an HTML fragment, skipping inline `data:` URIs.
pub fn html_images(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let Ok(img) = Selector::parse("img[src]") else {
        return Vec::new();
    };
    fragment
        .select(&img)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(String::from)
        .collect()
}
