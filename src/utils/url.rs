// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// # Examples
/// ```
/// use fb_notifier::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://example.com/page/", "posts/1"),
///     "https://example.com/page/posts/1"
/// );
/// ```
pub fn resolve(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// First path segment of a page URL, which is how the page prefixes its own
/// post permalinks (`https://www.facebook.com/newarkparkrun` → `newarkparkrun`).
pub fn page_slug(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    parsed
        .path_segments()?
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Normalize a URL for use in an HTTP header, percent-encoding anything that
/// is not plain ASCII. Returns `None` for unparseable input.
pub fn header_safe(raw: &str) -> Option<String> {
    Url::parse(raw.trim()).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve("https://example.com/path/", "https://other.com/page"),
            "https://other.com/page"
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve("https://www.facebook.com/newarkparkrun", "/newarkparkrun/posts/pfbid0abc"),
            "https://www.facebook.com/newarkparkrun/posts/pfbid0abc"
        );
    }

    #[test]
    fn test_resolve_invalid_base_returns_href() {
        assert_eq!(resolve("not a url", "/x"), "/x");
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(
            page_slug("https://www.facebook.com/newarkparkrun/"),
            Some("newarkparkrun".to_string())
        );
        assert_eq!(page_slug("https://www.facebook.com/"), None);
        assert_eq!(page_slug("garbage"), None);
    }

    #[test]
    fn test_header_safe_encodes_non_ascii() {
        assert_eq!(
            header_safe("https://example.com/café.jpg").as_deref(),
            Some("https://example.com/caf%C3%A9.jpg")
        );
        assert_eq!(header_safe("::"), None);
    }
}
