// src/services/feed.rs

//! RSS/Atom feed source.
//!
//! Feeds are server-generated, so entry ids are trusted as identities and a
//! hash of link and title is an acceptable fallback (see
//! [`IdentityPolicy::FeedEntry`](crate::pipeline::IdentityPolicy::FeedEntry)).

use async_trait::async_trait;
use feed_rs::model::Entry;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{ExtractionSkip, RawPost};
use crate::pipeline::RunObserver;
use crate::services::PostSource;
use crate::utils::http::fetch_bytes;
use crate::utils::text::{html_images, html_to_text};

/// Posts read from a feed URL.
pub struct FeedSource {
    url: String,
    client: Client,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Parse a feed document. A blank document has no entries.
    ///
    /// Entries without an id in the document keep a blank id; feed-rs would
    /// otherwise make one up, randomly when the entry has no link or title.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<Entry>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let parser = feed_rs::parser::Builder::new()
            .id_generator(|_, _, _| String::new())
            .build();
        let feed = parser
            .parse(bytes)
            .map_err(|e| AppError::fetch(&self.url, e))?;
        Ok(feed.entries)
    }

    /// Convert one feed entry into a post.
    pub fn entry_to_post(entry: &Entry) -> std::result::Result<RawPost, ExtractionSkip> {
        let link = entry
            .links
            .iter()
            .map(|l| l.href.trim())
            .find(|href| !href.is_empty())
            .unwrap_or("")
            .to_string();

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());

        let content_html = entry
            .content
            .as_ref()
            .and_then(|c| c.body.as_deref())
            .filter(|body| !body.trim().is_empty())
            .or_else(|| entry.summary.as_ref().map(|s| s.content.as_str()))
            .unwrap_or("");

        let text = html_to_text(content_html);

        if link.is_empty() && title.is_none() && text.is_empty() {
            return Err(ExtractionSkip::Empty);
        }

        let image_url = html_images(content_html).into_iter().next().or_else(|| {
            entry
                .media
                .iter()
                .flat_map(|m| m.content.iter())
                .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
        });

        let entry_id = Some(entry.id.trim().to_string()).filter(|id| !id.is_empty());

        Ok(RawPost {
            url: link,
            text,
            image_url,
            title,
            entry_id,
        })
    }
}

#[async_trait]
impl PostSource for FeedSource {
    type Record = Entry;

    fn describe(&self) -> String {
        format!("feed {}", self.url)
    }

    async fn fetch(&self, _observer: &dyn RunObserver) -> Result<Vec<Entry>> {
        log::info!("Fetching feed: {}", self.url);
        let bytes = fetch_bytes(&self.client, &self.url).await?;
        let entries = self.parse(&bytes)?;
        if entries.is_empty() {
            log::info!("No entries in feed");
        }
        Ok(entries)
    }

    fn extract(&self, record: &Entry) -> std::result::Result<RawPost, ExtractionSkip> {
        Self::entry_to_post(record)
    }
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;
    use crate::models::PostId;
    use crate::pipeline::IdentityPolicy;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Newark Parkrun</title>
    <link>https://www.facebook.com/newarkparkrun</link>
    <description>Posts</description>
    <item>
      <title>Volunteers needed</title>
      <link>https://www.facebook.com/newarkparkrun/posts/pfbid02second</link>
      <guid isPermaLink="false">entry-2</guid>
      <description>&lt;p&gt;Summary only&lt;/p&gt;</description>
      <content:encoded><![CDATA[<p>We need <b>marshals</b> this week.</p><img src="data:image/gif;base64,R0lG"><img src="https://scontent.example.com/v.jpg">]]></content:encoded>
    </item>
    <item>
      <title>Course update</title>
      <link>https://www.facebook.com/newarkparkrun/posts/pfbid02first</link>
      <guid isPermaLink="false">entry-1</guid>
      <description>&lt;p&gt;The course is flooded.&lt;/p&gt;</description>
    </item>
  </channel>
</rss>"#;

    fn source() -> FeedSource {
        FeedSource::new("https://rss.example.com/feed.xml", Client::new())
    }

    #[test]
    fn test_parse_entries_in_feed_order() {
        let entries = source().parse(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "entry-2");
    }

    #[test]
    fn test_content_takes_priority_over_summary() {
        let entries = source().parse(RSS.as_bytes()).unwrap();
        let post = FeedSource::entry_to_post(&entries[0]).unwrap();

        assert_eq!(post.title.as_deref(), Some("Volunteers needed"));
        assert_eq!(post.url, "https://www.facebook.com/newarkparkrun/posts/pfbid02second");
        assert_eq!(post.text, "We need\nmarshals\nthis week.");
        assert_eq!(
            post.image_url.as_deref(),
            Some("https://scontent.example.com/v.jpg")
        );
        assert_eq!(post.entry_id.as_deref(), Some("entry-2"));
    }

    #[test]
    fn test_summary_used_without_content() {
        let entries = source().parse(RSS.as_bytes()).unwrap();
        let post = FeedSource::entry_to_post(&entries[1]).unwrap();

        assert_eq!(post.text, "The course is flooded.");
        assert_eq!(post.image_url, None);
    }

    const RSS_WITHOUT_GUIDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Newark Parkrun</title>
    <link>https://www.facebook.com/newarkparkrun</link>
    <description>Posts</description>
    <item>
      <title>Results are in</title>
      <link>https://www.facebook.com/newarkparkrun/posts/pfbid02results</link>
      <description>312 finishers this morning.</description>
    </item>
    <item>
      <description>Photos from Saturday are up.</description>
    </item>
  </channel>
</rss>"#;

    fn feed_ids(document: &str) -> Vec<PostId> {
        source()
            .parse(document.as_bytes())
            .unwrap()
            .iter()
            .map(|entry| {
                let post = FeedSource::entry_to_post(entry).unwrap();
                IdentityPolicy::FeedEntry.resolve(&post).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_entries_without_guid_keep_blank_id() {
        let entries = source().parse(RSS_WITHOUT_GUIDS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(FeedSource::entry_to_post(entry).unwrap().entry_id, None);
        }
    }

    #[test]
    fn test_ids_without_guid_are_stable_across_parses() {
        let first = feed_ids(RSS_WITHOUT_GUIDS);
        let second = feed_ids(RSS_WITHOUT_GUIDS);
        assert_eq!(first, second);

        let expected = hex::encode(Sha256::digest(
            "https://www.facebook.com/newarkparkrun/posts/pfbid02resultsResults are in".as_bytes(),
        ));
        assert_eq!(first[0], PostId::new(expected));
    }

    #[test]
    fn test_blank_document_has_no_entries() {
        assert!(source().parse(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_fetch_error() {
        let err = source().parse(b"<html>not a feed</html>").unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
