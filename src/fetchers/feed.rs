use super::SourceFetcher;
use crate::error::{IngestError, Result};
use crate::types::{RawItem, SourceDescriptor};
use async_trait::async_trait;
use feed_rs::model::Feed;
use serde_json::json;
use tracing::debug;

pub struct FeedFetcher;

#[async_trait]
impl SourceFetcher for FeedFetcher {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawItem>> {
        debug!(source = %source.id, url = %source.url, "fetching feed");
        let response = client.get(&source.url).send().await?;
        if !response.status().is_success() {
            return Err(IngestError::Source {
                message: format!("feed fetch failed: HTTP {}", response.status().as_u16()),
            });
        }

        let bytes = response.bytes().await?;
        let feed = feed_rs::parser::parse(bytes.as_ref()).map_err(|e| IngestError::Source {
            message: format!("feed parse failed: {e}"),
        })?;

        Ok(flatten_entries(feed))
    }
}

/// Flatten feed entries into the flat field names the transforms expect;
/// one raw item per entry, published timestamp preferred over updated.
fn flatten_entries(feed: Feed) -> Vec<RawItem> {
    feed.entries
        .into_iter()
        .map(|entry| {
            json!({
                "title": entry.title.map(|t| t.content),
                "link": entry.links.first().map(|l| l.href.clone()),
                "date": entry
                    .published
                    .or(entry.updated)
                    .map(|d| d.to_rfc3339()),
                "description": entry.summary.map(|s| s.content),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0">
          <channel>
            <title>City Events</title>
            <item>
              <title>Jazz Night</title>
              <link>https://example.com/events/jazz-night</link>
              <pubDate>Wed, 24 Dec 2025 19:00:00 GMT</pubDate>
              <description>An evening of jazz.</description>
            </item>
            <item>
              <title>Craft Market</title>
              <link>https://example.com/events/craft-market</link>
            </item>
          </channel>
        </rss>"#;

    #[test]
    fn test_flatten_rss_entries() {
        let feed = feed_rs::parser::parse(RSS.as_bytes()).unwrap();
        let items = flatten_entries(feed);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "Jazz Night");
        assert_eq!(items[0]["link"], "https://example.com/events/jazz-night");
        assert_eq!(items[0]["date"], "2025-12-24T19:00:00+00:00");
        assert_eq!(items[0]["description"], "An evening of jazz.");
        // Entries without a timestamp still come through as items
        assert_eq!(items[1]["title"], "Craft Market");
        assert!(items[1]["date"].is_null());
    }
}
