//! Feed parsing for RSS and Atom documents.

use anyhow::{anyhow, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use std::io::Cursor;
use tracing::{debug, error, warn};

use super::util::{cleanup_xml, strip_html};
use crate::posting::FeedItem;
use crate::TARGET_WEB_REQUEST;

/// Parse a feed document into raw items. Malformed XML gets one cleanup pass before
/// the document is rejected.
pub fn parse_feed(text: &str, source: &str) -> Result<Vec<FeedItem>> {
    let feed = match parser::parse(Cursor::new(text)) {
        Ok(feed) => feed,
        Err(first_err) => {
            let cleaned_xml = cleanup_xml(text);

            if !(cleaned_xml.contains("<rss") || cleaned_xml.contains("<feed")) {
                let preview = if text
                    .chars()
                    .all(|c| c.is_ascii_graphic() || c.is_whitespace())
                {
                    text.chars().take(100).collect::<String>()
                } else {
                    "[binary data]".to_string()
                };
                error!(
                    target: TARGET_WEB_REQUEST,
                    "Feed from {} doesn't appear to be RSS or Atom. Content preview: {}",
                    source,
                    preview
                );
                return Err(anyhow!("Content is not RSS or Atom feed"));
            }

            match parser::parse(Cursor::new(cleaned_xml)) {
                Ok(feed) => {
                    debug!(target: TARGET_WEB_REQUEST, "Feed from {} parsed after XML cleanup", source);
                    feed
                }
                Err(second_err) => {
                    error!(
                        target: TARGET_WEB_REQUEST,
                        "Failed to parse feed from {} after cleanup. First error: {}. Second error: {}",
                        source,
                        first_err,
                        second_err
                    );
                    return Err(anyhow!("XML parsing error even after cleanup"));
                }
            }
        }
    };

    debug!(target: TARGET_WEB_REQUEST, "Parsed feed from {} with {} entries", source, feed.entries.len());

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| entry_to_item(entry, source))
        .collect())
}

fn entry_to_item(entry: Entry, source: &str) -> Option<FeedItem> {
    let Some(link) = entry.links.first().map(|link| link.href.clone()) else {
        warn!(target: TARGET_WEB_REQUEST, "Feed entry from {} missing link, skipping", source);
        return None;
    };
    let Some(title) = entry.title.map(|t| t.content) else {
        warn!(target: TARGET_WEB_REQUEST, "Feed entry {} missing title, skipping", link);
        return None;
    };

    let pub_date = entry.published.or(entry.updated).map(|d| d.to_rfc3339());
    let content_snippet = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .map(|html| strip_html(&html))
        .unwrap_or_default();

    Some(FeedItem {
        link,
        title: title.trim().to_string(),
        pub_date,
        content_snippet,
        source: source.to_string(),
    })
}
