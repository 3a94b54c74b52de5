//! Feed retrieval for a single run.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use super::client::{create_http_client, fetch_feed_text};
use super::parser::parse_feed;
use super::types::{FeedBatch, FeedFailure, FeedSource};
use super::util::is_valid_url;
use crate::posting::FeedItem;
use crate::TARGET_WEB_REQUEST;

/// Collect items from every configured source. A failing source is logged and
/// recorded in the batch; it never stops the others.
pub async fn fetch_items(source: &FeedSource, pacing: Duration) -> Result<FeedBatch> {
    match source {
        FeedSource::Urls(urls) => {
            let client = create_http_client()?;
            Ok(fetch_urls(&client, urls, pacing).await)
        }
        FeedSource::File(path) => {
            let mut batch = FeedBatch {
                sources_attempted: 1,
                ..Default::default()
            };
            match read_feed_file(path).await {
                Ok(items) => batch.items = items,
                Err(err) => {
                    error!(target: TARGET_WEB_REQUEST, "Failed to read feed file {}: {:#}", path.display(), err);
                    batch.failures.push(FeedFailure {
                        source: path.display().to_string(),
                        error: format!("{:#}", err),
                    });
                }
            }
            Ok(batch)
        }
    }
}

/// Fetch each URL in order, sleeping `pacing` between requests.
pub async fn fetch_urls(client: &reqwest::Client, urls: &[String], pacing: Duration) -> FeedBatch {
    let mut batch = FeedBatch::default();

    for (index, url) in urls.iter().enumerate() {
        if url.trim().is_empty() {
            debug!(target: TARGET_WEB_REQUEST, "Skipping empty feed URL");
            continue;
        }

        if index > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        batch.sources_attempted += 1;

        match fetch_one(client, url).await {
            Ok(items) => {
                info!(target: TARGET_WEB_REQUEST, "Loaded {} items from {}", items.len(), url);
                batch.items.extend(items);
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, "Failed to process feed {}: {:#}", url, err);
                batch.failures.push(FeedFailure {
                    source: url.clone(),
                    error: format!("{:#}", err),
                });
            }
        }
    }

    if !batch.failures.is_empty() {
        warn!(
            target: TARGET_WEB_REQUEST,
            "{} of {} feed sources failed",
            batch.failures.len(),
            batch.sources_attempted
        );
    }

    batch
}

/// Fetch and parse a single feed URL.
pub async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<Vec<FeedItem>> {
    if !is_valid_url(url) {
        return Err(anyhow!("Invalid feed URL: {}", url));
    }

    let text = fetch_feed_text(client, url).await?;
    parse_feed(&text, url)
}

/// Read items from a saved feed document.
pub async fn read_feed_file(path: &Path) -> Result<Vec<FeedItem>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let items = parse_feed(&text, &path.display().to_string())?;

    if items.is_empty() {
        return Err(anyhow!("No job entries were found in {}", path.display()));
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ONE_ITEM: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>http://example.com</link><description>d</description>
<item><title>Programador Java</title><link>http://example.com/job?jk=j1</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ONE_ITEM.as_bytes()).unwrap();

        let batch = fetch_items(&FeedSource::File(file.path().to_path_buf()), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(batch.sources_attempted, 1);
        assert!(batch.failures.is_empty());
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.items[0].title, "Programador Java");
    }

    #[tokio::test]
    async fn test_missing_file_is_recorded_failure() {
        let dir = tempfile::tempdir().unwrap();
        let batch = fetch_items(&FeedSource::File(dir.path().join("nope.rss")), Duration::ZERO)
            .await
            .unwrap();
        assert!(batch.all_failed());
        assert!(batch.items.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_urls_fail_individually() {
        let client = create_http_client().unwrap();
        let urls = vec![
            "".to_string(),
            "not-a-url".to_string(),
            "ftp://example.com/feed".to_string(),
        ];
        let batch = fetch_urls(&client, &urls, Duration::ZERO).await;
        assert_eq!(batch.sources_attempted, 2);
        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[0].source, "not-a-url");
        assert!(batch.all_failed());
    }
}
