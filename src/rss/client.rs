//! HTTP client creation and request handling for feeds.

use anyhow::{anyhow, Context, Result};
use reqwest::header;
use tokio::time::timeout;
use tracing::debug;

use super::types::REQUEST_TIMEOUT;
use super::util::decode_body;
use crate::TARGET_WEB_REQUEST;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client shared by every feed request of a run.
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Fetch a feed document and return it as text.
pub async fn fetch_feed_text(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);

    let response = timeout(
        REQUEST_TIMEOUT,
        client
            .get(url)
            .header(header::ACCEPT, "application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9")
            .send(),
    )
    .await
    .map_err(|_| {
        anyhow!(
            "Request timed out after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        )
    })?
    .with_context(|| format!("Request to {} failed", url))?;

    if !response.status().is_success() {
        return Err(anyhow!("Non-success status {} from {}", response.status(), url));
    }

    debug!(target: TARGET_WEB_REQUEST, "Response Content-Type: {:?}",
           response.headers().get(header::CONTENT_TYPE));

    let content_encoding = response
        .headers()
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_lowercase());

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read response bytes from {}", url))?;

    let decoded = decode_body(&bytes, content_encoding.as_deref(), url);
    String::from_utf8(decoded).map_err(|_| anyhow!("Failed to decode content as UTF-8 from {}", url))
}
