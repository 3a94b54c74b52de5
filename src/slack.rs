use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::environment::SlackConfig;
use crate::posting::Posting;
use crate::TARGET_SLACK;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Where announcements go.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text`, as a reply in `thread` when one is given. Returns the thread token
    /// of the new message when the channel hands one back.
    async fn post(&self, text: &str, thread: Option<&str>) -> Result<Option<String>>;
}

/// Thread header announcing how many postings follow.
pub fn header_text(count: usize, city: &str) -> String {
    let lead = if count > 1 {
        "Vagas de trabalho encontradas"
    } else {
        "Vaga de trabalho encontrada"
    };
    format!("{} em *{}*. Confira!", lead, city)
}

/// One threaded reply per posting.
pub fn posting_text(posting: &Posting) -> String {
    format!("*{}* - {}", posting.title, posting.url)
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    ts: Option<String>,
    error: Option<String>,
}

/// Header through the Web API (it returns a `ts` to thread on), replies through the
/// incoming webhook.
pub struct SlackNotifier {
    client: Client,
    config: SlackConfig,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| anyhow!("Failed to build Slack HTTP client: {}", e))?;
        Ok(Self { client, config })
    }

    async fn post_message(&self, text: &str) -> Result<Option<String>> {
        let payload = json!({
            "channel": self.config.channel,
            "text": text,
            "unfurl_links": false,
            "unfurl_media": false,
        });

        debug!(target: TARGET_SLACK, "Posting thread header: {}", payload);
        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.config.bot_token)
            .json(&payload)
            .send()
            .await
            .context("chat.postMessage request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(target: TARGET_SLACK, " !! Error posting Slack header ({}): {}", status, error_text);
            return Err(anyhow!("chat.postMessage returned {}: {}", status, error_text));
        }

        let body: PostMessageResponse = response
            .json()
            .await
            .context("Unreadable chat.postMessage response")?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            error!(target: TARGET_SLACK, " !! Slack rejected header: {}", reason);
            return Err(anyhow!("chat.postMessage failed: {}", reason));
        }

        info!(target: TARGET_SLACK, " ** Slack header posted");
        Ok(body.ts)
    }

    async fn send_webhook(&self, text: &str, thread: &str) -> Result<()> {
        let payload = json!({
            "text": text,
            "thread_ts": thread,
        });

        debug!(target: TARGET_SLACK, "Sending webhook reply: {}", payload);
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("Webhook request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(target: TARGET_SLACK, " !! Error sending Slack webhook ({}): {}", status, error_text);
            error!(target: TARGET_SLACK, " !! Payload: {}", payload);
            return Err(anyhow!("Webhook returned {}: {}", status, error_text));
        }

        info!(target: TARGET_SLACK, " ** Slack notification sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post(&self, text: &str, thread: Option<&str>) -> Result<Option<String>> {
        match thread {
            None => self.post_message(text).await,
            Some(ts) => {
                self.send_webhook(text, ts).await?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text() {
        assert_eq!(
            header_text(1, "Londrina"),
            "Vaga de trabalho encontrada em *Londrina*. Confira!"
        );
        assert_eq!(
            header_text(3, "Londrina"),
            "Vagas de trabalho encontradas em *Londrina*. Confira!"
        );
    }

    #[test]
    fn test_posting_text() {
        let posting = Posting {
            id: "abc123".to_string(),
            title: "Desenvolvedor PHP".to_string(),
            date: 0,
            company: String::new(),
            date_processed: 0,
            description: String::new(),
            url: "https://www.indeed.com.br/viewjob?jk=abc123".to_string(),
            delivered: false,
            delivered_date: None,
        };
        assert_eq!(
            posting_text(&posting),
            "*Desenvolvedor PHP* - https://www.indeed.com.br/viewjob?jk=abc123"
        );
    }

    #[test]
    fn test_post_message_response() {
        let ok: PostMessageResponse =
            serde_json::from_str(r#"{"ok":true,"channel":"C1","ts":"1718030000.000100"}"#).unwrap();
        assert!(ok.ok);
        assert_eq!(ok.ts.as_deref(), Some("1718030000.000100"));

        let failed: PostMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        assert!(!failed.ok);
        assert_eq!(failed.error.as_deref(), Some("channel_not_found"));
    }
}
