//! Announce pending postings and record which ones made it.
//!
//! Postings go out strictly in order as replies to a single thread header. The first
//! failure ends the run: everything from the failing posting on stays pending and is
//! retried from scratch next time.

use chrono::Utc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::db::settings::LAST_THREAD_TS;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::posting::Posting;
use crate::slack::{header_text, posting_text, Notifier};
use crate::TARGET_PIPELINE;

const HEADER_ID: &str = "thread header";

/// Record the outcome of announcing `posting_id`. Success marks the posting delivered
/// (a no-op if it already was); failure leaves it pending and becomes a notification
/// error.
pub async fn track_delivery<T>(
    db: &Database,
    posting_id: &str,
    outcome: anyhow::Result<T>,
) -> Result<T> {
    match outcome {
        Ok(value) => {
            db.mark_delivered(posting_id, Utc::now().timestamp()).await?;
            Ok(value)
        }
        Err(err) => Err(Error::Notification {
            id: posting_id.to_string(),
            reason: format!("{:#}", err),
        }),
    }
}

/// Post the thread header, then each posting in order. Returns the ids that were
/// announced and marked.
pub async fn deliver_pending<N: Notifier + ?Sized>(
    db: &Database,
    notifier: &N,
    pending: &[Posting],
    city: &str,
    pacing: Duration,
) -> Result<Vec<String>> {
    if pending.is_empty() {
        info!(target: TARGET_PIPELINE, "No new jobs to send to slack...");
        return Ok(Vec::new());
    }

    info!(target: TARGET_PIPELINE, "Processing {} items to send to slack...", pending.len());

    let thread = match notifier.post(&header_text(pending.len(), city), None).await {
        Ok(Some(ts)) => ts,
        Ok(None) => {
            return Err(Error::Notification {
                id: HEADER_ID.to_string(),
                reason: "no thread token returned".to_string(),
            })
        }
        Err(err) => {
            return Err(Error::Notification {
                id: HEADER_ID.to_string(),
                reason: format!("{:#}", err),
            })
        }
    };
    db.set_setting(LAST_THREAD_TS, &thread).await?;

    let mut delivered = Vec::with_capacity(pending.len());
    for (index, posting) in pending.iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        info!(target: TARGET_PIPELINE, "Processing item {}: {}", index + 1, posting.title);
        let outcome = notifier.post(&posting_text(posting), Some(&thread)).await;

        if let Err(err) = track_delivery(db, &posting.id, outcome).await {
            error!(
                target: TARGET_PIPELINE,
                "Stopping after {} of {} postings: {}",
                delivered.len(),
                pending.len(),
                err
            );
            return Err(err);
        }

        info!(target: TARGET_PIPELINE, "Done posting item {}", index + 1);
        delivered.push(posting.id.clone());
    }

    Ok(delivered)
}
