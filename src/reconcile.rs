//! Diff fetched postings against the store.

use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::db::Database;
use crate::error::Result;
use crate::posting::Posting;
use crate::TARGET_PIPELINE;

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Ids appended to the store by this call, in arrival order.
    pub inserted: Vec<String>,
    /// Every undelivered posting in the store, newest publish date first.
    pub pending: Vec<Posting>,
}

/// Append the postings the store has never seen, then return everything still waiting
/// to be announced. Already known ids are left untouched, whatever their fields say now.
///
/// A failed write aborts the batch; postings written before it stay written.
pub async fn reconcile(
    db: &Database,
    incoming: Vec<Posting>,
    pacing: Duration,
) -> Result<Reconciliation> {
    let mut known = db.posting_ids().await?;
    let mut inserted = Vec::new();

    for posting in incoming {
        if known.contains(&posting.id) {
            debug!(target: TARGET_PIPELINE, "Already stored: {}", posting.id);
            continue;
        }

        if !inserted.is_empty() && !pacing.is_zero() {
            sleep(pacing).await;
        }

        if let Err(err) = db.insert_posting(&posting).await {
            error!(
                target: TARGET_PIPELINE,
                "Aborting batch after storing {} postings: {}",
                inserted.len(),
                err
            );
            return Err(err.into());
        }

        info!(target: TARGET_PIPELINE, "New posting {}: {}", posting.id, posting.title);
        known.insert(posting.id.clone());
        inserted.push(posting.id);
    }

    let pending = db.pending_postings().await?;
    debug!(
        target: TARGET_PIPELINE,
        "{} new postings stored, {} pending delivery",
        inserted.len(),
        pending.len()
    );

    Ok(Reconciliation { inserted, pending })
}
