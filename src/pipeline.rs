//! One run: fetch, build postings, reconcile with the store, announce.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::settings::LAST_RUN_AT;
use crate::db::Database;
use crate::delivery::deliver_pending;
use crate::environment::Config;
use crate::error::{Error, Result};
use crate::posting::{build_posting, dedupe_by_id, first_match, BlacklistEntry, FeedItem, Posting, TitleCleanup};
use crate::reconcile::reconcile;
use crate::rss::{fetch_items, FeedFailure};
use crate::slack::Notifier;
use crate::TARGET_PIPELINE;

/// Everything a run needs, built once at start-up.
pub struct RunContext<N: Notifier> {
    pub db: Database,
    pub notifier: N,
    pub config: Config,
}

/// Postings ready for reconciliation plus what was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub postings: Vec<Posting>,
    pub duplicates: usize,
    pub rejected: Vec<Posting>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub fetched: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub pending: usize,
    pub delivered: usize,
    pub feed_failures: Vec<FeedFailure>,
}

/// Normalize, identify, dedupe and filter a batch of raw items. Pure.
pub fn prepare_postings(
    items: &[FeedItem],
    cleanup: &TitleCleanup,
    blacklist: &[BlacklistEntry],
    now: i64,
) -> Prepared {
    let built: Vec<Posting> = items
        .iter()
        .map(|item| build_posting(item, cleanup, now))
        .collect();
    let total = built.len();
    let unique = dedupe_by_id(built);
    let duplicates = total - unique.len();

    let (postings, rejected): (Vec<_>, Vec<_>) = unique.into_iter().partition(|posting| {
        match first_match(&posting.title, blacklist) {
            Some(entry) => {
                debug!(
                    target: TARGET_PIPELINE,
                    "Blacklisted '{}' by {}",
                    posting.title,
                    entry.as_str()
                );
                false
            }
            None => true,
        }
    });

    Prepared {
        postings,
        duplicates,
        rejected,
    }
}

/// Run the whole pipeline once. Feed sources fail independently; any other failure
/// ends the run with an error.
pub async fn run_once<N: Notifier>(ctx: &RunContext<N>) -> Result<RunSummary> {
    let config = &ctx.config;

    let batch = fetch_items(&config.feed_source, config.pacing)
        .await
        .map_err(|e| Error::Config(format!("{:#}", e)))?;

    if batch.all_failed() {
        return Err(Error::FeedsUnavailable(batch.sources_attempted));
    }
    for failure in &batch.failures {
        warn!(target: TARGET_PIPELINE, "Feed {} skipped this run: {}", failure.source, failure.error);
    }

    let now = Utc::now().timestamp();
    let prepared = prepare_postings(&batch.items, &config.title_cleanup, &config.blacklist, now);
    info!(
        target: TARGET_PIPELINE,
        "Fetched {} items: {} duplicates, {} blacklisted, {} kept",
        batch.items.len(),
        prepared.duplicates,
        prepared.rejected.len(),
        prepared.postings.len()
    );

    let reconciliation = reconcile(&ctx.db, prepared.postings, config.pacing).await?;
    info!(target: TARGET_PIPELINE, "Found {} job offers.", reconciliation.pending.len());

    let delivered = deliver_pending(
        &ctx.db,
        &ctx.notifier,
        &reconciliation.pending,
        &config.city,
        config.pacing,
    )
    .await?;

    ctx.db.set_setting(LAST_RUN_AT, &now.to_string()).await?;

    Ok(RunSummary {
        fetched: batch.items.len(),
        duplicates: prepared.duplicates,
        rejected: prepared.rejected.len(),
        inserted: reconciliation.inserted.len(),
        pending: reconciliation.pending.len(),
        delivered: delivered.len(),
        feed_failures: batch.failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::parse_blacklist;

    fn item(link: &str, title: &str) -> FeedItem {
        FeedItem {
            link: link.to_string(),
            title: title.to_string(),
            pub_date: None,
            content_snippet: String::new(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_prepare_postings() {
        let cleanup = TitleCleanup::from_strs(&["- Londrina, PR"]).unwrap();
        let blacklist = parse_blacklist(&["/vendedor/i"]).unwrap();
        let items = vec![
            item("https://x.example/v?jk=abc123", "Desenvolvedor PHP - Londrina, PR"),
            item("https://x.example/v", "Vendedor Externo"),
            item("https://x.example/v?jk=abc123&dup=1", "Desenvolvedor PHP (repost)"),
            item("https://x.example/other", "Programador Java - Londrina, PR"),
            item("https://x.example/again", "Programador Java"),
        ];

        let prepared = prepare_postings(&items, &cleanup, &blacklist, 7);
        let kept: Vec<_> = prepared.postings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(kept, vec!["Desenvolvedor PHP", "Programador Java"]);
        assert_eq!(prepared.duplicates, 2);
        assert_eq!(prepared.rejected.len(), 1);
        assert_eq!(prepared.rejected[0].title, "Vendedor Externo");
    }

    #[test]
    fn test_run_summary_json() {
        let summary = RunSummary {
            fetched: 4,
            inserted: 2,
            feed_failures: vec![FeedFailure {
                source: "http://a.example/rss".to_string(),
                error: "timed out".to_string(),
            }],
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fetched"], 4);
        assert_eq!(json["inserted"], 2);
        assert_eq!(json["feed_failures"][0]["source"], "http://a.example/rss");
    }
}
