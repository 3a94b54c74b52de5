//! Posting construction: title cleanup, identity, blacklist and batch dedup.
//!
//! Everything in here is pure. Store access lives in `db`, delivery in `delivery`.

pub mod blacklist;
pub mod dedupe;
pub mod identity;
pub mod normalize;
pub mod types;

pub use blacklist::{first_match, is_allowed, parse_blacklist, BlacklistEntry};
pub use dedupe::dedupe_by_id;
pub use identity::derive_id;
pub use normalize::{CleanupRule, TitleCleanup};
pub use types::*;

use tracing::debug;

use crate::rss::parse_date;
use crate::TARGET_PIPELINE;

/// Turns a raw feed item into an undelivered posting. `now` is the ingestion time and
/// doubles as the publish time when the item has no usable date.
pub fn build_posting(item: &FeedItem, cleanup: &TitleCleanup, now: i64) -> Posting {
    let title = cleanup.apply(&item.title);
    let id = derive_id(&item.link, &title);

    let date = match item.pub_date.as_deref().and_then(parse_date) {
        Some(published) => published.timestamp(),
        None => {
            debug!(target: TARGET_PIPELINE, "No usable publish date for {}: {:?}", id, item.pub_date);
            now
        }
    };

    Posting {
        id,
        title,
        date,
        company: String::new(),
        date_processed: now,
        description: item.content_snippet.clone(),
        url: item.link.clone(),
        delivered: false,
        delivered_date: None,
    }
}
