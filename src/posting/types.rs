//! Type definitions for postings and the raw feed items they are built from.

/// A job listing as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Posting {
    pub id: String,
    pub title: String,
    /// Source publish time, epoch seconds.
    pub date: i64,
    /// Always empty for now, the feeds do not carry a reliable company field.
    pub company: String,
    /// When the posting was first ingested, epoch seconds.
    pub date_processed: i64,
    pub description: String,
    pub url: String,
    pub delivered: bool,
    pub delivered_date: Option<i64>,
}

/// One entry as it came out of a feed, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub link: String,
    pub title: String,
    pub pub_date: Option<String>,
    pub content_snippet: String,
    /// Feed URL (or file path) the item was read from.
    pub source: String,
}
