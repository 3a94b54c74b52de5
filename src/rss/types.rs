//! Type definitions for the RSS module.

use serde::Serialize;
use std::path::PathBuf;
use tokio::time::Duration;

use crate::posting::FeedItem;

/// Where a run gets its items from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Urls(Vec<String>),
    /// A saved RSS document, for offline runs.
    File(PathBuf),
}

/// A single source that could not be fetched or parsed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedFailure {
    pub source: String,
    pub error: String,
}

/// Everything a run pulled from its feed sources. Items keep the configured source
/// order, then document order within each source.
#[derive(Debug, Clone, Default)]
pub struct FeedBatch {
    pub items: Vec<FeedItem>,
    pub sources_attempted: usize,
    pub failures: Vec<FeedFailure>,
}

impl FeedBatch {
    /// Every attempted source failed. An empty source list is not a failure.
    pub fn all_failed(&self) -> bool {
        self.sources_attempted > 0 && self.failures.len() == self.sources_attempted
    }
}

// Constants
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
