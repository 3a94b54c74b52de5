//! Feed retrieval and parsing.
//!
//! Turns the configured feed sources into raw [`FeedItem`](crate::posting::FeedItem)s.
//! Nothing in here knows about identities or the store.

mod client;
mod fetcher;
mod parser;
mod types;
mod util;

pub use self::types::*;

pub use self::client::{create_http_client, fetch_feed_text};
pub use self::fetcher::{fetch_items, fetch_one, fetch_urls, read_feed_file};
pub use self::parser::parse_feed;
pub use self::util::*;
