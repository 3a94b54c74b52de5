pub mod db;
pub mod delivery;
pub mod environment;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod posting;
pub mod reconcile;
pub mod rss;
pub mod slack;

pub use error::{Error, Result};

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_DB: &str = "db";
pub const TARGET_PIPELINE: &str = "pipeline";
pub const TARGET_SLACK: &str = "slack";
