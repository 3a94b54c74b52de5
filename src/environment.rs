//! Process configuration, read once from the environment at start-up.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

use crate::error::{Error, Result};
use crate::posting::{parse_blacklist, BlacklistEntry, TitleCleanup};
use crate::rss::FeedSource;

pub const DEFAULT_FEED_URLS: &[&str] = &[
    "http://www.indeed.com.br/rss?q=title%3Adesenvolvedor&l=Londrina%2C+PR&radius=0",
    "http://www.indeed.com.br/rss?q=title%3Aprogramador&l=Londrina%2C+PR&radius=0",
    "http://www.indeed.com.br/rss?q=title%3Afront-end&l=Londrina%2C+PR&radius=0",
    "http://www.indeed.com.br/rss?q=title%3Afrontend&l=Londrina%2C+PR&radius=0",
    "http://www.indeed.com.br/rss?q=title%3Ajava&l=Londrina%2C+PR&radius=0",
    "http://www.indeed.com.br/rss?q=title%3Aphp&l=Londrina%2C+PR&radius=0",
];

/// Plain entries are whole words; `/.../flags` entries are patterns.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "torno",
    "cnc",
    "ppcp",
    "usinagem",
    "bordado",
    "/venda?s/i",
    "/vendedor/i",
    "/servi[çÇ]os?/i",
    "/ve[íÍ]culos?/i",
    "/manuten[çÇ][ãÃ]o/i",
    "/neg[óÓ]cios?/i",
];

pub const DEFAULT_TITLE_CLEANUP: &[&str] = &["- Londrina, PR", "(Londrina PR)", "em Londrina/PR", "()"];

pub const DEFAULT_CHANNEL: &str = "#vagas";
pub const DEFAULT_CITY: &str = "Londrina";
pub const DEFAULT_DATABASE_PATH: &str = "data/db.sqlite";
pub const DEFAULT_PACING_MS: u64 = 1000;

const LIST_DELIMITER: char = ';';

#[derive(Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub bot_token: String,
    pub channel: String,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("webhook_url", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("channel", &self.channel)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub slack: SlackConfig,
    pub feed_source: FeedSource,
    pub blacklist: Vec<BlacklistEntry>,
    pub title_cleanup: TitleCleanup,
    pub city: String,
    pub database_path: PathBuf,
    /// Fixed delay between feed requests, store writes and notification sends.
    pub pacing: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let (webhook_url, bot_token) = match (get("SLACK_WEBHOOK_URL"), get("SLACK_BOT_TOKEN")) {
            (Some(webhook_url), Some(bot_token)) => (webhook_url, bot_token),
            _ => {
                return Err(Error::Config(
                    "SLACK_WEBHOOK_URL or SLACK_BOT_TOKEN are undefined".to_string(),
                ))
            }
        };

        let slack = SlackConfig {
            webhook_url,
            bot_token,
            channel: get("SLACK_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
        };

        let feed_source = match get("FEED_FILE") {
            Some(path) => FeedSource::File(PathBuf::from(path)),
            None => FeedSource::Urls(match get("FEED_URLS") {
                Some(urls) => split_list(&urls),
                None => to_strings(DEFAULT_FEED_URLS),
            }),
        };

        let blacklist = match get("BLACKLIST") {
            Some(raw) => parse_blacklist(&split_list(&raw))?,
            None => parse_blacklist(DEFAULT_BLACKLIST)?,
        };

        let title_cleanup = match get("TITLE_CLEANUP") {
            Some(raw) => TitleCleanup::from_strs(&split_list(&raw))?,
            None => TitleCleanup::from_strs(DEFAULT_TITLE_CLEANUP)?,
        };

        let pacing = match get("PACING_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                Error::Config(format!("PACING_DELAY_MS must be a number of milliseconds, got '{}'", raw))
            })?),
            None => Duration::from_millis(DEFAULT_PACING_MS),
        };

        Ok(Config {
            slack,
            feed_source,
            blacklist,
            title_cleanup,
            city: get("CITY_NAME").unwrap_or_else(|| DEFAULT_CITY.to_string()),
            database_path: PathBuf::from(
                get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            ),
            pacing,
        })
    }
}

/// Create the directory holding the store file if needed.
pub fn ensure_data_dir(database_path: &Path) -> Result<()> {
    match database_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir).map_err(|e| {
            Error::Config(format!("Error creating data dir {}: {}", dir.display(), e))
        }),
        _ => Ok(()),
    }
}

/// Splits a delimited value into trimmed, non-empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
