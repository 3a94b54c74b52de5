use regex::{Regex, RegexBuilder};

use super::normalize::{build_pattern, split_pattern};
use crate::error::{Error, Result};

/// One blacklist entry. Literal words are compiled into a whole-word, case-insensitive
/// matcher when the configuration is read.
#[derive(Debug, Clone)]
pub enum BlacklistEntry {
    Literal { word: String, matcher: Regex },
    Pattern(Regex),
}

impl BlacklistEntry {
    pub fn literal(word: &str) -> Result<Self> {
        let matcher = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid blacklist word '{}': {}", word, e)))?;
        Ok(BlacklistEntry::Literal {
            word: word.to_string(),
            matcher,
        })
    }

    /// `/source/flags` becomes a pattern, anything else a literal word.
    pub fn parse(raw: &str) -> Result<Self> {
        match split_pattern(raw) {
            Some((source, flags)) => Ok(BlacklistEntry::Pattern(build_pattern(source, flags)?)),
            None => Self::literal(raw),
        }
    }

    pub fn is_match(&self, title: &str) -> bool {
        match self {
            BlacklistEntry::Literal { matcher, .. } => matcher.is_match(title),
            BlacklistEntry::Pattern(re) => re.is_match(title),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlacklistEntry::Literal { word, .. } => word,
            BlacklistEntry::Pattern(re) => re.as_str(),
        }
    }
}

pub fn parse_blacklist<S: AsRef<str>>(raw: &[S]) -> Result<Vec<BlacklistEntry>> {
    raw.iter()
        .map(|entry| entry.as_ref().trim())
        .filter(|entry| !entry.is_empty())
        .map(BlacklistEntry::parse)
        .collect()
}

/// True when no entry matches `title`.
pub fn is_allowed(title: &str, blacklist: &[BlacklistEntry]) -> bool {
    first_match(title, blacklist).is_none()
}

/// The first entry that rejects `title`, if any.
pub fn first_match<'a>(title: &str, blacklist: &'a [BlacklistEntry]) -> Option<&'a BlacklistEntry> {
    blacklist.iter().find(|entry| entry.is_match(title))
}
