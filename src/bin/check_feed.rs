use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::process;

use vagas::environment::{split_list, DEFAULT_BLACKLIST, DEFAULT_TITLE_CLEANUP};
use vagas::posting::{build_posting, first_match, parse_blacklist, FeedItem, TitleCleanup};
use vagas::rss;

#[derive(Parser)]
#[clap(name = "check-feed", about = "Fetch one feed and show what a run would do with it")]
struct Cli {
    /// Feed URL, or a path to a saved RSS document
    source: String,

    /// Print the verdicts as JSON
    #[clap(long)]
    json: bool,

    /// Number of entries to show
    #[clap(short, long, default_value = "50")]
    limit: usize,
}

#[derive(Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
enum Verdict {
    Kept,
    Blacklisted { entry: String },
    Duplicate,
}

#[derive(Serialize)]
struct Checked {
    id: String,
    raw_title: String,
    title: String,
    url: String,
    date: i64,
    #[serde(flatten)]
    verdict: Verdict,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let items = match load(&args.source).await {
        Ok(items) => items,
        Err(err) => {
            eprintln!("{} {:#}", "Failed to load feed:".bright_red(), err);
            process::exit(2);
        }
    };

    let blacklist = match env::var("BLACKLIST") {
        Ok(raw) if !raw.trim().is_empty() => parse_blacklist(&split_list(&raw))?,
        _ => parse_blacklist(DEFAULT_BLACKLIST)?,
    };
    let cleanup = match env::var("TITLE_CLEANUP") {
        Ok(raw) if !raw.trim().is_empty() => TitleCleanup::from_strs(&split_list(&raw))?,
        _ => TitleCleanup::from_strs(DEFAULT_TITLE_CLEANUP)?,
    };

    let now = chrono::Utc::now().timestamp();
    let mut seen = HashSet::new();
    let checked: Vec<Checked> = items
        .iter()
        .map(|item| {
            let posting = build_posting(item, &cleanup, now);
            let verdict = if !seen.insert(posting.id.clone()) {
                Verdict::Duplicate
            } else if let Some(entry) = first_match(&posting.title, &blacklist) {
                Verdict::Blacklisted {
                    entry: entry.as_str().to_string(),
                }
            } else {
                Verdict::Kept
            };
            Checked {
                id: posting.id,
                raw_title: item.title.clone(),
                title: posting.title,
                url: posting.url,
                date: posting.date,
                verdict,
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checked)?);
        return Ok(());
    }

    println!("\n{}", "═".repeat(100).bright_blue());
    println!("{}  {}", "FEED CHECK".bright_blue(), args.source.bright_yellow());
    println!("{}", "═".repeat(100).bright_blue());
    println!("{}: {}", "Entries Found".bright_blue(), checked.len());

    for (i, entry) in checked.iter().take(args.limit).enumerate() {
        let verdict = match &entry.verdict {
            Verdict::Kept => "kept".bright_green(),
            Verdict::Blacklisted { entry } => format!("blacklisted by {}", entry).bright_red(),
            Verdict::Duplicate => "duplicate".bright_yellow(),
        };
        println!("\n{}. {} [{}]", i + 1, entry.title.bright_white(), verdict);
        if entry.raw_title != entry.title {
            println!("   {} {}", "raw:".dimmed(), entry.raw_title.dimmed());
        }
        println!("   {} {}", "id:".dimmed(), entry.id);
        println!("   {}", entry.url.bright_cyan());
    }

    if checked.len() > args.limit {
        println!("... and {} more entries", checked.len() - args.limit);
    }

    let kept = checked
        .iter()
        .filter(|c| matches!(c.verdict, Verdict::Kept))
        .count();
    println!("\n{}", "═".repeat(100).bright_blue());
    println!("{} of {} entries would be stored", kept, checked.len());
    Ok(())
}

async fn load(source: &str) -> Result<Vec<FeedItem>> {
    if rss::is_valid_url(source) {
        let client = rss::create_http_client()?;
        rss::fetch_one(&client, source).await
    } else {
        rss::read_feed_file(&PathBuf::from(source)).await
    }
}
