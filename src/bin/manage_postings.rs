use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::env;
use std::path::PathBuf;

use vagas::db::settings::{LAST_RUN_AT, LAST_THREAD_TS};
use vagas::db::Database;
use vagas::environment::DEFAULT_DATABASE_PATH;

#[derive(Parser)]
#[clap(name = "posting-manager", about = "Inspect stored job postings")]
struct Cli {
    /// Store file, defaults to DATABASE_PATH
    #[clap(long)]
    database: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored postings, most recently stored first
    List {
        /// Only postings still waiting to be announced
        #[clap(short, long, conflicts_with = "delivered")]
        pending: bool,

        /// Only postings already announced
        #[clap(short, long)]
        delivered: bool,

        /// Number of postings to show
        #[clap(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show one posting
    Show {
        /// Posting ID
        #[clap(required = true)]
        id: String,
    },

    /// Totals and last run information
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let path = args.database.unwrap_or_else(|| {
        PathBuf::from(env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()))
    });
    let db = Database::new(&path).await?;

    match args.command {
        Commands::List {
            pending,
            delivered,
            limit,
        } => {
            let filter = match (pending, delivered) {
                (true, _) => Some(false),
                (_, true) => Some(true),
                _ => None,
            };
            list_postings(&db, filter, limit).await?;
        }
        Commands::Show { id } => show_posting(&db, &id).await?,
        Commands::Stats => show_stats(&db).await?,
    }

    db.close().await;
    Ok(())
}

fn format_timestamp(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max).collect::<String>())
    }
}

/// Lists postings in a formatted table
async fn list_postings(db: &Database, delivered: Option<bool>, limit: i64) -> Result<()> {
    let postings = db.list_postings(delivered, limit).await?;

    if postings.is_empty() {
        println!("No postings stored");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Published"),
        Cell::new("Title"),
        Cell::new("Delivered"),
    ]));

    for posting in postings {
        let delivered = match posting.delivered_date {
            Some(ts) if posting.delivered => format_timestamp(ts),
            _ if posting.delivered => "yes".to_string(),
            _ => "pending".to_string(),
        };
        table.add_row(Row::new(vec![
            Cell::new(&truncate(&posting.id, 16)),
            Cell::new(&format_timestamp(posting.date)),
            Cell::new(&truncate(&posting.title, 60)),
            Cell::new(&delivered),
        ]));
    }

    table.printstd();
    Ok(())
}

async fn show_posting(db: &Database, id: &str) -> Result<()> {
    let posting = match db.find_posting(id).await? {
        Some(p) => p,
        None => {
            println!("❌ Posting {} not found", id);
            return Ok(());
        }
    };

    println!("📌 Posting {}", posting.id);
    println!("{}", "─".repeat(80));
    println!("Title:     {}", posting.title);
    println!("URL:       {}", posting.url);
    println!("Published: {}", format_timestamp(posting.date));
    println!("Stored:    {}", format_timestamp(posting.date_processed));
    match posting.delivered_date {
        Some(ts) => println!("Delivered: {}", format_timestamp(ts)),
        None => println!("Delivered: pending"),
    }
    if !posting.description.is_empty() {
        println!("\n{}", truncate(&posting.description, 500));
    }
    Ok(())
}

async fn show_stats(db: &Database) -> Result<()> {
    let (total, pending) = db.posting_counts().await?;
    let last_run = db
        .get_setting(LAST_RUN_AT)
        .await?
        .and_then(|v| v.parse::<i64>().ok())
        .map(format_timestamp)
        .unwrap_or_else(|| "never".to_string());
    let last_thread = db
        .get_setting(LAST_THREAD_TS)
        .await?
        .unwrap_or_else(|| "none".to_string());

    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Total postings"), Cell::new(&total.to_string())]));
    table.add_row(Row::new(vec![Cell::new("Pending"), Cell::new(&pending.to_string())]));
    table.add_row(Row::new(vec![
        Cell::new("Delivered"),
        Cell::new(&(total - pending).to_string()),
    ]));
    table.add_row(Row::new(vec![Cell::new("Last run"), Cell::new(&last_run)]));
    table.add_row(Row::new(vec![Cell::new("Last thread"), Cell::new(&last_thread)]));
    table.printstd();
    Ok(())
}
