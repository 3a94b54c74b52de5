use std::process::ExitCode;
use tracing::{debug, error, info};

use vagas::db::Database;
use vagas::environment::{ensure_data_dir, Config};
use vagas::logging::configure_logging;
use vagas::pipeline::{run_once, RunContext};
use vagas::slack::SlackNotifier;
use vagas::{Error, TARGET_PIPELINE};

#[tokio::main]
async fn main() -> ExitCode {
    configure_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: TARGET_PIPELINE, "{}", err);
            error!(target: TARGET_PIPELINE, "Aborting...");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    info!(target: TARGET_PIPELINE, "Starting run for {} ({:?})", config.city, config.feed_source);

    ensure_data_dir(&config.database_path)?;
    let db = Database::new(&config.database_path).await?;
    let notifier = SlackNotifier::new(config.slack.clone())
        .map_err(|e| Error::Config(format!("{:#}", e)))?;

    let ctx = RunContext {
        db,
        notifier,
        config,
    };
    let result = run_once(&ctx).await;
    ctx.db.close().await;

    let summary = result?;
    match serde_json::to_string(&summary) {
        Ok(json) => debug!(target: TARGET_PIPELINE, "Run summary: {}", json),
        Err(e) => debug!(target: TARGET_PIPELINE, "Run summary not serializable: {}", e),
    }
    info!(
        target: TARGET_PIPELINE,
        "Run finished: {} fetched, {} new, {} delivered of {} pending, {} feeds failed",
        summary.fetched,
        summary.inserted,
        summary.delivered,
        summary.pending,
        summary.feed_failures.len()
    );
    Ok(())
}
