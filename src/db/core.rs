use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Pool, Sqlite,
};
use std::path::Path;
use tokio::time::Duration;
use tracing::{info, instrument};

use crate::TARGET_DB;

/// Handle to the posting store. One per process, passed around explicitly.
#[derive(Clone, Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Get access to the database pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Open (creating if missing) the store at `database_path` and make sure the schema
    /// exists. The parent directory must already exist.
    #[instrument(target = "db", level = "info")]
    pub async fn new(database_path: &Path) -> Result<Self, sqlx::Error> {
        info!(target: TARGET_DB, "Opening store at: {}", database_path.display());

        // Every write is fully synced before returning: a run may die right after a
        // write and the next run must still see it.
        let connect_options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .synchronous(SqliteSynchronous::Full);

        // Single writer, single run.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        info!(target: TARGET_DB, "Database pool created");

        let db = Database { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
