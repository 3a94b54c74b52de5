use tracing::info;

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    pub(crate) async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        sqlx::query(
            r#"
            -- seq records insertion order, used to break publish date ties
            CREATE TABLE IF NOT EXISTS postings (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                date INTEGER NOT NULL,
                company TEXT NOT NULL DEFAULT '',
                date_processed INTEGER NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                delivered BOOLEAN NOT NULL DEFAULT FALSE,
                delivered_date INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_postings_delivered_date ON postings (delivered, date);

            -- Free-form bucket for run bookkeeping
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        info!(target: TARGET_DB, "Schema initialized");
        Ok(())
    }
}
