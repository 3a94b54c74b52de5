use std::collections::HashSet;
use tracing::{debug, error, instrument, warn};

use super::core::Database;
use crate::posting::Posting;
use crate::TARGET_DB;

const POSTING_COLUMNS: &str =
    "id, title, date, company, date_processed, description, url, delivered, delivered_date";

impl Database {
    /// Every identity the store has ever seen.
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn posting_ids(&self) -> Result<HashSet<String>, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM postings")
            .fetch_all(self.pool())
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Append a new posting. The store never updates an existing identity through this
    /// path, so a duplicate id is reported as an error rather than ignored.
    #[instrument(target = "db", level = "info", skip(self, posting), fields(id = %posting.id))]
    pub async fn insert_posting(&self, posting: &Posting) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO postings (
                id, title, date, company, date_processed,
                description, url, delivered, delivered_date
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&posting.id)
        .bind(&posting.title)
        .bind(posting.date)
        .bind(&posting.company)
        .bind(posting.date_processed)
        .bind(&posting.description)
        .bind(&posting.url)
        .bind(posting.delivered)
        .bind(posting.delivered_date)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => {
                debug!(target: TARGET_DB, "Stored posting {}: {}", posting.id, posting.title);
                Ok(())
            }
            Err(e) => {
                error!(target: TARGET_DB, "Failed to store posting {}: {:?}", posting.id, e);
                Err(e)
            }
        }
    }

    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn find_posting(&self, id: &str) -> Result<Option<Posting>, sqlx::Error> {
        sqlx::query_as::<_, Posting>(&format!(
            "SELECT {} FROM postings WHERE id = ?1",
            POSTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    /// Undelivered postings, most recently published first. Equal dates keep insertion
    /// order.
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn pending_postings(&self) -> Result<Vec<Posting>, sqlx::Error> {
        sqlx::query_as::<_, Posting>(&format!(
            "SELECT {} FROM postings WHERE delivered = 0 ORDER BY date DESC, seq ASC",
            POSTING_COLUMNS
        ))
        .fetch_all(self.pool())
        .await
    }

    /// Flip a posting to delivered. Only the first call for an id has any effect;
    /// returns whether this call was it.
    #[instrument(target = "db", level = "info", skip(self))]
    pub async fn mark_delivered(&self, id: &str, delivered_at: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE postings
            SET delivered = 1, delivered_date = ?2
            WHERE id = ?1 AND delivered = 0
            "#,
        )
        .bind(id)
        .bind(delivered_at)
        .execute(self.pool())
        .await?;

        let updated = result.rows_affected() == 1;
        if !updated {
            warn!(target: TARGET_DB, "Posting {} was missing or already delivered", id);
        }
        Ok(updated)
    }

    /// Postings in insertion order, newest insert first, optionally filtered by state.
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn list_postings(
        &self,
        delivered: Option<bool>,
        limit: i64,
    ) -> Result<Vec<Posting>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM postings WHERE (?1 IS NULL OR delivered = ?1) ORDER BY seq DESC LIMIT ?2",
            POSTING_COLUMNS
        );
        sqlx::query_as::<_, Posting>(&query)
            .bind(delivered)
            .bind(limit)
            .fetch_all(self.pool())
            .await
    }

    /// (total, pending) posting counts.
    pub async fn posting_counts(&self) -> Result<(i64, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM postings")
            .fetch_one(self.pool())
            .await?;
        let pending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM postings WHERE delivered = 0")
            .fetch_one(self.pool())
            .await?;
        Ok((total, pending))
    }
}
