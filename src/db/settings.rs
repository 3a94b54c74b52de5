use tracing::instrument;

use super::core::Database;

pub const LAST_RUN_AT: &str = "last_run_at";
pub const LAST_THREAD_TS: &str = "last_thread_ts";

impl Database {
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.pool())
            .await
    }

    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settings_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("db.sqlite")).await.unwrap();

        assert_eq!(db.get_setting(LAST_RUN_AT).await.unwrap(), None);
        db.set_setting(LAST_RUN_AT, "100").await.unwrap();
        db.set_setting(LAST_RUN_AT, "200").await.unwrap();
        assert_eq!(db.get_setting(LAST_RUN_AT).await.unwrap().as_deref(), Some("200"));
    }
}
