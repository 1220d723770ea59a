//! Durable append-only log of every diagnosis ever produced.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use tracing::info;

use crate::diagnosis::record::DiagnosisRecord;

/// Database file name inside the output directory.
pub const DB_NAME: &str = "immortal_memory.db";

/// SQLite-backed log. One `history` table, three TEXT columns, no keys and no
/// indexes; rows are only ever inserted. Timestamps are stored as RFC 3339
/// text, so the column sorts the way it reads.
pub struct DiagnosisLog {
    pool: SqlitePool,
}

impl DiagnosisLog {
    /// Open the log at `db_path`, creating the file and the schema if either
    /// is missing. The parent directory must already exist.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await.with_context(|| {
            format!("Failed to open diagnosis log at '{}'", db_path.display())
        })?;

        let log = Self { pool };
        log.initialize().await?;
        info!("Opened diagnosis log at {}", db_path.display());
        Ok(log)
    }

    /// Ensure the `history` table exists. Runs on every start and is a no-op
    /// when the table is already there; existing rows are never touched.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                timestamp TEXT,
                input TEXT,
                result TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to ensure history table")?;
        Ok(())
    }

    /// Append one record. Inserts only; no uniqueness or ordering constraint
    /// is enforced by the schema.
    pub async fn append(&self, record: &DiagnosisRecord) -> Result<()> {
        sqlx::query("INSERT INTO history (timestamp, input, result) VALUES (?, ?, ?)")
            .bind(record.timestamp.to_rfc3339())
            .bind(&record.input)
            .bind(record.result())
            .execute(&self.pool)
            .await
            .context("Failed to append diagnosis record")?;
        Ok(())
    }

    /// Total rows in the log.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM history")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count diagnosis records")?;
        Ok(count)
    }

    /// The newest rows as raw (timestamp, input, result) triples, newest
    /// first. Inspection surface only; the dashboard renders history from
    /// session state, never from here.
    pub async fn recent(&self, limit: i64) -> Result<Vec<(String, String, String)>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT timestamp, input, result FROM history ORDER BY rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to read recent diagnosis records")?;
        Ok(rows)
    }

    /// Liveness probe for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::record::Diagnosis;
    use tempfile::TempDir;

    async fn open_in(dir: &TempDir) -> DiagnosisLog {
        DiagnosisLog::open(&dir.path().join(DB_NAME)).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_file_and_schema() {
        let dir = TempDir::new().unwrap();
        let log = open_in(&dir).await;

        assert!(dir.path().join(DB_NAME).exists());
        assert_eq!(log.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_and_preserves_rows() {
        let dir = TempDir::new().unwrap();
        let log = open_in(&dir).await;

        log.append(&DiagnosisRecord::new("first", Diagnosis::suggestion()))
            .await
            .unwrap();
        log.initialize().await.unwrap();
        log.initialize().await.unwrap();

        assert_eq!(log.count().await.unwrap(), 1);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'history'",
        )
        .fetch_all(&log.pool)
        .await
        .unwrap();
        assert_eq!(tables, ["history"]);
    }

    #[tokio::test]
    async fn test_reopen_sees_earlier_rows() {
        let dir = TempDir::new().unwrap();
        {
            let log = open_in(&dir).await;
            log.append(&DiagnosisRecord::new("before restart", Diagnosis::suggestion()))
                .await
                .unwrap();
        }

        let log = open_in(&dir).await;
        assert_eq!(log.count().await.unwrap(), 1);
        let rows = log.recent(10).await.unwrap();
        assert_eq!(rows[0].1, "before restart");
    }

    #[tokio::test]
    async fn test_append_stores_rfc3339_timestamp_and_result_text() {
        let dir = TempDir::new().unwrap();
        let log = open_in(&dir).await;

        let record = DiagnosisRecord::new(
            "NullPointerException in module X",
            Diagnosis::AttachmentError("Error reading file: line 2 is not valid JSON".to_string()),
        );
        log.append(&record).await.unwrap();

        let rows = log.recent(1).await.unwrap();
        let (timestamp, input, result) = &rows[0];
        assert_eq!(input, "NullPointerException in module X");
        assert_eq!(result, record.result());
        let parsed = chrono::DateTime::parse_from_rfc3339(timestamp).unwrap();
        assert_eq!(parsed.with_timezone(&chrono::Utc), record.timestamp);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first() {
        let dir = TempDir::new().unwrap();
        let log = open_in(&dir).await;

        for input in ["one", "two", "three"] {
            log.append(&DiagnosisRecord::new(input, Diagnosis::suggestion()))
                .await
                .unwrap();
        }

        let rows = log.recent(2).await.unwrap();
        let inputs: Vec<&str> = rows.iter().map(|(_, input, _)| input.as_str()).collect();
        assert_eq!(inputs, ["three", "two"]);
    }

    #[tokio::test]
    async fn test_open_fails_when_parent_directory_is_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no_such_dir").join(DB_NAME);
        assert!(DiagnosisLog::open(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_ping_succeeds_on_open_log() {
        let dir = TempDir::new().unwrap();
        let log = open_in(&dir).await;
        log.ping().await.unwrap();
    }
}
