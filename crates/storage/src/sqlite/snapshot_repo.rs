use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::{ExamId, SessionSnapshot};
use sqlx::Row;

use super::SqliteRepository;
use crate::codec::{decode_snapshot, encode_snapshot};
use crate::repository::{SessionStore, StorageError};

impl SqliteRepository {
    /// Store a raw payload without encoding it first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the write fails.
    pub async fn insert_raw_snapshot(
        &self,
        exam_id: &ExamId,
        payload: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_snapshots (exam_id, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(exam_id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            ",
        )
        .bind(exam_id.as_str())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn load_snapshot(
        &self,
        exam_id: &ExamId,
    ) -> Result<Option<SessionSnapshot>, StorageError> {
        let row = sqlx::query("SELECT payload FROM quiz_snapshots WHERE exam_id = ?1")
            .bind(exam_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        decode_snapshot(&payload).map(Some)
    }

    async fn save_snapshot(
        &self,
        exam_id: &ExamId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError> {
        let payload = encode_snapshot(snapshot)?;
        sqlx::query(
            r"
            INSERT INTO quiz_snapshots (exam_id, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(exam_id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            ",
        )
        .bind(exam_id.as_str())
        .bind(payload)
        .bind(snapshot.saved_at.unwrap_or_else(Utc::now))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_snapshot(&self, exam_id: &ExamId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_snapshots WHERE exam_id = ?1")
            .bind(exam_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
