use async_trait::async_trait;
use quiz_core::model::ExamId;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{SelectionStore, StorageError};

#[async_trait]
impl SelectionStore for SqliteRepository {
    async fn selected_exam(&self) -> Result<Option<ExamId>, StorageError> {
        let row = sqlx::query("SELECT selected_exam FROM app_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: Option<String> = row
            .try_get("selected_exam")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        raw.map(ExamId::new)
            .transpose()
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn set_selected_exam(&self, exam_id: Option<&ExamId>) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_state (id, selected_exam)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                selected_exam = excluded.selected_exam
            ",
        )
        .bind(1_i64)
        .bind(exam_id.map(ExamId::as_str))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
