use async_trait::async_trait;
use quiz_core::model::{ExamId, SessionSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::codec::{decode_snapshot, encode_snapshot};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keyed store of in-progress session snapshots, one entry per exam.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the snapshot stored for `exam_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if an entry exists but cannot be
    /// decoded, or other storage errors.
    async fn load_snapshot(
        &self,
        exam_id: &ExamId,
    ) -> Result<Option<SessionSnapshot>, StorageError>;

    /// Persist or replace the snapshot for `exam_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(
        &self,
        exam_id: &ExamId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError>;

    /// Remove the snapshot for `exam_id`. Missing entries are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_snapshot(&self, exam_id: &ExamId) -> Result<(), StorageError>;
}

/// The scalar "selected exam" entry. Presence means "resume this exam on launch".
#[async_trait]
pub trait SelectionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on read failures or an unparseable identifier.
    async fn selected_exam(&self) -> Result<Option<ExamId>, StorageError>;

    /// Store `exam_id`, or clear the entry with `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set_selected_exam(&self, exam_id: Option<&ExamId>) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Snapshots are kept as encoded payloads so decode failures behave the same
/// way they do against `SQLite`.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<ExamId, String>>>,
    selected: Arc<Mutex<Option<ExamId>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw payload as-is, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw_snapshot(
        &self,
        exam_id: &ExamId,
        payload: impl Into<String>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(exam_id.clone(), payload.into());
        Ok(())
    }

    /// Whether any entry, valid or not, exists for `exam_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn has_snapshot(&self, exam_id: &ExamId) -> Result<bool, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains_key(exam_id))
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn load_snapshot(
        &self,
        exam_id: &ExamId,
    ) -> Result<Option<SessionSnapshot>, StorageError> {
        let payload = {
            let guard = self
                .snapshots
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(exam_id).cloned()
        };
        payload.as_deref().map(decode_snapshot).transpose()
    }

    async fn save_snapshot(
        &self,
        exam_id: &ExamId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), StorageError> {
        let payload = encode_snapshot(snapshot)?;
        self.insert_raw_snapshot(exam_id, payload)
    }

    async fn clear_snapshot(&self, exam_id: &ExamId) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(exam_id);
        Ok(())
    }
}

#[async_trait]
impl SelectionStore for InMemoryRepository {
    async fn selected_exam(&self) -> Result<Option<ExamId>, StorageError> {
        let guard = self
            .selected
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn set_selected_exam(&self, exam_id: Option<&ExamId>) -> Result<(), StorageError> {
        let mut guard = self
            .selected
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = exam_id.cloned();
        Ok(())
    }
}

/// Aggregates the store traits behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
    pub selection: Arc<dyn SelectionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionStore> = Arc::new(repo.clone());
        let selection: Arc<dyn SelectionStore> = Arc::new(repo);
        Self {
            sessions,
            selection,
        }
    }
}
