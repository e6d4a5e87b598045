//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ExamError, ExamId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Why an exam could not be loaded. Every variant ends the load attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("Failed to fetch {exam_id}: {source}")]
    Transport {
        exam_id: ExamId,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to fetch {exam_id}. Status: {status}")]
    HttpStatus {
        exam_id: ExamId,
        status: reqwest::StatusCode,
    },
    #[error("Exam data could not be parsed: {0}")]
    Decode(String),
    #[error(transparent)]
    Exam(#[from] ExamError),
}

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("load for {exam_id} was superseded by a newer request")]
    Superseded { exam_id: ExamId },
    #[error("session for {exam_id} is still in progress")]
    InProgress { exam_id: ExamId },
}

/// Errors emitted by `ExamSelectionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SelectionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("invalid configuration: {0}")]
    Config(String),
}
