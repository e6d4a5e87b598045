use std::sync::Arc;

use tracing::{debug, warn};

use quiz_core::model::ExamId;
use storage::repository::{SelectionStore, StorageError};

use crate::error::SelectionError;

/// Remembers which exam is in progress so a relaunch can go straight back to it.
#[derive(Clone)]
pub struct ExamSelectionService {
    store: Arc<dyn SelectionStore>,
}

impl ExamSelectionService {
    #[must_use]
    pub fn new(store: Arc<dyn SelectionStore>) -> Self {
        Self { store }
    }

    /// The exam to reopen on launch; `None` means show the selection screen.
    ///
    /// An entry that no longer parses is cleared and treated as no selection.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` on storage failures.
    pub async fn resume_target(&self) -> Result<Option<ExamId>, SelectionError> {
        let selected = match self.store.selected_exam().await {
            Ok(selected) => selected,
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "discarding unreadable exam selection");
                self.store.set_selected_exam(None).await?;
                None
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(exam_id) = &selected {
            debug!(%exam_id, "resuming selected exam");
        }
        Ok(selected)
    }

    /// # Errors
    ///
    /// Returns `SelectionError` on storage failures.
    pub async fn select(&self, exam_id: &ExamId) -> Result<(), SelectionError> {
        self.store.set_selected_exam(Some(exam_id)).await?;
        Ok(())
    }

    /// Forget the selection after a quit or a finished exam.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` on storage failures.
    pub async fn clear(&self) -> Result<(), SelectionError> {
        self.store.set_selected_exam(None).await?;
        Ok(())
    }
}
