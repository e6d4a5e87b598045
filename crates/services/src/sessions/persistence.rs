use std::sync::Arc;

use tracing::{debug, warn};

use quiz_core::Clock;
use quiz_core::model::{Exam, ExamId, QuizSession, SessionSnapshot};
use storage::repository::{SessionStore, StorageError};

/// Mirrors the live session into the snapshot store.
///
/// Writes are best-effort: failures are logged and never reach the reducer.
#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn SessionStore>,
    clock: Clock,
}

impl PersistenceBridge {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Fetch a snapshot usable with `exam`.
    ///
    /// Corrupt or mismatched snapshots are removed and treated as absent.
    pub async fn restore(&self, exam: &Exam) -> Option<SessionSnapshot> {
        let exam_id = exam.id();
        let snapshot = match self.store.load_snapshot(exam_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return None,
            Err(StorageError::Serialization(reason)) => {
                warn!(%exam_id, %reason, "discarding unreadable snapshot");
                self.discard(exam_id).await;
                return None;
            }
            Err(err) => {
                warn!(%exam_id, error = %err, "snapshot lookup failed; starting fresh");
                return None;
            }
        };

        if let Err(err) = snapshot.validate_for(exam) {
            warn!(%exam_id, error = %err, "discarding snapshot that does not fit exam");
            self.discard(exam_id).await;
            return None;
        }

        debug!(%exam_id, index = snapshot.current_index, "restoring snapshot");
        Some(snapshot)
    }

    /// Write the session's snapshot. Inactive sessions are not written.
    pub async fn persist(&self, session: &QuizSession) {
        let Some(snapshot) = session.snapshot(self.clock.now()) else {
            return;
        };
        if let Err(err) = self.store.save_snapshot(session.exam_id(), &snapshot).await {
            warn!(exam_id = %session.exam_id(), error = %err, "failed to save snapshot");
        }
    }

    pub async fn discard(&self, exam_id: &ExamId) {
        if let Err(err) = self.store.clear_snapshot(exam_id).await {
            warn!(%exam_id, error = %err, "failed to clear snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, QuestionRecord, QuestionStatus};
    use quiz_core::reducer::{Action, reduce};
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn exam(id: u32, count: usize) -> Exam {
        let records = (0..count)
            .map(|n| QuestionRecord {
                question: format!("Q{n}"),
                options: vec!["a".into(), "b".into(), "c".into()],
                answer: "A".into(),
                explanation: None,
            })
            .collect();
        Exam::from_records(ExamId::numbered(id), records).unwrap()
    }

    fn active_session(exam: &Exam) -> QuizSession {
        let session = QuizSession::new(exam.id().clone(), 120);
        let session = reduce(
            session,
            Action::Loaded {
                exam: Arc::new(exam.clone()),
                snapshot: None,
            },
        );
        reduce(session, Action::Select(Choice::from_letter('A').unwrap()))
    }

    #[tokio::test]
    async fn persist_then_restore() {
        let repo = InMemoryRepository::new();
        let bridge = PersistenceBridge::new(Arc::new(repo.clone()), fixed_clock());
        let exam = exam(1, 3);

        bridge.persist(&active_session(&exam)).await;
        let restored = bridge.restore(&exam).await.unwrap();
        assert_eq!(restored.current_index, 0);
        assert_eq!(restored.selected, Choice::from_letter('A').ok());
        assert_eq!(restored.saved_at, Some(fixed_clock().now()));
    }

    #[tokio::test]
    async fn inactive_session_is_not_written() {
        let repo = InMemoryRepository::new();
        let bridge = PersistenceBridge::new(Arc::new(repo.clone()), fixed_clock());
        let session = QuizSession::new(ExamId::numbered(2), 120);

        bridge.persist(&session).await;
        assert!(!repo.has_snapshot(&ExamId::numbered(2)).unwrap());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_removed() {
        let repo = InMemoryRepository::new();
        let exam = exam(3, 2);
        repo.insert_raw_snapshot(exam.id(), "{\"questionStatus\": 12").unwrap();
        let bridge = PersistenceBridge::new(Arc::new(repo.clone()), fixed_clock());

        assert!(bridge.restore(&exam).await.is_none());
        assert!(!repo.has_snapshot(exam.id()).unwrap());
    }

    #[tokio::test]
    async fn mismatched_ledger_is_removed() {
        let repo = InMemoryRepository::new();
        let exam = exam(4, 2);
        let snapshot = SessionSnapshot {
            current_index: 0,
            selected: None,
            mark_question: false,
            question_status: vec![QuestionStatus::default(); 5],
            score: 0,
            remaining_seconds: 30,
            saved_at: None,
        };
        repo.save_snapshot(exam.id(), &snapshot).await.unwrap();
        let bridge = PersistenceBridge::new(Arc::new(repo.clone()), fixed_clock());

        assert!(bridge.restore(&exam).await.is_none());
        assert!(!repo.has_snapshot(exam.id()).unwrap());
    }
}
