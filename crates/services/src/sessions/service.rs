use std::sync::Arc;

use tracing::{debug, info};

use quiz_core::model::{ExamId, Phase, QuizSession};
use quiz_core::reducer::{Action, reduce};

use super::persistence::PersistenceBridge;
use crate::config::QuizConfig;
use crate::error::SessionError;
use crate::exam_loader::{ExamLoader, LoadOutcome};

/// Owns the one live [`QuizSession`] and keeps its snapshot in sync.
pub struct QuizSessionService {
    session: QuizSession,
    persistence: PersistenceBridge,
    config: QuizConfig,
}

impl QuizSessionService {
    /// Load `exam_id` and build the session, resuming a stored snapshot when
    /// one fits the exam. A failed load yields a session in [`Phase::Error`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Superseded` if another load began while this one
    /// was in flight.
    pub async fn start(
        loader: &ExamLoader,
        persistence: PersistenceBridge,
        exam_id: ExamId,
        config: &QuizConfig,
    ) -> Result<Self, SessionError> {
        let ticket = loader.begin(exam_id.clone());
        debug!(%exam_id, "starting quiz session");

        let action = match loader.load(&ticket).await {
            LoadOutcome::Loaded(exam) => {
                let snapshot = persistence.restore(&exam).await;
                if !loader.is_current(&ticket) {
                    return Err(SessionError::Superseded { exam_id });
                }
                Action::Loaded {
                    exam: Arc::new(exam),
                    snapshot,
                }
            }
            LoadOutcome::Failed(err) => Action::LoadFailed {
                message: err.to_string(),
            },
            LoadOutcome::Stale => return Err(SessionError::Superseded { exam_id }),
        };

        let mut service = Self {
            session: QuizSession::new(exam_id, config.duration_secs),
            persistence,
            config: config.clone(),
        };
        service.dispatch(action).await;
        Ok(service)
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> QuizSession {
        self.session
    }

    /// Apply `action` and mirror the result into storage.
    ///
    /// Active sessions are saved after every change; finishing removes the
    /// snapshot.
    pub async fn dispatch(&mut self, action: Action) -> &QuizSession {
        let next = reduce(self.session.clone(), action);
        if next == self.session {
            return &self.session;
        }

        let finished_now =
            next.phase() == Phase::Finished && self.session.phase() != Phase::Finished;
        self.session = next;

        if finished_now {
            info!(
                exam_id = %self.session.exam_id(),
                score = self.session.score(),
                total = self.session.question_count(),
                "quiz finished"
            );
            self.persistence.discard(self.session.exam_id()).await;
        } else if self.session.phase().is_active() {
            self.persistence.persist(&self.session).await;
        }
        &self.session
    }

    /// Abandon the session and its stored snapshot. Valid from any phase,
    /// including a failed load.
    pub async fn quit(self) -> ExamId {
        let exam_id = self.session.exam_id().clone();
        info!(%exam_id, phase = %self.session.phase(), "quiz abandoned");
        self.persistence.discard(&exam_id).await;
        exam_id
    }

    /// Load the same exam again with a new ticket. From [`Phase::Finished`]
    /// this starts a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InProgress` while the session is still in progress,
    /// or `SessionError::Superseded` as for [`QuizSessionService::start`].
    pub async fn retry(self, loader: &ExamLoader) -> Result<Self, SessionError> {
        let exam_id = self.session.exam_id().clone();
        if self.session.phase().is_active() || self.session.phase() == Phase::Loading {
            return Err(SessionError::InProgress { exam_id });
        }
        Self::start(loader, self.persistence, exam_id, &self.config).await
    }
}
