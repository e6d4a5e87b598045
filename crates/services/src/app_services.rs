use std::sync::Arc;

use quiz_core::model::ExamId;
use storage::repository::Storage;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::{AppServicesError, SelectionError, SessionError};
use crate::exam_loader::{ExamLoader, ExamSource, HttpExamSource};
use crate::selection_service::ExamSelectionService;
use crate::sessions::{PersistenceBridge, QuizSessionService};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    config: QuizConfig,
    loader: ExamLoader,
    persistence: PersistenceBridge,
    selection: Arc<ExamSelectionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP exam source.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the configuration is unusable or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: QuizConfig,
    ) -> Result<Self, AppServicesError> {
        validate(&config)?;
        let storage = Storage::sqlite(db_url).await?;
        let source: Arc<dyn ExamSource> = Arc::new(HttpExamSource::new(config.base_url.clone()));
        Self::from_parts(&storage, source, clock, config)
    }

    /// Build services from an existing storage bundle and exam source.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` if the configuration is unusable.
    pub fn from_parts(
        storage: &Storage,
        source: Arc<dyn ExamSource>,
        clock: Clock,
        config: QuizConfig,
    ) -> Result<Self, AppServicesError> {
        validate(&config)?;
        Ok(Self {
            loader: ExamLoader::new(source),
            persistence: PersistenceBridge::new(Arc::clone(&storage.sessions), clock),
            selection: Arc::new(ExamSelectionService::new(Arc::clone(&storage.selection))),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn loader(&self) -> &ExamLoader {
        &self.loader
    }

    #[must_use]
    pub fn selection(&self) -> Arc<ExamSelectionService> {
        Arc::clone(&self.selection)
    }

    /// Load `exam_id` into a new session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Superseded` if a newer load replaced this one.
    pub async fn start_session(&self, exam_id: ExamId) -> Result<QuizSessionService, SessionError> {
        QuizSessionService::start(&self.loader, self.persistence.clone(), exam_id, &self.config)
            .await
    }

    /// Leave `service` for the exam list: outstanding loads are dropped, the
    /// snapshot is discarded and the selection is forgotten.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` if the selection cannot be cleared.
    pub async fn abandon_session(
        &self,
        service: QuizSessionService,
    ) -> Result<ExamId, SelectionError> {
        self.loader.cancel();
        let exam_id = service.quit().await;
        self.selection.clear().await?;
        Ok(exam_id)
    }
}

fn validate(config: &QuizConfig) -> Result<(), AppServicesError> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(AppServicesError::Config(format!(
            "exam base url must be http(s): {}",
            config.base_url
        )));
    }
    if config.duration_secs == 0 {
        return Err(AppServicesError::Config(
            "exam duration must be at least one second".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam_loader::test_support::{FakeSource, THREE_QUESTIONS};
    use quiz_core::model::Phase;
    use quiz_core::time::fixed_clock;

    #[test]
    fn rejects_unusable_config() {
        let storage = Storage::in_memory();
        let source: Arc<dyn ExamSource> = Arc::new(FakeSource::default());

        let bad_url = QuizConfig::default().with_base_url("ftp://exams");
        assert!(matches!(
            AppServices::from_parts(&storage, Arc::clone(&source), fixed_clock(), bad_url),
            Err(AppServicesError::Config(_))
        ));

        let zero = QuizConfig {
            duration_secs: 0,
            ..QuizConfig::default()
        };
        assert!(matches!(
            AppServices::from_parts(&storage, source, fixed_clock(), zero),
            Err(AppServicesError::Config(_))
        ));
    }

    #[tokio::test]
    async fn start_session_uses_configured_duration() {
        let id = ExamId::numbered(6);
        let storage = Storage::in_memory();
        let source: Arc<dyn ExamSource> =
            Arc::new(FakeSource::default().with_body(&id, THREE_QUESTIONS));
        let config = QuizConfig {
            duration_secs: 90,
            ..QuizConfig::default()
        };
        let services = AppServices::from_parts(&storage, source, fixed_clock(), config).unwrap();

        let service = services.start_session(id).await.unwrap();
        assert_eq!(service.session().phase(), Phase::Answering);
        assert_eq!(service.session().remaining_seconds(), 90);
    }
}
