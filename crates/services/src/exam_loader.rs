use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use quiz_core::model::{Exam, ExamError, ExamId, QuestionRecord};

use crate::error::LoadError;

/// Fetches the raw exam document for an identifier.
#[async_trait]
pub trait ExamSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `LoadError::Transport` or `LoadError::HttpStatus` when the
    /// document cannot be retrieved.
    async fn fetch(&self, exam_id: &ExamId) -> Result<Vec<u8>, LoadError>;
}

/// `GET {base_url}/{exam_id}`, no auth, no query string.
#[derive(Clone)]
pub struct HttpExamSource {
    client: Client,
    base_url: String,
}

impl HttpExamSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn url_for(&self, exam_id: &ExamId) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), exam_id)
    }
}

#[async_trait]
impl ExamSource for HttpExamSource {
    async fn fetch(&self, exam_id: &ExamId) -> Result<Vec<u8>, LoadError> {
        let url = self.url_for(exam_id);
        debug!(%url, "fetching exam");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                exam_id: exam_id.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus {
                exam_id: exam_id.clone(),
                status: response.status(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| LoadError::Transport {
                exam_id: exam_id.clone(),
                source,
            })?;
        Ok(body.to_vec())
    }
}

/// Parse an exam document: a non-empty JSON array of question records.
///
/// # Errors
///
/// Returns `LoadError::Decode` if the body is not a JSON array of question-shaped
/// objects, and `LoadError::Exam` if it is empty or a question fails validation.
pub fn decode_exam(exam_id: ExamId, body: &[u8]) -> Result<Exam, LoadError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|err| LoadError::Decode(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(LoadError::Decode("expected a JSON array of questions".into()));
    };
    if items.is_empty() {
        return Err(ExamError::Empty.into());
    }
    let records: Vec<QuestionRecord> = serde_json::from_value(Value::Array(items))
        .map_err(|err| LoadError::Decode(err.to_string()))?;
    Ok(Exam::from_records(exam_id, records)?)
}

//
// ─── LOADER ────────────────────────────────────────────────────────────────────
//

/// Identifies one load request. Only the most recently issued ticket may apply
/// its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    exam_id: ExamId,
    seq: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn exam_id(&self) -> &ExamId {
        &self.exam_id
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Exam),
    Failed(LoadError),
    /// A newer request was issued (or interest was cancelled) while this one was in flight.
    Stale,
}

/// Exam Data Loader: one fetch per request, with stale completions discarded.
#[derive(Clone)]
pub struct ExamLoader {
    source: Arc<dyn ExamSource>,
    latest: Arc<AtomicU64>,
}

impl ExamLoader {
    #[must_use]
    pub fn new(source: Arc<dyn ExamSource>) -> Self {
        Self {
            source,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Issue a ticket for `exam_id`, invalidating every earlier ticket.
    #[must_use]
    pub fn begin(&self, exam_id: ExamId) -> LoadTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { exam_id, seq }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    /// Drop interest in any outstanding request (e.g. the user quit while loading).
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Fetch and decode the exam for `ticket`.
    pub async fn load(&self, ticket: &LoadTicket) -> LoadOutcome {
        let result = match self.source.fetch(&ticket.exam_id).await {
            Ok(body) => decode_exam(ticket.exam_id.clone(), &body),
            Err(err) => Err(err),
        };

        if !self.is_current(ticket) {
            debug!(exam_id = %ticket.exam_id, "discarding stale exam response");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(exam) => {
                info!(exam_id = %ticket.exam_id, questions = exam.len(), "exam loaded");
                LoadOutcome::Loaded(exam)
            }
            Err(err) => {
                warn!(exam_id = %ticket.exam_id, error = %err, "exam load failed");
                LoadOutcome::Failed(err)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FakeSource, THREE_QUESTIONS};
    use super::*;

    #[test]
    fn url_joins_base_and_identifier() {
        let source = HttpExamSource::new("https://example.com/data/");
        assert_eq!(
            source.url_for(&ExamId::numbered(7)),
            "https://example.com/data/exam-7.json"
        );
        let source = HttpExamSource::new("https://example.com/data");
        assert_eq!(
            source.url_for(&ExamId::numbered(7)),
            "https://example.com/data/exam-7.json"
        );
    }

    #[test]
    fn decode_accepts_question_array() {
        let exam = decode_exam(ExamId::numbered(1), THREE_QUESTIONS.as_bytes()).unwrap();
        assert_eq!(exam.len(), 3);
        assert_eq!(exam.questions()[0].explanation(), Some("first"));
    }

    #[test]
    fn decode_distinguishes_failure_kinds() {
        let id = ExamId::numbered(1);
        assert!(matches!(
            decode_exam(id.clone(), b"<html>"),
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(
            decode_exam(id.clone(), br#"{"questions": []}"#),
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(
            decode_exam(id.clone(), br#"[{"title": "no options"}]"#),
            Err(LoadError::Decode(_))
        ));

        let empty = decode_exam(id, b"[]").unwrap_err();
        assert!(matches!(empty, LoadError::Exam(ExamError::Empty)));
        assert!(!empty.to_string().is_empty());
    }

    #[tokio::test]
    async fn load_reports_http_status() {
        let id = ExamId::numbered(4);
        let loader = ExamLoader::new(Arc::new(FakeSource::default().with_status(&id, 500)));
        let ticket = loader.begin(id);
        match loader.load(&ticket).await {
            LoadOutcome::Failed(err) => {
                assert_eq!(
                    err.to_string(),
                    "Failed to fetch exam-4.json. Status: 500 Internal Server Error"
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn newer_ticket_makes_older_response_stale() {
        let old = ExamId::numbered(1);
        let new = ExamId::numbered(2);
        let source = Arc::new(
            FakeSource::default()
                .with_body(&old, THREE_QUESTIONS)
                .with_body(&new, THREE_QUESTIONS),
        );
        let gate = source.gate(&old);
        let loader = ExamLoader::new(source.clone());

        let old_ticket = loader.begin(old);
        let pending = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(&old_ticket).await })
        };

        let new_ticket = loader.begin(new);
        let fresh = loader.load(&new_ticket).await;
        assert!(
            matches!(fresh, LoadOutcome::Loaded(ref exam) if exam.id() == &ExamId::numbered(2))
        );

        gate.notify_one();
        let stale = pending.await.unwrap();
        assert!(matches!(stale, LoadOutcome::Stale));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancel_discards_in_flight_result() {
        let id = ExamId::numbered(3);
        let source = FakeSource::default().with_body(&id, THREE_QUESTIONS);
        let loader = ExamLoader::new(Arc::new(source));
        let ticket = loader.begin(id);
        loader.cancel();
        assert!(!loader.is_current(&ticket));
        assert!(matches!(loader.load(&ticket).await, LoadOutcome::Stale));
    }
}
