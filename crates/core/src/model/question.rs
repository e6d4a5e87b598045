use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{Choice, ExamId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question has no answer options")]
    NoOptions,

    #[error("question has {count} options, at most {max} are supported")]
    TooManyOptions { count: usize, max: usize },

    #[error("answer {raw:?} is not an option letter")]
    InvalidAnswer { raw: String },

    #[error("answer {answer} does not match any of the {options} options")]
    AnswerOutOfRange { answer: Choice, options: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("Exam data is empty or invalid.")]
    Empty,

    #[error("question {number} is invalid: {source}")]
    InvalidQuestion {
        number: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── WIRE RECORD ───────────────────────────────────────────────────────────────
//

/// Question as it appears in an exam JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionRecord {
    /// Validate the record into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, there are no options, or the
    /// answer is not the letter of one of the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if self.options.len() > Choice::MAX_OPTIONS {
            return Err(QuestionError::TooManyOptions {
                count: self.options.len(),
                max: Choice::MAX_OPTIONS,
            });
        }

        let answer: Choice = self
            .answer
            .parse()
            .map_err(|_| QuestionError::InvalidAnswer {
                raw: self.answer.clone(),
            })?;
        if answer.index() >= self.options.len() {
            return Err(QuestionError::AnswerOutOfRange {
                answer,
                options: self.options.len(),
            });
        }

        let explanation = self
            .explanation
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Ok(Question {
            text: self.question,
            options: self.options,
            answer,
            explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    answer: Choice,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Options paired with their positional letters.
    pub fn lettered_options(&self) -> impl Iterator<Item = (Choice, &str)> {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(index, text)| Some((Choice::from_index(index).ok()?, text.as_str())))
    }

    #[must_use]
    pub fn answer(&self) -> Choice {
        self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn has_option(&self, choice: Choice) -> bool {
        choice.index() < self.options.len()
    }

    #[must_use]
    pub fn is_correct(&self, choice: Choice) -> bool {
        self.answer == choice
    }
}

//
// ─── EXAM ──────────────────────────────────────────────────────────────────────
//

/// The ordered, non-empty question set of one exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    id: ExamId,
    questions: Vec<Question>,
}

impl Exam {
    /// # Errors
    ///
    /// Returns `ExamError::Empty` when no questions are given.
    pub fn new(id: ExamId, questions: Vec<Question>) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::Empty);
        }
        Ok(Self { id, questions })
    }

    /// Validate every record, reporting the first invalid question (1-based).
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Empty` for an empty list and
    /// `ExamError::InvalidQuestion` for the first record that fails validation.
    pub fn from_records(id: ExamId, records: Vec<QuestionRecord>) -> Result<Self, ExamError> {
        let questions = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .validate()
                    .map_err(|source| ExamError::InvalidQuestion {
                        number: index + 1,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(id, questions)
    }

    #[must_use]
    pub fn id(&self) -> &ExamId {
        &self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed exam; kept for slice-like ergonomics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(answer: &str) -> QuestionRecord {
        QuestionRecord {
            question: "Which service stores objects?".into(),
            options: vec!["EC2".into(), "S3".into(), "RDS".into()],
            answer: answer.into(),
            explanation: Some("  S3 is object storage. ".into()),
        }
    }

    #[test]
    fn validate_accepts_letter_answer() {
        let question = record("B").validate().unwrap();
        assert_eq!(question.answer().letter(), 'B');
        assert_eq!(question.explanation(), Some("S3 is object storage."));
        let letters: Vec<char> = question.lettered_options().map(|(c, _)| c.letter()).collect();
        assert_eq!(letters, vec!['A', 'B', 'C']);
    }

    #[test]
    fn validate_rejects_answer_outside_options() {
        let err = record("D").validate().unwrap_err();
        assert!(matches!(err, QuestionError::AnswerOutOfRange { options: 3, .. }));
        let err = record("S3").validate().unwrap_err();
        assert!(matches!(err, QuestionError::InvalidAnswer { .. }));
    }

    #[test]
    fn validate_rejects_missing_options() {
        let mut rec = record("A");
        rec.options.clear();
        assert_eq!(rec.validate().unwrap_err(), QuestionError::NoOptions);
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let mut rec = record("A");
        rec.explanation = Some("   ".into());
        assert_eq!(rec.validate().unwrap().explanation(), None);
    }

    #[test]
    fn exam_requires_questions() {
        let err = Exam::from_records(ExamId::numbered(1), Vec::new()).unwrap_err();
        assert_eq!(err, ExamError::Empty);
    }

    #[test]
    fn exam_reports_first_invalid_question() {
        let err = Exam::from_records(ExamId::numbered(1), vec![record("A"), record("Z")])
            .unwrap_err();
        assert!(matches!(err, ExamError::InvalidQuestion { number: 2, .. }));
    }

    #[test]
    fn record_parses_without_explanation() {
        let json = r#"{"question":"Q","options":["x","y"],"answer":"A"}"#;
        let rec: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.explanation, None);
    }
}
