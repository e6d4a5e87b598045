use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::countdown::{Countdown, DEFAULT_EXAM_SECONDS};
use crate::model::ids::Choice;
use crate::model::question::Exam;
use crate::model::status::{QuestionStatus, blank_choice};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("ledger has {found} entries but the exam has {expected} questions")]
    LedgerLength { expected: usize, found: usize },

    #[error("current index {index} is outside 0..{count}")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("score {score} exceeds question count {count}")]
    ScoreOutOfRange { score: u32, count: usize },

    #[error("question {number} stores a selection that is not one of its options")]
    SelectionOutOfRange { number: usize },
}

/// Persisted form of an in-progress session, keyed by exam identifier.
///
/// Field aliases accept the camelCase layout written by the browser build of
/// the app, so older stores resume instead of being discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default, alias = "current")]
    pub current_index: usize,
    #[serde(default, with = "blank_choice")]
    pub selected: Option<Choice>,
    #[serde(default, alias = "markQuestion")]
    pub mark_question: bool,
    #[serde(alias = "questionStatus")]
    pub question_status: Vec<QuestionStatus>,
    #[serde(default)]
    pub score: u32,
    #[serde(
        default = "default_remaining",
        alias = "time",
        deserialize_with = "remaining_seconds"
    )]
    pub remaining_seconds: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// Check that the snapshot can be applied to `exam`.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` when the ledger length differs from the question
    /// count, the index or score is out of range, or a stored selection names an
    /// option the question does not have.
    pub fn validate_for(&self, exam: &Exam) -> Result<(), SnapshotError> {
        let count = exam.len();
        if self.question_status.len() != count {
            return Err(SnapshotError::LedgerLength {
                expected: count,
                found: self.question_status.len(),
            });
        }
        if self.current_index >= count {
            return Err(SnapshotError::IndexOutOfRange {
                index: self.current_index,
                count,
            });
        }
        if usize::try_from(self.score).map_or(true, |score| score > count) {
            return Err(SnapshotError::ScoreOutOfRange {
                score: self.score,
                count,
            });
        }
        for (index, (status, question)) in
            self.question_status.iter().zip(exam.questions()).enumerate()
        {
            if status.selected.is_some_and(|choice| !question.has_option(choice)) {
                return Err(SnapshotError::SelectionOutOfRange { number: index + 1 });
            }
        }
        Ok(())
    }
}

fn default_remaining() -> u32 {
    DEFAULT_EXAM_SECONDS
}

fn remaining_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Remaining {
        Seconds(u32),
        Clock(String),
    }

    match Remaining::deserialize(deserializer)? {
        Remaining::Seconds(seconds) => Ok(seconds),
        Remaining::Clock(clock) => Countdown::parse_clock(&clock).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid remaining time {clock:?}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::ExamId;
    use crate::model::question::QuestionRecord;

    fn exam(count: usize) -> Exam {
        let records = (0..count)
            .map(|i| QuestionRecord {
                question: format!("Q{i}"),
                options: vec!["a".into(), "b".into()],
                answer: "A".into(),
                explanation: None,
            })
            .collect();
        Exam::from_records(ExamId::numbered(1), records).unwrap()
    }

    fn snapshot(ledger: usize) -> SessionSnapshot {
        SessionSnapshot {
            current_index: 0,
            selected: None,
            mark_question: false,
            question_status: vec![QuestionStatus::default(); ledger],
            score: 0,
            remaining_seconds: 100,
            saved_at: None,
        }
    }

    #[test]
    fn validate_accepts_matching_ledger() {
        assert_eq!(snapshot(3).validate_for(&exam(3)), Ok(()));
    }

    #[test]
    fn validate_rejects_length_mismatch() {
        assert_eq!(
            snapshot(2).validate_for(&exam(3)),
            Err(SnapshotError::LedgerLength {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn validate_rejects_out_of_range_index_and_score() {
        let mut snap = snapshot(2);
        snap.current_index = 2;
        assert!(matches!(
            snap.validate_for(&exam(2)),
            Err(SnapshotError::IndexOutOfRange { .. })
        ));

        let mut snap = snapshot(2);
        snap.score = 3;
        assert!(matches!(
            snap.validate_for(&exam(2)),
            Err(SnapshotError::ScoreOutOfRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_option_selection() {
        let mut snap = snapshot(2);
        snap.question_status[1].selected = Some(Choice::from_letter('D').unwrap());
        assert_eq!(
            snap.validate_for(&exam(2)),
            Err(SnapshotError::SelectionOutOfRange { number: 2 })
        );
    }

    #[test]
    fn parses_browser_layout_with_clock_string() {
        let json = r#"{
            "current": 1,
            "selected": "B",
            "markQuestion": true,
            "questionStatus": [
                {"answered": true, "marked": false, "selected": "A"},
                {"answered": false, "marked": true, "selected": "B"}
            ],
            "score": 1,
            "time": "42:30"
        }"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.current_index, 1);
        assert!(snap.mark_question);
        assert_eq!(snap.remaining_seconds, 42 * 60 + 30);
        assert_eq!(snap.question_status.len(), 2);
        assert_eq!(snap.validate_for(&exam(2)), Ok(()));
    }

    #[test]
    fn missing_ledger_is_a_parse_error() {
        let result = serde_json::from_str::<SessionSnapshot>(r#"{"current": 0, "score": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_time_defaults_to_full_exam() {
        let snap: SessionSnapshot =
            serde_json::from_str(r#"{"question_status": []}"#).unwrap();
        assert_eq!(snap.remaining_seconds, DEFAULT_EXAM_SECONDS);
    }
}
