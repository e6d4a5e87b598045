use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::countdown::Countdown;
use crate::model::ids::{Choice, ExamId};
use crate::model::question::{Exam, Question};
use crate::model::snapshot::SessionSnapshot;
use crate::model::status::{PaletteState, QuestionStatus};

/// Minimum percentage presented as a pass.
pub const PASS_THRESHOLD_PERCENT: u32 = 70;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Top-level state of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Loading,
    Error,
    Answering,
    ReviewSummary,
    Finished,
}

impl Phase {
    /// True while the exam clock is running and the ledger may still change.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Answering | Self::ReviewSummary)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Loading => "loading",
            Self::Error => "error",
            Self::Answering => "answering",
            Self::ReviewSummary => "review",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

//
// ─── DERIVED VIEWS ─────────────────────────────────────────────────────────────
//

/// Counts shown on the review screen before final submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSummary {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub marked: usize,
}

/// One row of the post-exam review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub number: usize,
    pub selected: Option<Choice>,
    pub correct: Choice,
    pub is_correct: bool,
    pub marked: bool,
}

/// Display derivations for a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub total: usize,
    pub percentage: u32,
    pub passed: bool,
    pub questions: Vec<QuestionReview>,
}

/// `round(100 * score / total)`, rounding halves up.
#[must_use]
pub fn percentage(score: u32, total: usize) -> u32 {
    let Ok(total) = u64::try_from(total) else {
        return 0;
    };
    if total == 0 {
        return 0;
    }
    let scaled = (200 * u64::from(score) + total) / (2 * total);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The one live quiz session.
///
/// Mutated only through [`crate::reducer::reduce`]; everything else reads it.
#[derive(Clone, PartialEq, Eq)]
pub struct QuizSession {
    pub(crate) exam_id: ExamId,
    pub(crate) phase: Phase,
    pub(crate) exam: Option<Arc<Exam>>,
    pub(crate) statuses: Vec<QuestionStatus>,
    pub(crate) current_index: usize,
    pub(crate) score: u32,
    pub(crate) remaining_seconds: u32,
    pub(crate) error: Option<String>,
}

impl QuizSession {
    /// A session waiting for its exam data.
    #[must_use]
    pub fn new(exam_id: ExamId, duration_secs: u32) -> Self {
        Self {
            exam_id,
            phase: Phase::Loading,
            exam: None,
            statuses: Vec::new(),
            current_index: 0,
            score: 0,
            remaining_seconds: duration_secs,
            error: None,
        }
    }

    #[must_use]
    pub fn exam_id(&self) -> &ExamId {
        &self.exam_id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn exam(&self) -> Option<&Exam> {
        self.exam.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn statuses(&self) -> &[QuestionStatus] {
        &self.statuses
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn countdown(&self) -> Countdown {
        Countdown::new(self.remaining_seconds)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.exam.as_ref().map_or(0, |exam| exam.len())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.exam.as_ref()?.question(self.current_index)
    }

    #[must_use]
    pub fn current_status(&self) -> Option<&QuestionStatus> {
        self.statuses.get(self.current_index)
    }

    /// Selection shown for the current question.
    #[must_use]
    pub fn selected(&self) -> Option<Choice> {
        self.current_status().and_then(|status| status.selected)
    }

    /// Mark-for-review flag of the current question.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.current_status().is_some_and(|status| status.marked)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.question_count()
    }

    /// Position progress as a percentage, `(current + 1) / total`.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let total = self.question_count();
        let position = u32::try_from(self.current_index + 1).unwrap_or(u32::MAX);
        if total == 0 { 0 } else { percentage(position, total) }
    }

    #[must_use]
    pub fn palette(&self) -> Vec<PaletteState> {
        self.statuses
            .iter()
            .enumerate()
            .map(|(index, status)| status.palette(index == self.current_index))
            .collect()
    }

    #[must_use]
    pub fn review_summary(&self) -> ReviewSummary {
        let total = self.question_count();
        let answered = self.statuses.iter().filter(|s| s.answered).count();
        let marked = self.statuses.iter().filter(|s| s.marked).count();
        ReviewSummary {
            total,
            answered,
            unanswered: total.saturating_sub(answered),
            marked,
        }
    }

    /// Result derivations; only available once the session is finished.
    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        if self.phase != Phase::Finished {
            return None;
        }
        let exam = self.exam.as_ref()?;
        let total = exam.len();
        let percentage = percentage(self.score, total);
        let questions = exam
            .questions()
            .iter()
            .zip(&self.statuses)
            .enumerate()
            .map(|(index, (question, status))| QuestionReview {
                number: index + 1,
                selected: status.selected,
                correct: question.answer(),
                is_correct: status.selected.is_some_and(|c| question.is_correct(c)),
                marked: status.marked,
            })
            .collect();

        Some(QuizResult {
            score: self.score,
            total,
            percentage,
            passed: percentage >= PASS_THRESHOLD_PERCENT,
            questions,
        })
    }

    /// Snapshot for the persistence layer; `None` unless the session is active.
    #[must_use]
    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> Option<SessionSnapshot> {
        if !self.phase.is_active() {
            return None;
        }
        Some(SessionSnapshot {
            current_index: self.current_index,
            selected: self.selected(),
            mark_question: self.is_marked(),
            question_status: self.statuses.clone(),
            score: self.score,
            remaining_seconds: self.remaining_seconds,
            saved_at: Some(saved_at),
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("exam_id", &self.exam_id)
            .field("phase", &self.phase)
            .field("questions", &self.question_count())
            .field("current_index", &self.current_index)
            .field("score", &self.score)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
