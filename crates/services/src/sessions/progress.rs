use quiz_core::model::{PaletteState, QuizSession};

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    /// One-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub percent: u32,
    pub answered: usize,
    pub marked: usize,
    pub clock: String,
    pub palette: Vec<PaletteState>,
}

impl QuizProgress {
    #[must_use]
    pub fn of(session: &QuizSession) -> Self {
        let summary = session.review_summary();
        Self {
            position: session.current_index() + 1,
            total: summary.total,
            percent: session.progress_percent(),
            answered: summary.answered,
            marked: summary.marked,
            clock: session.countdown().to_string(),
            palette: session.palette(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, Exam, ExamId, QuestionRecord};
    use quiz_core::reducer::{Action, reduce};
    use std::sync::Arc;

    #[test]
    fn progress_tracks_position_and_palette() {
        let records = (0..4)
            .map(|n| QuestionRecord {
                question: format!("Q{n}"),
                options: vec!["yes".into(), "no".into()],
                answer: "A".into(),
                explanation: None,
            })
            .collect();
        let exam = Exam::from_records(ExamId::numbered(1), records).unwrap();
        let mut session = reduce(
            QuizSession::new(ExamId::numbered(1), 125),
            Action::Loaded {
                exam: Arc::new(exam),
                snapshot: None,
            },
        );
        session = reduce(session, Action::Select(Choice::from_letter('A').unwrap()));
        session = reduce(session, Action::Commit);
        session = reduce(session, Action::ToggleMark);

        let progress = QuizProgress::of(&session);
        assert_eq!(progress.position, 2);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.marked, 1);
        assert_eq!(progress.clock, "02:05");
        assert_eq!(
            progress.palette,
            vec![
                PaletteState::Answered,
                PaletteState::Current,
                PaletteState::Unanswered,
                PaletteState::Unanswered,
            ]
        );
    }
}
