//! Quiz session transitions as a single pure function.
//!
//! Every user action, timer tick and load completion becomes an [`Action`] and is
//! applied with [`reduce`]. Actions that do not apply to the current phase, or
//! that point outside the exam, leave the session untouched.

use std::sync::Arc;

use crate::model::{Choice, Exam, Phase, QuestionStatus, QuizSession, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Exam data arrived, optionally with a validated snapshot to resume from.
    Loaded {
        exam: Arc<Exam>,
        snapshot: Option<SessionSnapshot>,
    },
    LoadFailed {
        message: String,
    },
    /// Provisional selection for the current question.
    Select(Choice),
    /// "Next" / "Submit": commit the current selection and advance.
    Commit,
    Back,
    /// Question palette jump. Does not commit the question being left.
    Jump(usize),
    ToggleMark,
    RequestReview,
    ConfirmSubmit,
    ReturnFromReview,
    Tick {
        remaining_seconds: u32,
    },
    /// The exam clock ran out and the session should be submitted as is.
    TimeUp,
}

/// Apply `action` to `session`, returning the next session state.
#[must_use]
pub fn reduce(mut session: QuizSession, action: Action) -> QuizSession {
    match (session.phase, action) {
        (Phase::Loading, Action::Loaded { exam, snapshot }) => {
            if exam.id() != &session.exam_id {
                return session;
            }
            load(&mut session, exam, snapshot);
        }
        (Phase::Loading, Action::LoadFailed { message }) => {
            session.phase = Phase::Error;
            session.error = Some(message);
        }
        (Phase::Answering, Action::Select(choice)) => {
            let valid = session
                .current_question()
                .is_some_and(|question| question.has_option(choice));
            if valid {
                if let Some(status) = session.statuses.get_mut(session.current_index) {
                    status.selected = Some(choice);
                }
            }
        }
        (Phase::Answering, Action::Commit) => commit(&mut session),
        (Phase::Answering, Action::Back) => {
            session.current_index = session.current_index.saturating_sub(1);
        }
        (Phase::Answering, Action::Jump(index)) => {
            if index < session.question_count() {
                session.current_index = index;
            }
        }
        (Phase::Answering, Action::ToggleMark) => {
            if let Some(status) = session.statuses.get_mut(session.current_index) {
                status.marked = !status.marked;
            }
        }
        (Phase::Answering, Action::RequestReview) => session.phase = Phase::ReviewSummary,
        (Phase::ReviewSummary, Action::ConfirmSubmit) => session.phase = Phase::Finished,
        (Phase::ReviewSummary, Action::ReturnFromReview) => session.phase = Phase::Answering,
        (phase, Action::Tick { remaining_seconds }) if phase.is_active() => {
            session.remaining_seconds = session.remaining_seconds.min(remaining_seconds);
        }
        (phase, Action::TimeUp) if phase.is_active() => {
            session.remaining_seconds = 0;
            session.phase = Phase::Finished;
        }
        _ => {}
    }
    session
}

fn load(session: &mut QuizSession, exam: Arc<Exam>, snapshot: Option<SessionSnapshot>) {
    let restored = snapshot.filter(|snap| snap.validate_for(&exam).is_ok());
    match restored {
        Some(snap) => {
            session.statuses = snap.question_status;
            session.current_index = snap.current_index;
            session.score = reconcile_credit(&mut session.statuses, &exam);
            session.remaining_seconds = snap.remaining_seconds;
        }
        None => {
            session.statuses = vec![QuestionStatus::default(); exam.len()];
            session.current_index = 0;
            session.score = 0;
        }
    }
    session.exam = Some(exam);
    session.error = None;
    session.phase = Phase::Answering;
}

/// Mark every committed correct answer as credited and return the resulting
/// score. Browser-era ledgers carry no credit flags, so their stored score is
/// rebuilt from the ledger instead of trusted.
fn reconcile_credit(statuses: &mut [QuestionStatus], exam: &Exam) -> u32 {
    let mut score = 0;
    for (status, question) in statuses.iter_mut().zip(exam.questions()) {
        if status.answered && status.selected.is_some_and(|c| question.is_correct(c)) {
            status.credited = true;
        }
        if status.credited {
            score += 1;
        }
    }
    score
}

fn commit(session: &mut QuizSession) {
    let index = session.current_index;
    let Some(exam) = session.exam.as_ref() else {
        return;
    };
    let Some(question) = exam.questions().get(index) else {
        return;
    };
    let Some(status) = session.statuses.get_mut(index) else {
        return;
    };

    status.answered = status.selected.is_some();
    if status.selected.is_some_and(|c| question.is_correct(c)) && !status.credited {
        status.credited = true;
        session.score += 1;
    }

    if session.is_last_question() {
        session.phase = Phase::Finished;
    } else {
        session.current_index += 1;
    }
}
