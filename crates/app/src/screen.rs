//! Plain-text screens. Every function is pure so the layout can be tested.

use std::fmt::Write as _;

use quiz_core::catalog::{self, CatalogEntry};
use quiz_core::model::{PaletteState, Phase, QuizSession};
use services::QuizProgress;

const RULE: &str = "----------------------------------------";

#[must_use]
pub fn home(entries: &[CatalogEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\nAWS practice exams\n{RULE}");
    for row in entries.chunks(4) {
        let line: Vec<String> = row
            .iter()
            .map(|entry| format!("[{:>2}] {:<8}", entry.number, entry.name))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    let _ = write!(out, "\nType an exam number to start, `help`, or `exit`.");
    out
}

#[must_use]
pub fn home_help() -> &'static str {
    "Enter 1-23 (or an identifier like exam-7.json) to start that exam.\n\
     An exam left unfinished resumes where you stopped.\n\
     `exit` leaves the program."
}

#[must_use]
pub fn quiz_help() -> &'static str {
    "a, b, c ...   select an option\n\
     next          save the answer and move on (submits on the last question)\n\
     prev          previous question\n\
     3 / go 3      jump to question 3 without saving the current one\n\
     mark          toggle mark for review\n\
     show          show or hide the correct answer\n\
     review        open the review summary\n\
     submit        confirm submission from the review summary\n\
     back          return from the review summary\n\
     quit          abandon this exam\n\
     exit          leave the program, resuming next time"
}

/// Catalog name when the exam is one of the numbered ones, else its identifier.
fn exam_title(session: &QuizSession) -> String {
    catalog::lookup(session.exam_id())
        .map_or_else(|| session.exam_id().to_string(), |entry| entry.name)
}

#[must_use]
pub fn palette_symbol(state: PaletteState) -> char {
    match state {
        PaletteState::Current => '>',
        PaletteState::Marked => '?',
        PaletteState::Answered => '*',
        PaletteState::Unanswered => '.',
    }
}

/// Question screen. Returns `None` outside the answering phase.
#[must_use]
pub fn question(session: &QuizSession, show_answer: bool) -> Option<String> {
    if session.phase() != Phase::Answering {
        return None;
    }
    let question = session.current_question()?;
    let progress = QuizProgress::of(session);
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{}  Question {}/{} ({}%)  Time left {}",
        exam_title(session),
        progress.position,
        progress.total,
        progress.percent,
        progress.clock
    );
    let palette: String = progress.palette.iter().copied().map(palette_symbol).collect();
    let _ = writeln!(out, "[{palette}]");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", question.text());
    if session.is_marked() {
        let _ = writeln!(out, "(marked for review)");
    }
    let _ = writeln!(out);

    let selected = session.selected();
    for (choice, text) in question.lettered_options() {
        let pointer = if selected == Some(choice) { '>' } else { ' ' };
        let _ = writeln!(out, "{pointer} {}. {text}", choice.letter());
    }

    if show_answer {
        let _ = writeln!(out, "\nAnswer: {}", question.answer());
        if let Some(explanation) = question.explanation() {
            let _ = writeln!(out, "{explanation}");
        }
    }

    let next = if session.is_last_question() { "submit" } else { "next" };
    let _ = write!(out, "\n[{next}: `next`] [`prev`] [`mark`] [`show`] [`review`] [`quit`]");
    Some(out)
}

#[must_use]
pub fn review(session: &QuizSession) -> String {
    let summary = session.review_summary();
    format!(
        "{RULE}\nReview before submitting\n{RULE}\n\
         Total questions: {}\nAnswered: {}\nUnanswered: {}\nMarked for review: {}\n\
         Time left: {}\n\n`submit` to finish, `back` to keep answering.",
        summary.total,
        summary.answered,
        summary.unanswered,
        summary.marked,
        session.countdown()
    )
}

/// Result report. Returns `None` until the session is finished.
#[must_use]
pub fn result(session: &QuizSession) -> Option<String> {
    let result = session.result()?;
    let exam = session.exam()?;
    let mut out = String::new();

    let verdict = if result.passed { "PASSED" } else { "NOT PASSED" };
    let _ = writeln!(out, "{RULE}\nQuiz completed: {}\n{RULE}", exam_title(session));
    let _ = writeln!(
        out,
        "Score: {}/{} ({}%)  {verdict}",
        result.score, result.total, result.percentage
    );

    for (row, question) in result.questions.iter().zip(exam.questions()) {
        let yours = row
            .selected
            .map_or_else(|| "-".to_string(), |choice| choice.to_string());
        let mark = if row.is_correct { "ok" } else { "x " };
        let flag = if row.marked { " ?" } else { "" };
        let _ = writeln!(
            out,
            "{mark} {:>3}. yours {yours}  correct {}{flag}  {}",
            row.number,
            row.correct,
            question.text()
        );
        if !row.is_correct {
            if let Some(explanation) = question.explanation() {
                let _ = writeln!(out, "        {explanation}");
            }
        }
    }

    let _ = write!(out, "\n`retry` to take it again, `home` for the exam list.");
    Some(out)
}

#[must_use]
pub fn error(session: &QuizSession) -> String {
    format!(
        "{RULE}\nCould not load {}\n{RULE}\n{}\n\n`retry` to reload, `home` for the exam list.",
        session.exam_id(),
        session.error().unwrap_or("Unknown error")
    )
}

#[must_use]
pub fn time_up() -> &'static str {
    "Time is up. Finish with `review` then `submit`."
}
