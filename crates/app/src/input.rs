//! Line commands typed at the terminal.

use std::fmt;

use quiz_core::model::{Choice, ExamId};
use quiz_core::reducer::Action;
use services::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Unknown(String),
    InvalidNumber(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Unknown(raw) => write!(f, "unknown command: {raw} (type `help`)"),
            InputError::InvalidNumber(raw) => write!(f, "not a question number: {raw}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Input on the exam selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeInput {
    Start(ExamId),
    Help,
    Exit,
    Nothing,
}

/// Input while an exam is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizInput {
    Command(Command),
    /// Reveal or hide the answer to the current question.
    ToggleAnswer,
    Help,
    /// Leave the program, keeping the in-progress snapshot.
    Exit,
    Nothing,
}

/// Input on the error or result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfterInput {
    Retry,
    Home,
    Exit,
    Nothing,
}

/// # Errors
///
/// Returns `InputError::Unknown` for anything that is not an exam or a command.
pub fn parse_home(line: &str) -> Result<HomeInput, InputError> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => Ok(HomeInput::Nothing),
        "help" | "?" => Ok(HomeInput::Help),
        "exit" | "quit" | "q" => Ok(HomeInput::Exit),
        _ => ExamId::parse(line)
            .map(HomeInput::Start)
            .map_err(|_| InputError::Unknown(line.to_string())),
    }
}

/// A single letter selects that option; numbers jump to a question; words
/// drive navigation.
///
/// # Errors
///
/// Returns `InputError` for unknown words or unusable question numbers.
pub fn parse_quiz(line: &str) -> Result<QuizInput, InputError> {
    let line = line.trim();
    let lower = line.to_ascii_lowercase();
    let mut words = lower.split_whitespace();
    let (Some(head), rest) = (words.next(), words.next()) else {
        return Ok(QuizInput::Nothing);
    };
    if words.next().is_some() {
        return Err(InputError::Unknown(line.to_string()));
    }

    let action = match (head, rest) {
        (letter, None) if letter.len() == 1 && letter.chars().all(|c| c.is_ascii_alphabetic()) => {
            let choice: Choice = letter
                .parse()
                .map_err(|_| InputError::Unknown(line.to_string()))?;
            Action::Select(choice)
        }
        ("next" | ">", None) => Action::Commit,
        ("prev" | "previous" | "<", None) => Action::Back,
        ("go" | "goto", Some(number)) => Action::Jump(question_index(number)?),
        (number, None) if number.chars().all(|c| c.is_ascii_digit()) => {
            Action::Jump(question_index(number)?)
        }
        ("mark", None) => Action::ToggleMark,
        ("review", None) => Action::RequestReview,
        ("submit" | "confirm", None) => Action::ConfirmSubmit,
        ("back" | "return", None) => Action::ReturnFromReview,
        ("show" | "answer", None) => return Ok(QuizInput::ToggleAnswer),
        ("help" | "?", None) => return Ok(QuizInput::Help),
        ("quit", None) => return Ok(QuizInput::Command(Command::Quit)),
        ("exit", None) => return Ok(QuizInput::Exit),
        _ => return Err(InputError::Unknown(line.to_string())),
    };
    Ok(QuizInput::Command(Command::Action(action)))
}

/// # Errors
///
/// Returns `InputError::Unknown` for anything but retry/home/exit.
pub fn parse_after(line: &str) -> Result<AfterInput, InputError> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Ok(AfterInput::Nothing),
        "retry" | "r" | "again" => Ok(AfterInput::Retry),
        "home" | "h" | "quit" => Ok(AfterInput::Home),
        "exit" => Ok(AfterInput::Exit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}

fn question_index(raw: &str) -> Result<usize, InputError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .ok_or_else(|| InputError::InvalidNumber(raw.to_string()))
}
