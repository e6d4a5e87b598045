use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamIdError {
    #[error("exam identifier cannot be empty")]
    Empty,

    #[error("exam identifier must be a single path segment, got {raw:?}")]
    InvalidSegment { raw: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChoiceError {
    #[error("expected a single option letter A-Z, got {raw:?}")]
    InvalidLetter { raw: String },

    #[error("option index {index} exceeds the {max} letters available")]
    IndexOutOfRange { index: usize, max: usize },
}

//
// ─── EXAM ID ───────────────────────────────────────────────────────────────────
//

/// Opaque identifier naming one exam resource, e.g. `exam-7.json`.
///
/// The identifier is appended to the exam base URL as a path suffix, so it must
/// be a single non-empty segment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExamId(String);

impl ExamId {
    /// Creates an `ExamId` from an already canonical identifier.
    ///
    /// # Errors
    ///
    /// Returns `ExamIdError` if the identifier is empty or not a single path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, ExamIdError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ExamIdError::Empty);
        }
        if trimmed.contains(['/', '\\', '?', '#']) || trimmed.chars().any(char::is_whitespace) {
            return Err(ExamIdError::InvalidSegment { raw: id });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Identifier of the numbered exam in the catalog (`exam-{number}.json`).
    #[must_use]
    pub fn numbered(number: u32) -> Self {
        Self(format!("exam-{number}.json"))
    }

    /// Accepts `7`, `exam-7` or `exam-7.json` and normalizes to `exam-7.json`.
    /// Anything else is kept as an opaque identifier.
    ///
    /// # Errors
    ///
    /// Returns `ExamIdError` if the input is empty or not a single path segment.
    pub fn parse(raw: &str) -> Result<Self, ExamIdError> {
        let trimmed = raw.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Ok(Self::numbered(number));
        }
        if let Some(rest) = trimmed.strip_prefix("exam-") {
            if let Ok(number) = rest.parse::<u32>() {
                return Ok(Self::numbered(number));
            }
        }
        Self::new(trimmed)
    }

    /// Catalog number when the identifier follows the `exam-{n}.json` scheme.
    #[must_use]
    pub fn number(&self) -> Option<u32> {
        self.0
            .strip_prefix("exam-")
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|n| n.parse().ok())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExamId {
    type Error = ExamIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExamId> for String {
    fn from(value: ExamId) -> Self {
        value.0
    }
}

impl FromStr for ExamId {
    type Err = ExamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExamId({})", self.0)
    }
}

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── CHOICE ────────────────────────────────────────────────────────────────────
//

/// Letter identifier of an answer option, derived from its position (`A` = 0).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Choice(u8);

impl Choice {
    /// Number of distinct option letters.
    pub const MAX_OPTIONS: usize = 26;

    /// Choice for the option at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ChoiceError::IndexOutOfRange` past `Z`.
    pub fn from_index(index: usize) -> Result<Self, ChoiceError> {
        u8::try_from(index)
            .ok()
            .filter(|i| usize::from(*i) < Self::MAX_OPTIONS)
            .map(Self)
            .ok_or(ChoiceError::IndexOutOfRange {
                index,
                max: Self::MAX_OPTIONS,
            })
    }

    /// Parses a letter, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ChoiceError::InvalidLetter` for anything outside `A-Z`.
    pub fn from_letter(letter: char) -> Result<Self, ChoiceError> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper as u8 - b'A'))
        } else {
            Err(ChoiceError::InvalidLetter {
                raw: letter.to_string(),
            })
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn letter(self) -> char {
        char::from(b'A' + self.0)
    }
}

impl FromStr for Choice {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => Err(ChoiceError::InvalidLetter { raw: s.to_owned() }),
        }
    }
}

impl TryFrom<String> for Choice {
    type Error = ChoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Choice> for String {
    fn from(value: Choice) -> Self {
        value.letter().to_string()
    }
}

impl fmt::Debug for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Choice({})", self.letter())
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_id_parse_normalizes_catalog_forms() {
        let expected = ExamId::numbered(7);
        assert_eq!(ExamId::parse("7").unwrap(), expected);
        assert_eq!(ExamId::parse("exam-7").unwrap(), expected);
        assert_eq!(ExamId::parse(" exam-7.json ").unwrap(), expected);
        assert_eq!(expected.as_str(), "exam-7.json");
        assert_eq!(expected.number(), Some(7));
    }

    #[test]
    fn exam_id_keeps_opaque_identifiers() {
        let id = ExamId::parse("practice-final.json").unwrap();
        assert_eq!(id.as_str(), "practice-final.json");
        assert_eq!(id.number(), None);
    }

    #[test]
    fn exam_id_rejects_empty_and_paths() {
        assert_eq!(ExamId::parse("  "), Err(ExamIdError::Empty));
        assert!(matches!(
            ExamId::parse("../secrets"),
            Err(ExamIdError::InvalidSegment { .. })
        ));
        assert!(ExamId::new("exam 1").is_err());
    }

    #[test]
    fn choice_letters_follow_position() {
        assert_eq!(Choice::from_index(0).unwrap().letter(), 'A');
        assert_eq!(Choice::from_index(3).unwrap().letter(), 'D');
        assert!(Choice::from_index(26).is_err());
        assert_eq!("c".parse::<Choice>().unwrap().index(), 2);
        assert!("AB".parse::<Choice>().is_err());
        assert!("".parse::<Choice>().is_err());
        assert!(Choice::from_letter('1').is_err());
    }

    #[test]
    fn choice_serializes_as_letter() {
        let choice = Choice::from_letter('B').unwrap();
        assert_eq!(serde_json::to_string(&choice).unwrap(), "\"B\"");
        let parsed: Choice = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(parsed, choice);
    }
}
