use serde::{Deserialize, Serialize};

use crate::model::ids::Choice;

/// Per-question entry of the ledger.
///
/// `selected` follows the question: it is written as soon as an option is picked
/// and restored whenever the question is shown again. `answered` only changes on
/// commit, at which point `answered == selected.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStatus {
    #[serde(default)]
    pub answered: bool,
    #[serde(default)]
    pub marked: bool,
    #[serde(default, with = "blank_choice")]
    pub selected: Option<Choice>,
    /// Set once the question has contributed to the score.
    #[serde(default)]
    pub credited: bool,
}

impl QuestionStatus {
    /// Palette appearance; the current question wins, then marked, then answered.
    #[must_use]
    pub fn palette(&self, is_current: bool) -> PaletteState {
        if is_current {
            PaletteState::Current
        } else if self.marked {
            PaletteState::Marked
        } else if self.answered {
            PaletteState::Answered
        } else {
            PaletteState::Unanswered
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteState {
    Current,
    Marked,
    Answered,
    Unanswered,
}

/// Serializes `Option<Choice>` as `""` / `"A"` and accepts `null` or a blank string as `None`.
pub(crate) mod blank_choice {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::model::ids::Choice;

    pub fn serialize<S: Serializer>(
        value: &Option<Choice>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(choice) => serializer.serialize_str(&choice.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Choice>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(letter) => letter.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_prefers_current_then_marked() {
        let status = QuestionStatus {
            answered: true,
            marked: true,
            ..QuestionStatus::default()
        };
        assert_eq!(status.palette(true), PaletteState::Current);
        assert_eq!(status.palette(false), PaletteState::Marked);

        let answered = QuestionStatus {
            answered: true,
            ..QuestionStatus::default()
        };
        assert_eq!(answered.palette(false), PaletteState::Answered);
        assert_eq!(QuestionStatus::default().palette(false), PaletteState::Unanswered);
    }

    #[test]
    fn blank_selection_round_trips_as_empty_string() {
        let status = QuestionStatus::default();
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["selected"], "");

        let parsed: QuestionStatus =
            serde_json::from_str(r#"{"answered":true,"marked":false,"selected":"C"}"#).unwrap();
        assert_eq!(parsed.selected.map(Choice::letter), Some('C'));
        assert!(!parsed.credited);

        let legacy: QuestionStatus =
            serde_json::from_str(r#"{"answered":false,"marked":true}"#).unwrap();
        assert_eq!(legacy.selected, None);
    }
}
