use std::env;

use quiz_core::DEFAULT_EXAM_SECONDS;

/// Where exam JSON documents are served from.
pub const DEFAULT_EXAM_BASE_URL: &str =
    "https://raw.githubusercontent.com/Tanmay-Patel2004/aws-practice-questions/main/data/";

/// Runtime settings for loading and timing exams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub base_url: String,
    pub duration_secs: u32,
    /// Submit automatically when the clock reaches zero.
    pub auto_submit_on_expiry: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXAM_BASE_URL.into(),
            duration_secs: DEFAULT_EXAM_SECONDS,
            auto_submit_on_expiry: false,
        }
    }
}

impl QuizConfig {
    /// Read `EXAM_BASE_URL`, `EXAM_DURATION_SECS` and `EXAM_AUTO_SUBMIT`,
    /// falling back to defaults for anything missing or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`QuizConfig::from_env`] with an injectable variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let base_url = lookup("EXAM_BASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(default.base_url);
        let duration_secs = lookup("EXAM_DURATION_SECS")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default.duration_secs);
        let auto_submit_on_expiry = lookup("EXAM_AUTO_SUBMIT")
            .and_then(|value| parse_flag(&value))
            .unwrap_or(default.auto_submit_on_expiry);
        Self {
            base_url,
            duration_secs,
            auto_submit_on_expiry,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = QuizConfig::from_lookup(|_| None);
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.duration_secs, 5400);
        assert!(!config.auto_submit_on_expiry);
    }

    #[test]
    fn reads_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("EXAM_BASE_URL", "http://localhost:8080/data/"),
            ("EXAM_DURATION_SECS", "600"),
            ("EXAM_AUTO_SUBMIT", "yes"),
        ]);
        let config = QuizConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.base_url, "http://localhost:8080/data/");
        assert_eq!(config.duration_secs, 600);
        assert!(config.auto_submit_on_expiry);
    }

    #[test]
    fn ignores_unparseable_values() {
        let config = QuizConfig::from_lookup(|key| match key {
            "EXAM_DURATION_SECS" => Some("ninety".into()),
            "EXAM_AUTO_SUBMIT" => Some("maybe".into()),
            "EXAM_BASE_URL" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config, QuizConfig::default());
    }
}
