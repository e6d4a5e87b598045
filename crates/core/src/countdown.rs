use std::fmt;

/// Default exam length: 90 minutes.
pub const DEFAULT_EXAM_SECONDS: u32 = 90 * 60;

/// Remaining exam time, decremented one second per tick and floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance by one second and return the new remaining value.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    #[must_use]
    pub fn expired(&self) -> bool {
        self.remaining == 0
    }

    /// Parses a `MM:SS` clock string into seconds.
    #[must_use]
    pub fn parse_clock(raw: &str) -> Option<u32> {
        let (minutes, seconds) = raw.trim().split_once(':')?;
        let minutes: u32 = minutes.parse().ok()?;
        let seconds: u32 = seconds.parse().ok()?;
        if seconds >= 60 {
            return None;
        }
        minutes.checked_mul(60)?.checked_add(seconds)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_EXAM_SECONDS)
    }
}

/// Zero-padded `MM:SS`.
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
