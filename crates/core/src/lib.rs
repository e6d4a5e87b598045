#![forbid(unsafe_code)]

pub mod catalog;
pub mod countdown;
pub mod model;
pub mod reducer;
pub mod time;

pub use countdown::{Countdown, DEFAULT_EXAM_SECONDS};
pub use reducer::{Action, reduce};
pub use time::Clock;
