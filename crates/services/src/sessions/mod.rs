mod persistence;
mod progress;
mod runner;
mod service;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use persistence::PersistenceBridge;
pub use progress::QuizProgress;
pub use runner::{Command, QuizRunner, RunOutcome};
pub use service::QuizSessionService;
