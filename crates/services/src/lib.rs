#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod exam_loader;
pub mod selection_service;
pub mod sessions;
pub mod timer;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::QuizConfig;
pub use error::{AppServicesError, LoadError, SelectionError, SessionError};
pub use exam_loader::{ExamLoader, ExamSource, HttpExamSource, LoadOutcome, LoadTicket, decode_exam};
pub use selection_service::ExamSelectionService;
pub use sessions::{
    Command, PersistenceBridge, QuizProgress, QuizRunner, QuizSessionService, RunOutcome,
};
pub use timer::{CountdownTimer, Tick};
