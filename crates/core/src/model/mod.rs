mod ids;
mod question;
mod session;
mod snapshot;
mod status;

pub use ids::{Choice, ChoiceError, ExamId, ExamIdError};
pub use question::{Exam, ExamError, Question, QuestionError, QuestionRecord};
pub use session::{
    PASS_THRESHOLD_PERCENT, Phase, QuestionReview, QuizResult, QuizSession, ReviewSummary,
    percentage,
};
pub use snapshot::{SessionSnapshot, SnapshotError};
pub use status::{PaletteState, QuestionStatus};
