//! quizcheck-core: Quiz model, answer grading, and session state.
//!
//! This crate defines the question model, the collaborator traits, the
//! answer grader and the quiz session state machine that the rest of
//! quizcheck builds on.

pub mod error;
pub mod grader;
pub mod mock;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod statistics;
pub mod traits;

pub use error::{ExpressionError, SessionError};
pub use grader::{Grader, IncorrectReason, Verdict};
pub use model::{
    AnswerKey, AnswerMode, LessonContext, Question, QuestionStatus, QuestionType, Quiz, Submission,
};
pub use parser::ValidationWarning;
pub use report::QuizReport;
pub use session::{CheckOutcome, NextStep, QuizSession, SessionConfig, SessionSnapshot};
pub use statistics::QuizStats;
pub use traits::{ExpressionEngine, Navigator, ProgressStore};
