//! Error types shared across quizcheck.
//!
//! `ExpressionError` is produced by expression engines and never escapes the
//! grader. `SessionError` is what the session state machine surfaces to its
//! caller.

use thiserror::Error;

/// Failures inside an expression engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// The input was empty or only whitespace.
    #[error("empty expression")]
    Empty,

    /// The input could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The expression parsed but could not be evaluated or simplified.
    #[error("evaluation error: {0}")]
    Evaluation(String),
}

/// Errors surfaced by a quiz session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was created with no questions.
    #[error("no questions loaded")]
    NoQuestions,

    /// Navigation to an index outside the question list.
    #[error("question index {index} out of range ({len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The progress store failed to mark the lesson complete.
    #[error("failed to mark lesson {lesson_id} complete: {source:#}")]
    Completion {
        lesson_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SessionError {
    /// Returns `true` if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Completion { .. })
    }
}
