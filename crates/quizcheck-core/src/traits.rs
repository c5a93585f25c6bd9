//! Collaborator traits consumed by the grader and the quiz session.
//!
//! `ExpressionEngine` is implemented by `quizcheck-math`; `ProgressStore`
//! backends live in `quizcheck-progress`. Test doubles for all three traits
//! are in [`crate::mock`].

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ExpressionError;
use crate::model::LessonContext;

// ---------------------------------------------------------------------------
// Expression engine
// ---------------------------------------------------------------------------

/// Symbolic-math capability used to grade open questions.
///
/// The grader never inspects `Expr`; it only decides which of the
/// predicates to call and when.
pub trait ExpressionEngine: Send + Sync {
    /// Parsed expression.
    type Expr: Send;

    /// Human-readable engine name (e.g. "latex").
    fn name(&self) -> &str;

    /// Parse text into an expression, keeping its written structure.
    fn parse(&self, text: &str) -> Result<Self::Expr, ExpressionError>;

    /// Apply algebraic normalization.
    fn simplify(&self, expr: &Self::Expr) -> Result<Self::Expr, ExpressionError>;

    /// Identical form, no simplification applied.
    fn is_structurally_same(&self, a: &Self::Expr, b: &Self::Expr) -> bool;

    /// Same mathematical value.
    fn is_value_equal(&self, a: &Self::Expr, b: &Self::Expr) -> bool;
}

// ---------------------------------------------------------------------------
// Progress store
// ---------------------------------------------------------------------------

/// Persistence of learner progress, keyed by the current user.
///
/// Both writes are idempotent upserts.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Record that the current user answered `question_id` correctly.
    async fn record_correct_answer(&self, question_id: &str) -> anyhow::Result<()>;

    /// Mark a lesson complete for the current user.
    async fn complete_lesson(&self, lesson: &LessonContext) -> anyhow::Result<()>;

    /// Which of `question_ids` the current user already answered correctly.
    ///
    /// `None` means there is no authenticated user.
    async fn completed_question_ids(
        &self,
        question_ids: &[String],
    ) -> anyhow::Result<Option<HashSet<String>>>;
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Page transitions requested by the session. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, url: &str);

    /// Discard the current page state and rebuild it from persisted progress.
    fn reload(&self);
}
