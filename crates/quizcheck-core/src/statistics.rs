//! Score and pass/fail computation over a session history.

use serde::{Deserialize, Serialize};

use crate::model::QuestionStatus;

/// Default pass threshold: strictly more than half of the questions.
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.5;

/// Score summary for one quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizStats {
    pub correct_count: usize,
    pub total: usize,
    pub is_passed: bool,
}

impl QuizStats {
    pub fn from_history(history: &[QuestionStatus], threshold: f64) -> Self {
        let correct_count = history
            .iter()
            .filter(|s| **s == QuestionStatus::Correct)
            .count();
        let total = history.len();
        Self {
            correct_count,
            total,
            is_passed: is_passed(correct_count, total, threshold),
        }
    }

    /// Fraction of correct answers; 0.0 for an empty quiz.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.total as f64
        }
    }
}

/// `correct / total > threshold`. An empty quiz never passes.
pub fn is_passed(correct: usize, total: usize, threshold: f64) -> bool {
    total > 0 && (correct as f64 / total as f64) > threshold
}
