//! Answer grading.
//!
//! [`Grader::grade`] maps a question and a submission to a [`Verdict`]. It
//! never fails: malformed input, parse errors and evaluation errors are all
//! graded as incorrect, with a reason kept for diagnostics.

use std::fmt;

use crate::model::{AnswerKey, AnswerMode, Question, QuestionStatus, Submission};
use crate::traits::ExpressionEngine;

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect(IncorrectReason),
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }

    /// Status recorded in the session history for this verdict.
    pub fn status(&self) -> QuestionStatus {
        if self.is_correct() {
            QuestionStatus::Correct
        } else {
            QuestionStatus::Incorrect
        }
    }

    pub fn reason(&self) -> Option<&IncorrectReason> {
        match self {
            Verdict::Correct => None,
            Verdict::Incorrect(reason) => Some(reason),
        }
    }
}

/// Which side of the comparison failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSide {
    Submitted,
    Canonical,
}

impl fmt::Display for AnswerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerSide::Submitted => write!(f, "submitted"),
            AnswerSide::Canonical => write!(f, "canonical"),
        }
    }
}

/// Why a submission was graded incorrect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncorrectReason {
    /// Well-formed but not the right answer.
    WrongAnswer,
    /// Empty or non-numeric choice index.
    InvalidSubmission,
    /// A choice index outside the option list.
    IndexOutOfRange { index: usize, len: usize },
    /// Text given for a multiple-choice question or a selection for any
    /// other type.
    ShapeMismatch,
    /// The open question has no canonical answer stored.
    MissingCanonicalAnswer,
    ParseFailure { side: AnswerSide, message: String },
    /// Simplification failed (e.g. division by zero).
    EvaluationFailure(String),
    UnsupportedMode(String),
}

impl IncorrectReason {
    /// Authoring or data problems, as opposed to a learner's wrong answer.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            IncorrectReason::MissingCanonicalAnswer
                | IncorrectReason::UnsupportedMode(_)
                | IncorrectReason::ParseFailure {
                    side: AnswerSide::Canonical,
                    ..
                }
        )
    }
}

impl fmt::Display for IncorrectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncorrectReason::WrongAnswer => write!(f, "wrong answer"),
            IncorrectReason::InvalidSubmission => write!(f, "not a valid option index"),
            IncorrectReason::IndexOutOfRange { index, len } => {
                write!(f, "option index {index} out of range ({len} options)")
            }
            IncorrectReason::ShapeMismatch => {
                write!(f, "answer shape does not match question type")
            }
            IncorrectReason::MissingCanonicalAnswer => {
                write!(f, "question has no canonical answer")
            }
            IncorrectReason::ParseFailure { side, message } => {
                write!(f, "{side} answer failed to parse: {message}")
            }
            IncorrectReason::EvaluationFailure(message) => {
                write!(f, "evaluation failed: {message}")
            }
            IncorrectReason::UnsupportedMode(mode) => write!(f, "unsupported answer mode '{mode}'"),
        }
    }
}

/// Grades submissions, delegating open answers to an expression engine.
#[derive(Debug, Clone)]
pub struct Grader<E> {
    engine: E,
}

impl<E: ExpressionEngine> Grader<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Grade `submission` against `question`'s canonical answer.
    pub fn grade(&self, question: &Question, submission: &Submission) -> Verdict {
        match (&question.answer, submission) {
            (AnswerKey::SingleChoice { options, correct }, Submission::Text(text)) => {
                grade_single_choice(options.len(), *correct, text)
            }
            (AnswerKey::MultipleChoice { options, correct }, Submission::Selection(items)) => {
                grade_multiple_choice(options.len(), correct, items)
            }
            (AnswerKey::Open { correct, mode }, Submission::Text(text)) => {
                self.grade_open(&question.id, correct.as_deref(), mode, text)
            }
            _ => Verdict::Incorrect(IncorrectReason::ShapeMismatch),
        }
    }

    fn grade_open(
        &self,
        question_id: &str,
        canonical: Option<&str>,
        mode: &AnswerMode,
        text: &str,
    ) -> Verdict {
        let Some(canonical) = canonical.filter(|c| !c.trim().is_empty()) else {
            tracing::warn!(
                target: "quizcheck::data_integrity",
                question_id,
                "open question has no canonical answer"
            );
            return Verdict::Incorrect(IncorrectReason::MissingCanonicalAnswer);
        };

        let submitted = match self.engine.parse(text) {
            Ok(expr) => expr,
            Err(e) => {
                tracing::debug!(question_id, "submitted answer failed to parse: {e}");
                return Verdict::Incorrect(IncorrectReason::ParseFailure {
                    side: AnswerSide::Submitted,
                    message: e.to_string(),
                });
            }
        };
        let expected = match self.engine.parse(canonical) {
            Ok(expr) => expr,
            Err(e) => {
                tracing::warn!(
                    target: "quizcheck::data_integrity",
                    question_id,
                    "canonical answer failed to parse: {e}"
                );
                return Verdict::Incorrect(IncorrectReason::ParseFailure {
                    side: AnswerSide::Canonical,
                    message: e.to_string(),
                });
            }
        };

        let matched = match mode {
            AnswerMode::SameValue => {
                let simplified = self
                    .engine
                    .simplify(&submitted)
                    .and_then(|a| Ok((a, self.engine.simplify(&expected)?)));
                match simplified {
                    Ok((a, b)) => {
                        self.engine.is_value_equal(&a, &b)
                            || self.engine.is_structurally_same(&a, &b)
                    }
                    Err(e) => {
                        tracing::debug!(question_id, "simplification failed: {e}");
                        return Verdict::Incorrect(IncorrectReason::EvaluationFailure(
                            e.to_string(),
                        ));
                    }
                }
            }
            AnswerMode::Exact => self.engine.is_structurally_same(&submitted, &expected),
            AnswerMode::Other(raw) => {
                tracing::warn!(
                    target: "quizcheck::data_integrity",
                    question_id,
                    mode = %raw,
                    "unsupported answer mode"
                );
                return Verdict::Incorrect(IncorrectReason::UnsupportedMode(raw.clone()));
            }
        };

        if matched {
            Verdict::Correct
        } else {
            Verdict::Incorrect(IncorrectReason::WrongAnswer)
        }
    }
}

fn grade_single_choice(len: usize, correct: usize, text: &str) -> Verdict {
    let Some(index) = parse_index(text) else {
        return Verdict::Incorrect(IncorrectReason::InvalidSubmission);
    };
    if index >= len {
        return Verdict::Incorrect(IncorrectReason::IndexOutOfRange { index, len });
    }
    if index == correct {
        Verdict::Correct
    } else {
        Verdict::Incorrect(IncorrectReason::WrongAnswer)
    }
}

fn grade_multiple_choice(len: usize, correct: &[usize], items: &[String]) -> Verdict {
    let mut submitted = Vec::with_capacity(items.len());
    for item in items {
        let Some(index) = parse_index(item) else {
            return Verdict::Incorrect(IncorrectReason::InvalidSubmission);
        };
        if index >= len {
            return Verdict::Incorrect(IncorrectReason::IndexOutOfRange { index, len });
        }
        submitted.push(index);
    }

    // Duplicates are kept on purpose: they make the lengths differ.
    let mut expected = correct.to_vec();
    submitted.sort_unstable();
    expected.sort_unstable();

    if submitted == expected {
        Verdict::Correct
    } else {
        Verdict::Incorrect(IncorrectReason::WrongAnswer)
    }
}

/// Coerce a submitted option into an index.
///
/// Accepts plain integers and integral decimals ("1.0"). Empty text is never
/// an index, so it cannot be confused with option 0.
pub fn parse_index(text: &str) -> Option<usize> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(index) = trimmed.parse::<usize>() {
        return Some(index);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Some(value as usize)
    } else {
        None
    }
}
