//! Core data model types for quizcheck.
//!
//! These are the types the grader and the session state machine operate on:
//! questions with their answer keys, learner submissions, per-question status
//! and the lesson a quiz belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The declared type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Open,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single_choice"),
            QuestionType::MultipleChoice => write!(f, "multiple_choice"),
            QuestionType::Open => write!(f, "open"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single_choice" | "single" => Ok(QuestionType::SingleChoice),
            "multiple_choice" | "multiple" => Ok(QuestionType::MultipleChoice),
            "open" => Ok(QuestionType::Open),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// How an open answer is compared against its canonical expression.
///
/// Unrecognised modes are preserved as [`AnswerMode::Other`] so that loading
/// never fails on them; the grader treats them as "not correct".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnswerMode {
    /// Mathematical equivalence after simplification.
    SameValue,
    /// Structural equivalence of the parsed forms.
    Exact,
    /// Anything else found in the data.
    Other(String),
}

impl From<String> for AnswerMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SAME_VALUE" => AnswerMode::SameValue,
            "EXACT" => AnswerMode::Exact,
            _ => AnswerMode::Other(s),
        }
    }
}

impl From<&str> for AnswerMode {
    fn from(s: &str) -> Self {
        AnswerMode::from(s.to_string())
    }
}

impl From<AnswerMode> for String {
    fn from(mode: AnswerMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerMode::SameValue => write!(f, "SAME_VALUE"),
            AnswerMode::Exact => write!(f, "EXACT"),
            AnswerMode::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// The canonical answer of a question, keyed by question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerKey {
    SingleChoice {
        options: Vec<String>,
        correct: usize,
    },
    MultipleChoice {
        options: Vec<String>,
        correct: Vec<usize>,
    },
    Open {
        /// Canonical expression; `None` is an authoring error.
        #[serde(default)]
        correct: Option<String>,
        mode: AnswerMode,
    },
}

/// A single gradable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within a lesson.
    pub id: String,
    /// Display text (markdown + math), not interpreted here.
    pub prompt: String,
    /// Options and canonical answer.
    #[serde(flatten)]
    pub answer: AnswerKey,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.answer {
            AnswerKey::SingleChoice { .. } => QuestionType::SingleChoice,
            AnswerKey::MultipleChoice { .. } => QuestionType::MultipleChoice,
            AnswerKey::Open { .. } => QuestionType::Open,
        }
    }

    /// Display options; empty for open questions.
    pub fn options(&self) -> &[String] {
        match &self.answer {
            AnswerKey::SingleChoice { options, .. } | AnswerKey::MultipleChoice { options, .. } => {
                options
            }
            AnswerKey::Open { .. } => &[],
        }
    }

    /// The empty pending answer for this question's type.
    pub fn empty_submission(&self) -> Submission {
        Submission::empty_for(self.question_type())
    }
}

/// A learner's (pending) answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submission {
    /// Free text or a single option index.
    Text(String),
    /// Option indices for multiple-choice questions.
    Selection(Vec<String>),
}

impl Submission {
    pub fn empty_for(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::MultipleChoice => Submission::Selection(Vec::new()),
            QuestionType::SingleChoice | QuestionType::Open => Submission::Text(String::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Submission::Text(text) => text.is_empty(),
            Submission::Selection(items) => items.is_empty(),
        }
    }
}

impl Default for Submission {
    fn default() -> Self {
        Submission::Text(String::new())
    }
}

impl From<&str> for Submission {
    fn from(text: &str) -> Self {
        Submission::Text(text.to_string())
    }
}

impl From<String> for Submission {
    fn from(text: String) -> Self {
        Submission::Text(text)
    }
}

impl From<Vec<String>> for Submission {
    fn from(items: Vec<String>) -> Self {
        Submission::Selection(items)
    }
}

impl From<Vec<&str>> for Submission {
    fn from(items: Vec<&str>) -> Self {
        Submission::Selection(items.into_iter().map(str::to_string).collect())
    }
}

/// Grading status of one question within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
    /// Representable for compatibility; never produced (no partial credit).
    Partial,
}

impl QuestionStatus {
    pub fn is_answered(self) -> bool {
        self != QuestionStatus::Unanswered
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionStatus::Unanswered => write!(f, "unanswered"),
            QuestionStatus::Correct => write!(f, "correct"),
            QuestionStatus::Incorrect => write!(f, "incorrect"),
            QuestionStatus::Partial => write!(f, "partial"),
        }
    }
}

/// Where a quiz lives and where the learner goes after passing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContext {
    pub lesson_id: String,
    pub course_slug: String,
    pub segment_slug: String,
    /// URL to navigate to once the lesson is completed.
    pub next_url: String,
}

impl LessonContext {
    /// Build a context whose next URL points at `next_lesson_slug`, or at the
    /// segment page when the lesson is the last one in its segment.
    pub fn new(
        lesson_id: impl Into<String>,
        course_slug: impl Into<String>,
        segment_slug: impl Into<String>,
        next_lesson_slug: Option<&str>,
    ) -> Self {
        let course_slug = course_slug.into();
        let segment_slug = segment_slug.into();
        let next_url = next_lesson_url(&course_slug, &segment_slug, next_lesson_slug);
        Self {
            lesson_id: lesson_id.into(),
            course_slug,
            segment_slug,
            next_url,
        }
    }

    /// Path of the segment's lesson list.
    pub fn segment_path(&self) -> String {
        format!("/courses/{}/{}", self.course_slug, self.segment_slug)
    }
}

/// URL of the lesson following the current one.
pub fn next_lesson_url(course_slug: &str, segment_slug: &str, next_slug: Option<&str>) -> String {
    match next_slug {
        Some(slug) => format!("/courses/{course_slug}/{segment_slug}/{slug}"),
        None => format!("/courses/{course_slug}/{segment_slug}"),
    }
}

/// An ordered set of questions attached to one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub lesson: LessonContext,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
