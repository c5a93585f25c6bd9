//! Test doubles for the collaborator traits.
//!
//! Used by this crate's tests and by downstream crates that exercise the
//! session without a real progress backend or expression engine.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ExpressionError;
use crate::model::LessonContext;
use crate::traits::{ExpressionEngine, Navigator, ProgressStore};

// ---------------------------------------------------------------------------
// Expression engine
// ---------------------------------------------------------------------------

/// A table-driven expression engine.
///
/// Expressions are their trimmed source text. `simplify` applies the
/// configured rewrites, so `\frac{2}{12} -> \frac{1}{6}` makes the two
/// value-equal without being structurally the same. Text with no
/// alphanumeric character (e.g. ".") fails to parse.
#[derive(Debug, Default)]
pub struct TableEngine {
    rewrites: HashMap<String, String>,
    unparseable: HashSet<String>,
    unsimplifiable: HashSet<String>,
    value_equality_disabled: bool,
    calls: Mutex<Vec<String>>,
}

impl TableEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `simplify(from)` return `to`.
    pub fn with_rewrite(mut self, from: &str, to: &str) -> Self {
        self.rewrites.insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_unparseable(mut self, text: &str) -> Self {
        self.unparseable.insert(text.to_string());
        self
    }

    pub fn with_unsimplifiable(mut self, text: &str) -> Self {
        self.unsimplifiable.insert(text.to_string());
        self
    }

    /// Make `is_value_equal` always answer `false`.
    pub fn without_value_equality(mut self) -> Self {
        self.value_equality_disabled = true;
        self
    }

    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl ExpressionEngine for TableEngine {
    type Expr = String;

    fn name(&self) -> &str {
        "table"
    }

    fn parse(&self, text: &str) -> Result<String, ExpressionError> {
        self.record("parse");
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ExpressionError::Empty);
        }
        if self.unparseable.contains(trimmed) || !trimmed.chars().any(|c| c.is_alphanumeric()) {
            return Err(ExpressionError::Parse(format!("unexpected input '{trimmed}'")));
        }
        Ok(trimmed.to_string())
    }

    fn simplify(&self, expr: &String) -> Result<String, ExpressionError> {
        self.record("simplify");
        if self.unsimplifiable.contains(expr) {
            return Err(ExpressionError::Evaluation(format!("cannot simplify '{expr}'")));
        }
        Ok(self.rewrites.get(expr).cloned().unwrap_or_else(|| expr.clone()))
    }

    fn is_structurally_same(&self, a: &String, b: &String) -> bool {
        self.record("is_structurally_same");
        a == b
    }

    fn is_value_equal(&self, a: &String, b: &String) -> bool {
        self.record("is_value_equal");
        !self.value_equality_disabled && a == b
    }
}

// ---------------------------------------------------------------------------
// Progress store
// ---------------------------------------------------------------------------

/// An in-memory progress store that counts calls and can be told to fail.
#[derive(Debug, Default)]
pub struct MockProgressStore {
    completed_ids: Option<HashSet<String>>,
    fail_record: AtomicBool,
    fail_complete: AtomicBool,
    fail_lookup: AtomicBool,
    record_calls: AtomicU32,
    complete_calls: AtomicU32,
    recorded: Mutex<Vec<String>>,
    completed_lessons: Mutex<Vec<String>>,
}

impl MockProgressStore {
    /// A store for an anonymous user.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store for a signed-in user who already answered `ids` correctly.
    pub fn with_completed<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            completed_ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn set_fail_record(&self, fail: bool) {
        self.fail_record.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_complete(&self, fail: bool) {
        self.fail_complete.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn record_calls(&self) -> u32 {
        self.record_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> u32 {
        self.complete_calls.load(Ordering::SeqCst)
    }

    /// Question ids successfully recorded, in call order.
    pub fn recorded(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clone()
    }

    /// Lesson ids successfully completed, in call order.
    pub fn completed_lessons(&self) -> Vec<String> {
        self.completed_lessons.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressStore for MockProgressStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn record_correct_answer(&self, question_id: &str) -> anyhow::Result<()> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_record.load(Ordering::SeqCst) {
            anyhow::bail!("progress store unreachable");
        }
        self.recorded.lock().unwrap().push(question_id.to_string());
        Ok(())
    }

    async fn complete_lesson(&self, lesson: &LessonContext) -> anyhow::Result<()> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_complete.load(Ordering::SeqCst) {
            anyhow::bail!("progress store unreachable");
        }
        self.completed_lessons
            .lock()
            .unwrap()
            .push(lesson.lesson_id.clone());
        Ok(())
    }

    async fn completed_question_ids(
        &self,
        question_ids: &[String],
    ) -> anyhow::Result<Option<HashSet<String>>> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            anyhow::bail!("progress store unreachable");
        }
        Ok(self.completed_ids.as_ref().map(|done| {
            question_ids
                .iter()
                .filter(|id| done.contains(*id))
                .cloned()
                .collect()
        }))
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Records navigation requests instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
    reloads: AtomicU32,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> u32 {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, url: &str) {
        self.visited.lock().unwrap().push(url.to_string());
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}
