//! Quiz session state machine.
//!
//! A [`QuizSession`] walks a learner through the ordered questions of one
//! lesson: it keeps the current index, the pending answer and a status per
//! question, grades on request, and on the last question decides pass/fail
//! and talks to the progress store and the navigator.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::SessionError;
use crate::grader::{Grader, Verdict};
use crate::model::{LessonContext, Question, QuestionStatus, QuestionType, Quiz, Submission};
use crate::statistics::{QuizStats, DEFAULT_PASS_THRESHOLD};
use crate::traits::{ExpressionEngine, Navigator, ProgressStore};

/// Tunables for a quiz session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fraction of correct answers that must be exceeded to pass.
    pub pass_threshold: f64,
    /// Clear the pending answer after checking an open question. Choice
    /// answers are always kept.
    pub clear_open_answer_after_check: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            clear_open_answer_after_check: true,
        }
    }
}

/// Result of [`QuizSession::check_answer`].
#[derive(Debug)]
pub struct CheckOutcome {
    pub question_id: String,
    pub verdict: Verdict,
    pub status: QuestionStatus,
    /// The "record correct answer" task, spawned only for correct answers.
    /// Dropping the handle detaches the task; awaiting it is optional.
    pub notification: Option<JoinHandle<()>>,
}

/// What [`QuizSession::handle_next`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Moved to the question at `index`.
    Advanced { index: usize },
    /// The quiz was passed, the lesson marked complete and the navigator
    /// sent to `next_url`.
    LessonCompleted { next_url: String },
    /// The quiz was not passed; the navigator was asked to reload.
    RetryRequired,
}

/// Serializable view of the session for a UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub lesson_id: String,
    /// `None` when no questions are loaded.
    pub current_index: Option<usize>,
    pub current_question_id: Option<String>,
    pub current_status: Option<QuestionStatus>,
    pub is_answered: bool,
    pub show_hint: bool,
    pub history: Vec<QuestionStatus>,
    pub stats: QuizStats,
}

/// Mutable state over one ordered sequence of questions.
pub struct QuizSession<E> {
    id: Uuid,
    lesson: LessonContext,
    questions: Vec<Question>,
    current_index: usize,
    history: Vec<QuestionStatus>,
    pending: Submission,
    show_hint: bool,
    grader: Grader<E>,
    progress: Arc<dyn ProgressStore>,
    navigator: Arc<dyn Navigator>,
    config: SessionConfig,
}

impl<E: ExpressionEngine> QuizSession<E> {
    /// Create a session from a snapshot of already-correct question ids.
    ///
    /// `completed` is `None` for anonymous learners.
    pub fn new(
        quiz: Quiz,
        completed: Option<&HashSet<String>>,
        grader: Grader<E>,
        progress: Arc<dyn ProgressStore>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let is_done = |q: &Question| completed.is_some_and(|ids| ids.contains(&q.id));

        let current_index = quiz
            .questions
            .iter()
            .position(|q| !is_done(q))
            .unwrap_or(0);
        let history: Vec<QuestionStatus> = quiz
            .questions
            .iter()
            .map(|q| {
                if is_done(q) {
                    QuestionStatus::Correct
                } else {
                    QuestionStatus::Unanswered
                }
            })
            .collect();
        let pending = quiz
            .questions
            .get(current_index)
            .map(Question::empty_submission)
            .unwrap_or_default();

        let id = Uuid::new_v4();
        tracing::debug!(
            session_id = %id,
            lesson_id = %quiz.lesson.lesson_id,
            questions = quiz.questions.len(),
            current_index,
            "quiz session created"
        );

        Self {
            id,
            lesson: quiz.lesson,
            questions: quiz.questions,
            current_index,
            history,
            pending,
            show_hint: false,
            grader,
            progress,
            navigator,
            config,
        }
    }

    /// Create a session, asking the progress store which questions the
    /// learner already answered correctly.
    ///
    /// A failed lookup is logged and the session starts from scratch.
    pub async fn start(
        quiz: Quiz,
        grader: Grader<E>,
        progress: Arc<dyn ProgressStore>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let question_ids: Vec<String> = quiz.questions.iter().map(|q| q.id.clone()).collect();
        let completed = if question_ids.is_empty() {
            None
        } else {
            match progress.completed_question_ids(&question_ids).await {
                Ok(completed) => completed,
                Err(e) => {
                    tracing::warn!(
                        lesson_id = %quiz.lesson.lesson_id,
                        "failed to load completed questions: {e:#}"
                    );
                    None
                }
            }
        };
        Self::new(quiz, completed.as_ref(), grader, progress, navigator, config)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson(&self) -> &LessonContext {
        &self.lesson
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn grader(&self) -> &Grader<E> {
        &self.grader
    }

    /// `true` when the quiz has no questions ("no questions loaded").
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_status(&self) -> Option<QuestionStatus> {
        self.history.get(self.current_index).copied()
    }

    pub fn is_answered(&self) -> bool {
        self.current_status().is_some_and(QuestionStatus::is_answered)
    }

    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index == self.questions.len() - 1
    }

    pub fn history(&self) -> &[QuestionStatus] {
        &self.history
    }

    pub fn pending_answer(&self) -> &Submission {
        &self.pending
    }

    pub fn show_hint(&self) -> bool {
        self.show_hint
    }

    pub fn set_show_hint(&mut self, visible: bool) {
        self.show_hint = visible;
    }

    pub fn stats(&self) -> QuizStats {
        QuizStats::from_history(&self.history, self.config.pass_threshold)
    }

    /// Jump to question `index`, answered or not.
    pub fn set_current_index(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.move_to(index);
        Ok(())
    }

    /// Replace the pending answer. Validation happens at check time.
    pub fn handle_answer_change(&mut self, value: impl Into<Submission>) {
        self.pending = value.into();
    }

    /// Grade the pending answer for the current question.
    ///
    /// Overwrites any earlier status for the question. A correct answer
    /// spawns a detached task that records it in the progress store; its
    /// failure is logged and does not affect the result.
    pub fn check_answer(&mut self) -> Result<CheckOutcome, SessionError> {
        let Some(question) = self.questions.get(self.current_index) else {
            return Err(SessionError::NoQuestions);
        };

        let verdict = self.grader.grade(question, &self.pending);
        let status = verdict.status();
        let question_id = question.id.clone();
        let question_type = question.question_type();

        self.history[self.current_index] = status;
        match verdict.reason() {
            None => tracing::info!(session_id = %self.id, %question_id, "answer correct"),
            Some(reason) => {
                tracing::info!(session_id = %self.id, %question_id, %reason, "answer incorrect")
            }
        }

        if question_type == QuestionType::Open && self.config.clear_open_answer_after_check {
            self.pending = Submission::empty_for(QuestionType::Open);
        }

        let notification = if verdict.is_correct() {
            self.notify_correct(&question_id)
        } else {
            None
        };

        Ok(CheckOutcome {
            question_id,
            verdict,
            status,
            notification,
        })
    }

    /// Advance to the next question, or finish the quiz on the last one.
    ///
    /// On the last question a passed quiz awaits the lesson completion call
    /// before navigating. If that call fails nothing changes and the error is
    /// returned so the caller can offer a retry. A failed quiz asks the
    /// navigator to reload and never marks the lesson complete.
    pub async fn handle_next(&mut self) -> Result<NextStep, SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        if !self.is_last_question() {
            let index = self.current_index + 1;
            self.move_to(index);
            return Ok(NextStep::Advanced { index });
        }

        let stats = self.stats();
        if !stats.is_passed {
            tracing::info!(
                session_id = %self.id,
                correct = stats.correct_count,
                total = stats.total,
                "quiz not passed, reloading"
            );
            self.navigator.reload();
            return Ok(NextStep::RetryRequired);
        }

        if let Err(source) = self.progress.complete_lesson(&self.lesson).await {
            tracing::error!(
                session_id = %self.id,
                lesson_id = %self.lesson.lesson_id,
                "failed to complete lesson: {source:#}"
            );
            return Err(SessionError::Completion {
                lesson_id: self.lesson.lesson_id.clone(),
                source,
            });
        }

        tracing::info!(
            session_id = %self.id,
            lesson_id = %self.lesson.lesson_id,
            correct = stats.correct_count,
            total = stats.total,
            "lesson completed"
        );
        let next_url = self.lesson.next_url.clone();
        self.navigator.navigate_to(&next_url);
        Ok(NextStep::LessonCompleted { next_url })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let current = self.current_question();
        SessionSnapshot {
            session_id: self.id,
            lesson_id: self.lesson.lesson_id.clone(),
            current_index: current.map(|_| self.current_index),
            current_question_id: current.map(|q| q.id.clone()),
            current_status: self.current_status(),
            is_answered: self.is_answered(),
            show_hint: self.show_hint,
            history: self.history.clone(),
            stats: self.stats(),
        }
    }

    fn move_to(&mut self, index: usize) {
        self.current_index = index;
        self.pending = self.questions[index].empty_submission();
        self.show_hint = false;
    }

    fn notify_correct(&self, question_id: &str) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                session_id = %self.id,
                question_id,
                "no async runtime, correct answer not recorded"
            );
            return None;
        };

        let store = Arc::clone(&self.progress);
        let session_id = self.id;
        let question_id = question_id.to_string();
        Some(runtime.spawn(async move {
            match store.record_correct_answer(&question_id).await {
                Ok(()) => tracing::debug!(%session_id, %question_id, "correct answer recorded"),
                Err(e) => {
                    tracing::error!(%session_id, %question_id, "failed to record answer: {e:#}")
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader::IncorrectReason;
    use crate::mock::{MockProgressStore, RecordingNavigator, TableEngine};
    use crate::model::{AnswerKey, AnswerMode};

    fn open_q(id: &str, correct: &str) -> Question {
        Question {
            id: id.into(),
            prompt: "Solve 2x = 10".into(),
            answer: AnswerKey::Open {
                correct: Some(correct.into()),
                mode: AnswerMode::SameValue,
            },
            hint: Some("Divide by 2".into()),
            explanation: Some("Simple algebra".into()),
        }
    }

    fn single_q(id: &str, correct: usize) -> Question {
        Question {
            id: id.into(),
            prompt: "What is 2+2?".into(),
            answer: AnswerKey::SingleChoice {
                options: vec!["3".into(), "4".into(), "5".into()],
                correct,
            },
            hint: None,
            explanation: None,
        }
    }

    fn multiple_q(id: &str) -> Question {
        Question {
            id: id.into(),
            prompt: "Which equal 4?".into(),
            answer: AnswerKey::MultipleChoice {
                options: vec!["2".into(), "4".into(), "8/2".into(), "5".into()],
                correct: vec![1, 2],
            },
            hint: None,
            explanation: None,
        }
    }

    fn quiz(questions: Vec<Question>) -> Quiz {
        Quiz {
            lesson: LessonContext::new("lesson-1", "math-101", "algebra", Some("next-lesson")),
            title: "Practice".into(),
            questions,
        }
    }

    struct Harness {
        session: QuizSession<TableEngine>,
        store: Arc<MockProgressStore>,
        navigator: Arc<RecordingNavigator>,
    }

    fn harness_with(
        questions: Vec<Question>,
        completed: Option<&HashSet<String>>,
        store: MockProgressStore,
    ) -> Harness {
        let store = Arc::new(store);
        let navigator = Arc::new(RecordingNavigator::new());
        let session = QuizSession::new(
            quiz(questions),
            completed,
            Grader::new(TableEngine::new()),
            store.clone(),
            navigator.clone(),
            SessionConfig::default(),
        );
        Harness {
            session,
            store,
            navigator,
        }
    }

    fn harness(questions: Vec<Question>) -> Harness {
        harness_with(questions, None, MockProgressStore::new())
    }

    fn two_questions() -> Vec<Question> {
        vec![open_q("q1", "5"), single_q("q2", 1)]
    }

    #[test]
    fn initializes_with_the_first_question() {
        let h = harness(two_questions());
        assert_eq!(h.session.current_index(), 0);
        assert_eq!(h.session.stats().correct_count, 0);
        assert_eq!(h.session.current_status(), Some(QuestionStatus::Unanswered));
        assert!(!h.session.is_answered());
        assert_eq!(h.session.pending_answer(), &Submission::Text(String::new()));
    }

    #[test]
    fn starts_at_first_uncompleted_question() {
        let done: HashSet<String> = ["q1".to_string()].into();
        let h = harness_with(two_questions(), Some(&done), MockProgressStore::new());
        assert_eq!(h.session.current_index(), 1);
        assert_eq!(
            h.session.history(),
            &[QuestionStatus::Correct, QuestionStatus::Unanswered]
        );
        assert_eq!(h.session.stats().correct_count, 1);
    }

    #[test]
    fn all_completed_starts_at_zero() {
        let done: HashSet<String> = ["q1".to_string(), "q2".to_string()].into();
        let h = harness_with(two_questions(), Some(&done), MockProgressStore::new());
        assert_eq!(h.session.current_index(), 0);
        assert!(h.session.is_answered());
    }

    #[tokio::test]
    async fn moves_to_the_next_question() {
        let mut h = harness(two_questions());
        h.session.handle_answer_change("draft");
        let step = h.session.handle_next().await.unwrap();
        assert_eq!(step, NextStep::Advanced { index: 1 });
        assert_eq!(h.session.current_question().unwrap().id, "q2");
        assert_eq!(h.session.pending_answer(), &Submission::Text(String::new()));
    }

    #[test]
    fn navigation_resets_pending_answer_and_hint() {
        let mut h = harness(vec![single_q("q1", 1), multiple_q("q2")]);
        h.session.set_show_hint(true);
        assert!(h.session.show_hint());
        h.session.handle_answer_change("2");

        h.session.set_current_index(1).unwrap();
        assert!(!h.session.show_hint());
        assert_eq!(h.session.pending_answer(), &Submission::Selection(vec![]));

        h.session.set_current_index(0).unwrap();
        assert_eq!(h.session.pending_answer(), &Submission::Text(String::new()));
    }

    #[test]
    fn set_current_index_rejects_out_of_range() {
        let mut h = harness(two_questions());
        let err = h.session.set_current_index(2).unwrap_err();
        assert!(matches!(
            err,
            SessionError::IndexOutOfRange { index: 2, len: 2 }
        ));
        assert_eq!(h.session.current_index(), 0);
    }

    #[tokio::test]
    async fn correct_answer_is_recorded() {
        let mut h = harness(two_questions());
        h.session.handle_answer_change("5");
        let outcome = h.session.check_answer().unwrap();
        assert_eq!(outcome.status, QuestionStatus::Correct);
        outcome.notification.expect("notification spawned").await.unwrap();

        assert_eq!(h.store.recorded(), vec!["q1"]);
        assert_eq!(h.session.stats().correct_count, 1);
    }

    #[tokio::test]
    async fn incorrect_answer_is_not_recorded() {
        let mut h = harness(two_questions());
        h.session.handle_answer_change("300");
        let outcome = h.session.check_answer().unwrap();
        assert_eq!(
            outcome.verdict,
            Verdict::Incorrect(IncorrectReason::WrongAnswer)
        );
        assert!(outcome.notification.is_none());
        assert_eq!(h.store.record_calls(), 0);
    }

    #[tokio::test]
    async fn notification_failure_does_not_change_verdict() {
        let store = MockProgressStore::new();
        store.set_fail_record(true);
        let mut h = harness_with(two_questions(), None, store);
        h.session.handle_answer_change("5");
        let outcome = h.session.check_answer().unwrap();
        outcome.notification.unwrap().await.unwrap();

        assert_eq!(h.store.record_calls(), 1);
        assert_eq!(h.session.current_status(), Some(QuestionStatus::Correct));
    }

    #[test]
    fn check_outside_runtime_still_grades() {
        let mut h = harness(two_questions());
        h.session.handle_answer_change("5");
        let outcome = h.session.check_answer().unwrap();
        assert!(outcome.verdict.is_correct());
        assert!(outcome.notification.is_none());
    }

    #[test]
    fn open_input_is_cleared_after_check_but_choice_is_kept() {
        let mut h = harness(vec![open_q("q1", "5"), single_q("q2", 1), multiple_q("q3")]);
        h.session.handle_answer_change("4");
        h.session.check_answer().unwrap();
        assert_eq!(h.session.pending_answer(), &Submission::Text(String::new()));

        h.session.set_current_index(1).unwrap();
        h.session.handle_answer_change("0");
        h.session.check_answer().unwrap();
        assert_eq!(h.session.pending_answer(), &Submission::from("0"));

        h.session.set_current_index(2).unwrap();
        h.session.handle_answer_change(vec!["1", "2"]);
        h.session.check_answer().unwrap();
        assert_eq!(h.session.pending_answer(), &Submission::from(vec!["1", "2"]));
    }

    #[test]
    fn open_input_can_be_kept_by_config() {
        let store = Arc::new(MockProgressStore::new());
        let mut session = QuizSession::new(
            quiz(two_questions()),
            None,
            Grader::new(TableEngine::new()),
            store,
            Arc::new(RecordingNavigator::new()),
            SessionConfig {
                clear_open_answer_after_check: false,
                ..SessionConfig::default()
            },
        );
        session.handle_answer_change("4");
        session.check_answer().unwrap();
        assert_eq!(session.pending_answer(), &Submission::from("4"));
    }

    #[test]
    fn recheck_overwrites_previous_status() {
        let mut h = harness(vec![single_q("q1", 1)]);
        h.session.handle_answer_change("0");
        assert_eq!(
            h.session.check_answer().unwrap().status,
            QuestionStatus::Incorrect
        );
        h.session.handle_answer_change("1");
        assert_eq!(
            h.session.check_answer().unwrap().status,
            QuestionStatus::Correct
        );
        h.session.handle_answer_change("2");
        h.session.check_answer().unwrap();
        assert_eq!(h.session.current_status(), Some(QuestionStatus::Incorrect));
    }

    #[tokio::test]
    async fn passing_quiz_completes_lesson_once() {
        let mut h = harness(two_questions());

        h.session.handle_answer_change("5");
        let first = h.session.check_answer().unwrap();
        h.session.handle_next().await.unwrap();
        h.session.handle_answer_change("1");
        let second = h.session.check_answer().unwrap();
        assert!(first.verdict.is_correct() && second.verdict.is_correct());

        let step = h.session.handle_next().await.unwrap();
        assert_eq!(
            step,
            NextStep::LessonCompleted {
                next_url: "/courses/math-101/algebra/next-lesson".into()
            }
        );
        assert!(h.session.stats().is_passed);
        assert_eq!(h.store.complete_calls(), 1);
        assert_eq!(h.store.completed_lessons(), vec!["lesson-1"]);
        assert_eq!(
            h.navigator.visited(),
            vec!["/courses/math-101/algebra/next-lesson"]
        );
        assert_eq!(h.navigator.reloads(), 0);
    }

    #[tokio::test]
    async fn failing_quiz_reloads_without_completing() {
        let mut h = harness(two_questions());

        h.session.handle_answer_change("4");
        h.session.check_answer().unwrap();
        h.session.handle_next().await.unwrap();
        h.session.handle_answer_change("0");
        h.session.check_answer().unwrap();

        let step = h.session.handle_next().await.unwrap();
        assert_eq!(step, NextStep::RetryRequired);
        assert!(!h.session.stats().is_passed);
        assert_eq!(h.store.complete_calls(), 0);
        assert_eq!(h.navigator.reloads(), 1);
        assert!(h.navigator.visited().is_empty());
    }

    #[tokio::test]
    async fn half_correct_is_not_a_pass() {
        let mut h = harness(two_questions());
        h.session.handle_answer_change("5");
        h.session.check_answer().unwrap();
        h.session.handle_next().await.unwrap();
        h.session.handle_answer_change("2");
        h.session.check_answer().unwrap();

        assert_eq!(
            h.session.handle_next().await.unwrap(),
            NextStep::RetryRequired
        );
    }

    #[tokio::test]
    async fn completion_failure_blocks_navigation_and_can_be_retried() {
        let store = MockProgressStore::new();
        store.set_fail_complete(true);
        let mut h = harness_with(vec![single_q("q1", 1)], None, store);
        h.session.handle_answer_change("1");
        h.session.check_answer().unwrap();

        let err = h.session.handle_next().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(h.navigator.visited().is_empty());
        assert_eq!(h.navigator.reloads(), 0);
        assert_eq!(h.session.current_status(), Some(QuestionStatus::Correct));

        h.store.set_fail_complete(false);
        let step = h.session.handle_next().await.unwrap();
        assert!(matches!(step, NextStep::LessonCompleted { .. }));
        assert_eq!(h.store.complete_calls(), 2);
        assert_eq!(h.navigator.visited().len(), 1);
    }

    #[tokio::test]
    async fn single_question_is_also_the_last() {
        let mut h = harness(vec![single_q("only", 2)]);
        assert!(h.session.is_last_question());
        h.session.handle_answer_change("2");
        h.session.check_answer().unwrap();
        let step = h.session.handle_next().await.unwrap();
        assert!(matches!(step, NextStep::LessonCompleted { .. }));
    }

    #[tokio::test]
    async fn empty_quiz_reports_no_questions() {
        let mut h = harness(vec![]);
        assert!(h.session.is_empty());
        assert!(h.session.current_question().is_none());
        assert!(matches!(
            h.session.check_answer(),
            Err(SessionError::NoQuestions)
        ));
        assert!(matches!(
            h.session.handle_next().await,
            Err(SessionError::NoQuestions)
        ));
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.current_index, None);
        assert_eq!(snapshot.current_question_id, None);
        assert!(!snapshot.stats.is_passed);
        assert_eq!(h.store.complete_calls(), 0);
    }

    #[tokio::test]
    async fn start_uses_completed_question_supplier() {
        let store: Arc<MockProgressStore> = Arc::new(MockProgressStore::with_completed(["q1"]));
        let session = QuizSession::start(
            quiz(two_questions()),
            Grader::new(TableEngine::new()),
            store,
            Arc::new(RecordingNavigator::new()),
            SessionConfig::default(),
        )
        .await;
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.history()[0], QuestionStatus::Correct);
    }

    #[tokio::test]
    async fn start_survives_lookup_failure() {
        let store = MockProgressStore::with_completed(["q1"]);
        store.set_fail_lookup(true);
        let session = QuizSession::start(
            quiz(two_questions()),
            Grader::new(TableEngine::new()),
            Arc::new(store),
            Arc::new(RecordingNavigator::new()),
            SessionConfig::default(),
        )
        .await;
        assert_eq!(session.current_index(), 0);
        assert!(session
            .history()
            .iter()
            .all(|s| *s == QuestionStatus::Unanswered));
    }

    #[test]
    fn snapshot_serializes() {
        let mut h = harness(two_questions());
        h.session.set_show_hint(true);
        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.current_question_id.as_deref(), Some("q1"));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["show_hint"], true);
        assert_eq!(json["history"][0], "unanswered");
    }
}
