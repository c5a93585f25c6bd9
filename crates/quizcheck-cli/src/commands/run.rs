//! The `quizcheck run` command.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use quizcheck_core::model::QuestionStatus;
use quizcheck_core::parser;
use quizcheck_core::traits::Navigator;
use quizcheck_core::{Grader, NextStep, QuizReport, QuizSession};
use quizcheck_math::LatexEngine;
use quizcheck_progress::{create_store, load_config_from};

use super::check::to_submission;

/// Navigator that reports page transitions on the console.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate_to(&self, url: &str) {
        eprintln!("  -> {url}");
    }

    fn reload(&self) {
        eprintln!("  -> reload");
    }
}

/// Scripted answers: question ID to a string, a number or a list of
/// option indices.
pub fn load_answers(path: &Path) -> Result<HashMap<String, Vec<String>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    let table: BTreeMap<String, toml::Value> = toml::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))?;

    table
        .into_iter()
        .map(|(id, value)| {
            let answers = match value {
                toml::Value::Array(items) => items
                    .into_iter()
                    .map(scalar_to_string)
                    .collect::<Option<Vec<_>>>(),
                other => scalar_to_string(other).map(|s| vec![s]),
            }
            .with_context(|| format!("answer for '{id}' must be a string, number or list"))?;
            Ok::<_, anyhow::Error>((id, answers))
        })
        .collect()
}

fn scalar_to_string(value: toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Integer(n) => Some(n.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

pub async fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parser::parse_quiz(&quiz_path)?;
    let mut answers = load_answers(&answers_path)?;

    for w in parser::validate_quiz(&quiz) {
        eprintln!("Warning: {}", w.message);
    }

    let store = create_store(&config.progress).await?;
    let navigator = Arc::new(ConsoleNavigator);
    let grader = Grader::new(LatexEngine::new());

    eprintln!(
        "quizcheck v{}: {} ({} questions, progress: {})",
        env!("CARGO_PKG_VERSION"),
        quiz.lesson.lesson_id,
        quiz.questions.len(),
        store.name()
    );

    let mut session = QuizSession::start(
        quiz,
        grader,
        store,
        navigator,
        config.session_config(),
    )
    .await;
    anyhow::ensure!(!session.is_empty(), "quiz has no questions");

    let mut notes: HashMap<String, String> = HashMap::new();

    let outcome = loop {
        let Some(question) = session.current_question() else {
            break None;
        };
        let question_id = question.id.clone();
        let question_type = question.question_type();

        if let Some(answer) = answers.remove(&question_id) {
            session.handle_answer_change(to_submission(question_type, answer));
            let checked = session.check_answer()?;
            if let Some(reason) = checked.verdict.reason() {
                notes.insert(question_id, reason.to_string());
            }
            if let Some(notification) = checked.notification {
                // Wait so the progress store sees the answer before exit.
                if let Err(e) = notification.await {
                    tracing::warn!("answer notification task failed: {e}");
                }
            }
        } else if !session.is_answered() {
            notes.insert(question_id, "no answer given".into());
        } else {
            notes.insert(question_id, "answered in an earlier session".into());
        }

        match session.handle_next().await? {
            NextStep::Advanced { .. } => continue,
            step => break Some(step),
        }
    };

    for id in answers.keys() {
        eprintln!("Warning: answer for unknown question '{id}' ignored");
    }

    print_summary(&session, &notes);

    match outcome {
        Some(NextStep::LessonCompleted { next_url }) => {
            println!("Lesson completed. Next: {next_url}");
        }
        Some(NextStep::RetryRequired) => {
            println!("Lesson not passed. Try again.");
        }
        _ => {}
    }

    let report = QuizReport::from_session(&session);
    let output = output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;
    let path = output.join(report.file_name());
    report.save_json(&path)?;
    eprintln!("Results saved to: {}", path.display());

    Ok(())
}

fn print_summary<E: quizcheck_core::ExpressionEngine>(
    session: &QuizSession<E>,
    notes: &HashMap<String, String>,
) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Type", "Status", "Note"]);

    for (i, (question, status)) in session
        .questions()
        .iter()
        .zip(session.history())
        .enumerate()
    {
        let status_text = match status {
            QuestionStatus::Correct => "OK".to_string(),
            QuestionStatus::Incorrect => "WRONG".to_string(),
            other => other.to_string(),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&question.id),
            Cell::new(question.question_type()),
            Cell::new(status_text),
            Cell::new(notes.get(&question.id).map(String::as_str).unwrap_or("")),
        ]);
    }

    let stats = session.stats();
    println!("\n{table}");
    println!(
        "Score: {}/{} ({:.0}%) {}",
        stats.correct_count,
        stats.total,
        stats.ratio() * 100.0,
        if stats.is_passed { "PASSED" } else { "FAILED" }
    );
}
