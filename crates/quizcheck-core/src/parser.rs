//! TOML quiz parser.
//!
//! Loads quizzes from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::grader::parse_index;
use crate::model::{AnswerKey, AnswerMode, LessonContext, Question, QuestionType, Quiz};
use crate::traits::ExpressionEngine;

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    lesson: TomlLesson,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlLesson {
    id: String,
    course: String,
    segment: String,
    #[serde(default)]
    title: String,
    /// Slug of the following lesson in the segment.
    #[serde(default)]
    next_lesson: Option<String>,
    /// Explicit override of the post-completion URL.
    #[serde(default)]
    next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    question_type: String,
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: Option<toml::Value>,
    #[serde(default = "default_answer_mode")]
    answer_mode: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

fn default_answer_mode() -> String {
    "SAME_VALUE".to_string()
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut lesson = LessonContext::new(
        parsed.lesson.id,
        parsed.lesson.course,
        parsed.lesson.segment,
        parsed.lesson.next_lesson.as_deref(),
    );
    if let Some(url) = parsed.lesson.next_url {
        lesson.next_url = url;
    }

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let id = q.id;
            let question_type: QuestionType = q
                .question_type
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {id}: {e}"))?;

            let answer = match question_type {
                QuestionType::SingleChoice => AnswerKey::SingleChoice {
                    correct: single_index(q.correct_answer.as_ref())
                        .with_context(|| format!("question {id}: invalid correct_answer"))?,
                    options: q.options,
                },
                QuestionType::MultipleChoice => AnswerKey::MultipleChoice {
                    correct: index_list(q.correct_answer.as_ref())
                        .with_context(|| format!("question {id}: invalid correct_answer"))?,
                    options: q.options,
                },
                QuestionType::Open => AnswerKey::Open {
                    correct: q.correct_answer.as_ref().and_then(expression_text),
                    mode: AnswerMode::from(q.answer_mode),
                },
            };

            Ok(Question {
                id,
                prompt: q.prompt,
                answer,
                hint: q.hint,
                explanation: q.explanation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Quiz {
        lesson,
        title: parsed.lesson.title,
        questions,
    })
}

fn index_value(value: &toml::Value) -> Result<usize> {
    match value {
        toml::Value::Integer(i) => {
            usize::try_from(*i).map_err(|_| anyhow::anyhow!("index must be non-negative: {i}"))
        }
        toml::Value::String(s) => {
            parse_index(s).ok_or_else(|| anyhow::anyhow!("not an option index: '{s}'"))
        }
        other => anyhow::bail!("expected an option index, found {}", other.type_str()),
    }
}

fn single_index(value: Option<&toml::Value>) -> Result<usize> {
    let value = value.context("missing correct_answer")?;
    index_value(value)
}

fn index_list(value: Option<&toml::Value>) -> Result<Vec<usize>> {
    match value {
        None => Ok(Vec::new()),
        Some(toml::Value::Array(items)) => items.iter().map(index_value).collect(),
        Some(single) => Ok(vec![index_value(single)?]),
    }
}

/// Open answers may be written as TOML numbers for convenience.
fn expression_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        paths.push(entry?.path());
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a quiz for authoring mistakes the grader would silently mark
/// incorrect.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        let id = question.id.as_str();
        if !seen_ids.insert(id) {
            warnings.push(ValidationWarning::question(
                id,
                format!("duplicate question ID: {id}"),
            ));
        }

        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(id, "prompt is empty"));
        }

        match &question.answer {
            AnswerKey::SingleChoice { options, correct } => {
                if options.is_empty() {
                    warnings.push(ValidationWarning::question(id, "no options"));
                }
                if *correct >= options.len() {
                    warnings.push(ValidationWarning::question(
                        id,
                        format!(
                            "correct_answer index {correct} out of range for {} options",
                            options.len()
                        ),
                    ));
                }
            }
            AnswerKey::MultipleChoice { options, correct } => {
                if options.is_empty() {
                    warnings.push(ValidationWarning::question(id, "no options"));
                }
                if correct.is_empty() {
                    warnings.push(ValidationWarning::question(
                        id,
                        "empty correct_answer: only an empty selection is correct",
                    ));
                }
                let mut seen = HashSet::new();
                for index in correct {
                    if *index >= options.len() {
                        warnings.push(ValidationWarning::question(
                            id,
                            format!(
                                "correct_answer index {index} out of range for {} options",
                                options.len()
                            ),
                        ));
                    }
                    if !seen.insert(index) {
                        warnings.push(ValidationWarning::question(
                            id,
                            format!("correct_answer index {index} listed twice"),
                        ));
                    }
                }
            }
            AnswerKey::Open { correct, mode } => {
                if correct.as_deref().map_or(true, |c| c.trim().is_empty()) {
                    warnings.push(ValidationWarning::question(id, "missing canonical answer"));
                }
                if let AnswerMode::Other(raw) = mode {
                    warnings.push(ValidationWarning::question(
                        id,
                        format!("unsupported answer_mode '{raw}': answers will never be correct"),
                    ));
                }
            }
        }
    }

    warnings
}

/// Check that every canonical open answer parses and simplifies with
/// `engine`.
pub fn validate_canonical_answers<E: ExpressionEngine>(
    quiz: &Quiz,
    engine: &E,
) -> Vec<ValidationWarning> {
    quiz.questions
        .iter()
        .filter_map(|q| match &q.answer {
            AnswerKey::Open {
                correct: Some(text),
                ..
            } if !text.trim().is_empty() => engine
                .parse(text)
                .and_then(|expr| engine.simplify(&expr))
                .err()
                .map(|e| {
                    ValidationWarning::question(
                        &q.id,
                        format!("canonical answer '{text}' rejected by {}: {e}", engine.name()),
                    )
                }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::TableEngine;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[lesson]
id = "lesson-1"
course = "math-101"
segment = "algebra"
title = "Linear equations"
next_lesson = "quadratics"

[[questions]]
id = "q1"
type = "open"
prompt = "Solve $2x = 10$"
correct_answer = "5"
answer_mode = "SAME_VALUE"
hint = "Divide both sides by 2"

[[questions]]
id = "q2"
type = "single_choice"
prompt = "What is $2+2$?"
options = ["3", "4", "5"]
correct_answer = 1

[[questions]]
id = "q3"
type = "multiple_choice"
prompt = "Which equal 4?"
options = ["2", "4", "8/2", "5"]
correct_answer = ["1", 2]
explanation = "8/2 is 4"
"#;

    fn path() -> PathBuf {
        PathBuf::from("test.toml")
    }

    #[test]
    fn parse_valid_toml() {
        let quiz = parse_quiz_str(VALID_TOML, &path()).unwrap();
        assert_eq!(quiz.title, "Linear equations");
        assert_eq!(quiz.lesson.lesson_id, "lesson-1");
        assert_eq!(quiz.lesson.next_url, "/courses/math-101/algebra/quadratics");
        assert_eq!(quiz.questions.len(), 3);

        assert_eq!(
            quiz.questions[0].answer,
            AnswerKey::Open {
                correct: Some("5".into()),
                mode: AnswerMode::SameValue
            }
        );
        assert_eq!(
            quiz.questions[1].answer,
            AnswerKey::SingleChoice {
                options: vec!["3".into(), "4".into(), "5".into()],
                correct: 1
            }
        );
        match &quiz.questions[2].answer {
            AnswerKey::MultipleChoice { correct, .. } => assert_eq!(correct, &vec![1, 2]),
            other => panic!("unexpected answer key: {other:?}"),
        }
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[lesson]
id = "l"
course = "c"
segment = "s"

[[questions]]
id = "q1"
type = "open"
prompt = "Simplify"
"#;
        let quiz = parse_quiz_str(toml, &path()).unwrap();
        assert_eq!(quiz.lesson.next_url, "/courses/c/s");
        assert!(quiz.title.is_empty());
        assert_eq!(
            quiz.questions[0].answer,
            AnswerKey::Open {
                correct: None,
                mode: AnswerMode::SameValue
            }
        );
        let warnings = validate_quiz(&quiz);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("missing canonical answer")));
    }

    #[test]
    fn explicit_next_url_wins() {
        let toml = r#"
[lesson]
id = "l"
course = "c"
segment = "s"
next_lesson = "x"
next_url = "/done"
"#;
        let quiz = parse_quiz_str(toml, &path()).unwrap();
        assert_eq!(quiz.lesson.next_url, "/done");
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn numeric_open_answer_is_accepted() {
        let toml = r#"
[lesson]
id = "l"
course = "c"
segment = "s"

[[questions]]
id = "q1"
type = "open"
prompt = "2 + 3"
correct_answer = 5
"#;
        let quiz = parse_quiz_str(toml, &path()).unwrap();
        match &quiz.questions[0].answer {
            AnswerKey::Open { correct, .. } => assert_eq!(correct.as_deref(), Some("5")),
            other => panic!("unexpected answer key: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let toml = r#"
[lesson]
id = "l"
course = "c"
segment = "s"

[[questions]]
id = "q1"
type = "essay"
prompt = "Discuss"
"#;
        let err = parse_quiz_str(toml, &path()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown question type"));
    }

    #[test]
    fn negative_index_is_an_error() {
        let toml = r#"
[lesson]
id = "l"
course = "c"
segment = "s"

[[questions]]
id = "q1"
type = "single_choice"
prompt = "Pick"
options = ["a"]
correct_answer = -1
"#;
        let err = parse_quiz_str(toml, &path()).unwrap_err();
        assert!(format!("{err:#}").contains("non-negative"));
    }

    #[test]
    fn validate_reports_authoring_mistakes() {
        let toml = r#"
[lesson]
id = "l"
course = "c"
segment = "s"

[[questions]]
id = "same"
type = "single_choice"
prompt = "Pick"
options = ["a", "b"]
correct_answer = 5

[[questions]]
id = "same"
type = "multiple_choice"
prompt = "  "
options = ["a", "b"]
correct_answer = [1, 1, 7]

[[questions]]
id = "q3"
type = "open"
prompt = "Simplify"
correct_answer = "x"
answer_mode = "FUZZY"
"#;
        let quiz = parse_quiz_str(toml, &path()).unwrap();
        let warnings = validate_quiz(&quiz);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("duplicate question ID"));
        assert!(has("index 5 out of range"));
        assert!(has("index 7 out of range"));
        assert!(has("listed twice"));
        assert!(has("prompt is empty"));
        assert!(has("unsupported answer_mode 'FUZZY'"));
    }

    #[test]
    fn canonical_answers_are_checked_with_engine() {
        let quiz = parse_quiz_str(VALID_TOML, &path()).unwrap();
        let engine = TableEngine::new().with_unparseable("5");
        let warnings = validate_canonical_answers(&quiz, &engine);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].question_id.as_deref(), Some("q1"));

        assert!(validate_canonical_answers(&quiz, &TableEngine::new()).is_empty());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_str(bad, &path()).is_err());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("again.toml"), VALID_TOML).unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 2);
        assert!(quizzes.iter().all(|q| q.lesson.lesson_id == "lesson-1"));
    }

    #[test]
    fn load_directory_rejects_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(load_quiz_directory(file.path()).is_err());
    }
}
