//! The `quizcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizcheck_core::parser;
use quizcheck_math::LatexEngine;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes = if quiz_path.is_dir() {
        parser::load_quiz_directory(&quiz_path)?
    } else {
        vec![parser::parse_quiz(&quiz_path)?]
    };

    let engine = LatexEngine::new();
    let mut total_warnings = 0;

    for quiz in &quizzes {
        let title = if quiz.title.is_empty() {
            &quiz.lesson.lesson_id
        } else {
            &quiz.title
        };
        println!("Quiz: {title} ({} questions)", quiz.questions.len());

        let mut warnings = parser::validate_quiz(quiz);
        warnings.extend(parser::validate_canonical_answers(quiz, &engine));
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
