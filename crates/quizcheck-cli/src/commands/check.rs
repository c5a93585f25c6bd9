//! The `quizcheck check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizcheck_core::model::{QuestionType, Submission};
use quizcheck_core::{parser, Grader, Verdict};
use quizcheck_math::LatexEngine;

pub fn execute(quiz_path: PathBuf, question_id: String, answers: Vec<String>) -> Result<()> {
    let quiz = parser::parse_quiz(&quiz_path)?;
    let question = quiz.question(&question_id).with_context(|| {
        format!(
            "question '{question_id}' not found in {}",
            quiz_path.display()
        )
    })?;

    let submission = to_submission(question.question_type(), answers);
    let grader = Grader::new(LatexEngine::new());

    match grader.grade(question, &submission) {
        Verdict::Correct => println!("{question_id}: correct"),
        Verdict::Incorrect(reason) => println!("{question_id}: incorrect ({reason})"),
    }

    Ok(())
}

/// Multiple-choice questions take every answer as a selected option index.
pub fn to_submission(question_type: QuestionType, mut answers: Vec<String>) -> Submission {
    if question_type == QuestionType::MultipleChoice || answers.len() > 1 {
        Submission::Selection(answers)
    } else {
        Submission::Text(answers.pop().unwrap_or_default())
    }
}
