//! The `quizcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizcheck.toml
    if std::path::Path::new("quizcheck.toml").exists() {
        println!("quizcheck.toml already exists, skipping.");
    } else {
        std::fs::write("quizcheck.toml", SAMPLE_CONFIG)?;
        println!("Created quizcheck.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    // Scripted answers for `quizcheck run`
    std::fs::create_dir_all("answers")?;
    let answers_path = std::path::Path::new("answers/example.toml");
    if answers_path.exists() {
        println!("answers/example.toml already exists, skipping.");
    } else {
        std::fs::write(answers_path, EXAMPLE_ANSWERS)?;
        println!("Created answers/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizcheck.toml to choose a progress backend");
    println!("  2. Run: quizcheck validate --quiz quizzes/example.toml");
    println!(
        "  3. Run: quizcheck run --quiz quizzes/example.toml --answers answers/example.toml"
    );

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizcheck configuration

pass_threshold = 0.5
clear_open_answer_after_check = true
output_dir = "./quizcheck-results"

[progress]
type = "local"
path = "./quizcheck-progress.json"

# Remote backend:
# [progress]
# type = "http"
# base_url = "https://your-project.supabase.co"
# api_key = "${QUIZCHECK_API_KEY}"
# access_token = "${QUIZCHECK_ACCESS_TOKEN}"
# user_id = "00000000-0000-0000-0000-000000000000"
"#;

const EXAMPLE_QUIZ: &str = r#"[lesson]
id = "example"
course = "math-101"
segment = "fractions"
title = "Example Quiz"
next_lesson = "equivalent-fractions"

[[questions]]
id = "simplify"
type = "open"
prompt = "Simplify $\\frac{2}{12}$"
correct_answer = '\frac{1}{6}'
answer_mode = "SAME_VALUE"
hint = "Divide numerator and denominator by 2"

[[questions]]
id = "half"
type = "single_choice"
prompt = "Which fraction equals $0.5$?"
options = ["$\\frac{1}{3}$", "$\\frac{1}{2}$", "$\\frac{2}{3}$"]
correct_answer = 1

[[questions]]
id = "quarters"
type = "multiple_choice"
prompt = "Which of these equal $\\frac{1}{4}$?"
options = ["$0.25$", "$\\frac{2}{8}$", "$\\frac{1}{3}$"]
correct_answer = [0, 1]
"#;

const EXAMPLE_ANSWERS: &str = r#"simplify = '\frac{2}{12}'
half = 1
quarters = [0, 1]
"#;
