//! quizcheck CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizcheck", version, about = "Quiz answer-evaluation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Grade a single answer
    Check {
        /// Path to quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Question ID
        #[arg(long)]
        question: String,

        /// Answer text; repeat for each selected option of a multiple-choice question
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        answer: Vec<String>,
    },

    /// Run a full quiz session with scripted answers
    Run {
        /// Path to quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// TOML file mapping question IDs to answers
        #[arg(long)]
        answers: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "quizcheck=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Check {
            quiz,
            question,
            answer,
        } => commands::check::execute(quiz, question, answer),
        Commands::Run {
            quiz,
            answers,
            config,
            output,
        } => commands::run::execute(quiz, answers, config, output).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
