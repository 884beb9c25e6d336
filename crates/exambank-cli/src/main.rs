//! exambank CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "exambank", version, about = "Practice-exam generation and scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new questions into the bank
    Generate {
        /// Exam type: open-book or closed-book
        #[arg(long)]
        exam_type: String,

        /// Difficulty: easy, medium, hard, test-prep
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Topic to generate questions about
        #[arg(long)]
        topic: String,

        /// Number of questions to generate
        #[arg(long, default_value = "5")]
        count: i32,

        /// Drafter name from the config (default: config's default_drafter)
        #[arg(long)]
        drafter: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// RNG seed for reproducible category picks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compose an exam from the question bank
    Compose {
        /// Exam mode: open, closed, mixed
        #[arg(long)]
        mode: String,

        /// Number of questions
        #[arg(long)]
        count: i32,

        /// Optional difficulty filter
        #[arg(long)]
        difficulty: Option<String>,

        /// Fail instead of returning a smaller exam on shortfall
        #[arg(long)]
        strict: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// RNG seed for reproducible shuffles
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Grade a JSON file of submitted answers
    Grade {
        /// Exam mode the answers were taken under: open, closed, mixed
        #[arg(long)]
        mode: String,

        /// Path to a JSON array of {question_id, selected} answers
        #[arg(long)]
        answers: PathBuf,

        /// Score the submission as a test-prep attempt
        #[arg(long)]
        test_prep: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compute recency-weighted proficiency from an attempt history
    Proficiency {
        /// Exam type: open-book or closed-book
        #[arg(long)]
        exam_type: String,

        /// Path to a JSON array of attempt records
        #[arg(long)]
        attempts: PathBuf,
    },

    /// Re-tag a bank file with estimated difficulty and category
    Tag {
        /// Path to a JSON bank file
        #[arg(long)]
        bank: PathBuf,

        /// Write the re-tagged bank back to the file
        #[arg(long)]
        write: bool,
    },

    /// Show bank composition statistics
    Stats {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exambank=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            exam_type,
            difficulty,
            topic,
            count,
            drafter,
            config,
            seed,
        } => commands::generate::execute(exam_type, difficulty, topic, count, drafter, config, seed)
            .await,
        Commands::Compose {
            mode,
            count,
            difficulty,
            strict,
            config,
            seed,
        } => commands::compose::execute(mode, count, difficulty, strict, config, seed),
        Commands::Grade {
            mode,
            answers,
            test_prep,
            config,
        } => commands::grade::execute(mode, answers, test_prep, config),
        Commands::Proficiency { exam_type, attempts } => {
            commands::proficiency::execute(exam_type, attempts)
        }
        Commands::Tag { bank, write } => commands::tag::execute(bank, write),
        Commands::Stats { config } => commands::stats::execute(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
