mod config;
mod errors;
mod generation;
mod llm_client;

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::generator::{run, RunOptions, DEFAULT_OUTPUT_FILE};
use crate::generation::inputs::InputPaths;
use crate::llm_client::LlmClient;

const RULE_WIDTH: usize = 60;

/// Generate a personalized cover letter from a resume, a writing sample and notes.
#[derive(Parser, Debug)]
#[command(name = "cover-letter", version, long_about = None)]
struct Cli {
    /// Company name to generate the cover letter for
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    company: String,

    /// Directory containing resume_input.txt, writing_example.txt, global_notes.txt
    /// and the optional header.txt / company_research.txt
    #[arg(short = 'd', long, default_value = ".")]
    input_dir: PathBuf,

    /// File the generated letter is written to (overwritten on every run)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
}

impl Cli {
    /// The company name is trimmed once here so the banner and the prompt agree.
    fn run_options(&self) -> RunOptions {
        RunOptions {
            company: self.company.trim().to_string(),
            inputs: InputPaths::in_dir(&self.input_dir),
            output: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit here (status 2) before any config or network work.
    let cli = Cli::parse();

    let config = Config::from_env().map_err(AppError::Config)?;

    // Logs go to stderr so stdout carries only the letter and its framing.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cover_letter={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting cover-letter v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone())
        .map_err(AppError::Llm)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let options = cli.run_options();

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("COVER LETTER GENERATOR");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Generating cover letter for: {}", options.company);
    println!("{}", "=".repeat(RULE_WIDTH));

    let letter = match run(&llm, &options).await {
        Ok(letter) => letter,
        Err(e) => {
            error!(code = e.code(), "{e}");
            return Err(e.into());
        }
    };

    println!("\nGENERATED COVER LETTER:");
    println!("{}", "-".repeat(RULE_WIDTH / 3 * 2));
    println!("{letter}");
    println!("{}", "-".repeat(RULE_WIDTH / 3 * 2));
    println!("\nCover letter saved to: {}", options.output.display());

    Ok(())
}
