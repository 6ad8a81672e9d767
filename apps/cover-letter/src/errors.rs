use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Failed to read input file '{}': {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to write output file '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Short machine-readable code, logged alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Usage(_) => "USAGE_ERROR",
            AppError::Input { .. } => "INPUT_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Llm(LlmError::Unauthorized { .. }) => "AUTH_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Output { .. } => "OUTPUT_ERROR",
        }
    }
}
