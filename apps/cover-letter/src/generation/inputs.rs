//! Input loading — resolves the fixed input file names and reads their contents.
//!
//! Required files must exist and be readable. Optional files (header, company
//! research) are treated as empty when absent.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::AppError;

pub const RESUME_FILE: &str = "resume_input.txt";
pub const WRITING_EXAMPLE_FILE: &str = "writing_example.txt";
pub const GLOBAL_NOTES_FILE: &str = "global_notes.txt";
pub const HEADER_FILE: &str = "header.txt";
pub const COMPANY_RESEARCH_FILE: &str = "company_research.txt";

/// Resolved locations of every input file for one run.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub resume: PathBuf,
    pub writing_example: PathBuf,
    pub global_notes: PathBuf,
    pub header: PathBuf,
    pub company_research: PathBuf,
}

impl InputPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            resume: dir.join(RESUME_FILE),
            writing_example: dir.join(WRITING_EXAMPLE_FILE),
            global_notes: dir.join(GLOBAL_NOTES_FILE),
            header: dir.join(HEADER_FILE),
            company_research: dir.join(COMPANY_RESEARCH_FILE),
        }
    }
}

/// Everything the prompt is assembled from. Contents are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterInputs {
    pub company: String,
    pub resume: String,
    pub writing_example: String,
    pub global_notes: String,
    pub header: String,
    pub company_research: String,
}

/// Reads all input files. Fails on the first required file that is missing or unreadable.
pub async fn load_inputs(paths: &InputPaths, company: &str) -> Result<CoverLetterInputs, AppError> {
    let company = company.trim();
    if company.is_empty() {
        return Err(AppError::Usage("company name must not be empty".to_string()));
    }

    let inputs = CoverLetterInputs {
        company: company.to_string(),
        resume: read_required(&paths.resume).await?,
        writing_example: read_required(&paths.writing_example).await?,
        global_notes: read_required(&paths.global_notes).await?,
        header: read_optional(&paths.header).await?,
        company_research: read_optional(&paths.company_research).await?,
    };

    info!(
        "Loaded inputs: resume={}B, writing_example={}B, notes={}B, header={}B, research={}B",
        inputs.resume.len(),
        inputs.writing_example.len(),
        inputs.global_notes.len(),
        inputs.header.len(),
        inputs.company_research.len()
    );

    Ok(inputs)
}

async fn read_required(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map(|s| s.trim().to_string())
        .map_err(|source| AppError::Input {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_optional(path: &Path) -> Result<String, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(s.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Optional input {} not present", path.display());
            Ok(String::new())
        }
        Err(source) => Err(AppError::Input {
            path: path.to_path_buf(),
            source,
        }),
    }
}
