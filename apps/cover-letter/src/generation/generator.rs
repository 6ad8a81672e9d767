//! Cover Letter Generation — orchestrates the single linear run.
//!
//! Flow: load_inputs → build_prompt → TextGenerator::generate (exactly once) →
//!       write output artifact.
//!
//! The output file is only replaced after the service has returned a letter. The
//! letter is staged in a temp file beside the target and renamed over it, so a
//! failed run never leaves a partial or truncated artifact behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::inputs::{load_inputs, CoverLetterInputs, InputPaths};
use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, NO_HEADER, NO_NOTES, NO_RESEARCH,
};
use crate::llm_client::TextGenerator;

/// Default output artifact, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "generated_cover_letter.txt";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Everything one invocation needs besides the generator itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub company: String,
    pub inputs: InputPaths,
    pub output: PathBuf,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full generation flow and returns the letter that was written.
pub async fn run(generator: &dyn TextGenerator, options: &RunOptions) -> Result<String, AppError> {
    let inputs = load_inputs(&options.inputs, &options.company).await?;
    let letter = generate_cover_letter(generator, &inputs).await?;
    write_cover_letter(&options.output, &letter).await?;
    Ok(letter)
}

/// Builds the prompt and makes the one generation call.
pub async fn generate_cover_letter(
    generator: &dyn TextGenerator,
    inputs: &CoverLetterInputs,
) -> Result<String, AppError> {
    let prompt = build_prompt(inputs);
    info!(
        "Generating cover letter for {} (prompt: {} chars)",
        inputs.company,
        prompt.len()
    );

    let letter = generator
        .generate(&prompt, COVER_LETTER_SYSTEM)
        .await
        .map_err(|e| {
            warn!("Cover letter generation failed for {}: {e}", inputs.company);
            AppError::Llm(e)
        })?;

    Ok(letter)
}

/// Replaces the output artifact with the letter, byte for byte.
pub async fn write_cover_letter(path: &Path, letter: &str) -> Result<(), AppError> {
    let target = path.to_path_buf();
    let contents = letter.to_owned();

    tokio::task::spawn_blocking(move || replace_file(&target, contents.as_bytes()))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        .and_then(|written| written)
        .map_err(|source| AppError::Output {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Cover letter written to {}", path.display());
    Ok(())
}

/// Writes `contents` to a temp file in the target's directory, then renames it
/// over the target. The temp file is removed if any step fails.
fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Assembles the prompt. Pure and deterministic for identical inputs.
pub fn build_prompt(inputs: &CoverLetterInputs) -> String {
    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("resume", inputs.resume.as_str()),
            ("writing_example", inputs.writing_example.as_str()),
            (
                "company_research",
                or_fallback(&inputs.company_research, NO_RESEARCH),
            ),
            ("global_notes", or_fallback(&inputs.global_notes, NO_NOTES)),
            ("header", or_fallback(&inputs.header, NO_HEADER)),
            ("company", inputs.company.as_str()),
        ],
    )
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Single-pass placeholder substitution. Values are inserted verbatim, so a
/// `{company}` typed inside the resume is never expanded.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
