//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::{Result, VidaskError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving needs the API key for every request.
    Serve,
    /// Asking needs the API key.
    Ask,
    /// Fetching a transcript talks to YouTube only.
    Transcript,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Ask => check_api_key(std::env::var("OPENAI_API_KEY").ok()),
        Operation::Transcript => Ok(()),
    }
}

/// Check that an OpenAI API key is configured.
fn check_api_key(key: Option<String>) -> Result<()> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(VidaskError::Config(
            "OPENAI_API_KEY is empty. Set it in .env or with: export OPENAI_API_KEY='sk-...'"
                .to_string(),
        )),
        None => Err(VidaskError::Config(
            "OPENAI_API_KEY not set. Set it in .env or with: export OPENAI_API_KEY='sk-...'"
                .to_string(),
        )),
    }
}
