//! Language generation capability.
//!
//! Every generation call in the pipeline is a single prompt in, plain text out.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Send `prompt` as one user message and return the reply text unchanged.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
