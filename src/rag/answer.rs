//! Grounded answer generation.

use crate::config::Prompts;
use crate::error::{Result, VidaskError};
use crate::generation::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Answers a question from retrieved transcript context only.
pub struct AnswerGenerator {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts) -> Self {
        Self { generator, prompts }
    }

    /// Render the answer prompt for `context` and `question`.
    pub fn build_prompt(&self, context: &str, question: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("question".to_string(), question.to_string());
        self.prompts
            .render_with_custom(&self.prompts.answer.template, &vars)
    }

    /// Generate the answer. The model's reply is returned as-is.
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn answer(&self, context: &str, question: &str) -> Result<String> {
        let prompt = self.build_prompt(context, question);
        let answer = self
            .generator
            .generate(&prompt)
            .await
            .map_err(VidaskError::into_generation_failure)?;

        debug!("Answer has {} characters", answer.len());
        Ok(answer)
    }
}
