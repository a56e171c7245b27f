//! Two-pass question clean-up before retrieval.

use crate::config::Prompts;
use crate::error::{Result, VidaskError};
use crate::generation::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Corrects spelling, then grammar, of a user question with the chat model.
pub struct QuestionNormalizer {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl QuestionNormalizer {
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts) -> Self {
        Self { generator, prompts }
    }

    /// Run the spelling pass, then the grammar pass on its output.
    ///
    /// A failure in either pass fails the whole normalization.
    #[instrument(skip(self))]
    pub async fn normalize(&self, question: &str) -> Result<String> {
        let spelled = self
            .correct(&self.prompts.normalizer.spelling, question)
            .await?;
        let normalized = self
            .correct(&self.prompts.normalizer.grammar, &spelled)
            .await?;

        debug!(normalized = %normalized, "Normalized question");
        Ok(normalized)
    }

    async fn correct(&self, template: &str, sentence: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("sentence".to_string(), sentence.to_string());
        let prompt = self.prompts.render_with_custom(template, &vars);

        let corrected = self
            .generator
            .generate(&prompt)
            .await
            .map_err(VidaskError::into_normalization_failure)?;
        Ok(corrected.trim().to_string())
    }
}
