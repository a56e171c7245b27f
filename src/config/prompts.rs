//! Prompt templates for vidask.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub normalizer: NormalizerPrompts,
    pub answer: AnswerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the two question-correction passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerPrompts {
    pub spelling: String,
    pub grammar: String,
}

impl Default for NormalizerPrompts {
    fn default() -> Self {
        Self {
            spelling: "If there are any spelling mistakes in the following sentence, correct them. Otherwise, return the sentence as is:\nSentence: {{sentence}}\nCorrected Sentence:".to_string(),
            grammar: "If there are any grammar mistakes in the following sentence, correct them. Otherwise, return the sentence as is:\nSentence: {{sentence}}\nCorrected Sentence:".to_string(),
        }
    }
}

/// Literal answer returned when the context does not contain the answer.
pub const UNKNOWN_ANSWER: &str = "I don't know based on the provided video context.";

/// Prompt for grounded answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub template: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a helpful AI assistant specialized in summarizing YouTube video content.
Answer the user's question ONLY based on the provided context from the video transcript.
If the answer cannot be found in the context, explicitly state "I don't know based on the provided video context."
Do not make up information.

Context:
{{context}}

Question: {{question}}
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let normalizer_path = custom_path.join("normalizer.toml");
            if normalizer_path.exists() {
                let content = std::fs::read_to_string(&normalizer_path)?;
                prompts.normalizer = toml::from_str(&content)?;
            }

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables in one pass.
    ///
    /// Substituted values are never re-scanned. Unknown placeholders are kept.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER_REGEX
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
