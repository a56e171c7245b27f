//! Configuration module for vidask.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, NormalizerPrompts, Prompts, UNKNOWN_ANSWER};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, OpenAISettings,
    PromptSettings, RetrievalSettings, ServerSettings, Settings, TranscriptSettings,
};
