//! Error types for vidask.
//!
//! The `Display` text of the pipeline variants is exactly what the caller sees
//! in the `response` field, so keep those messages user-facing.

use thiserror::Error;

/// Library-level error type for vidask operations.
#[derive(Error, Debug)]
pub enum VidaskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcripts are disabled for this video, or no {languages} transcripts are available.")]
    TranscriptsUnavailable { video_id: String, languages: String },

    #[error("Error fetching transcript: {0}")]
    TranscriptFetch(String),

    #[error("Could not split the transcript into meaningful chunks.")]
    EmptyTranscript,

    #[error("Error embedding transcript: {0}")]
    Embedding(String),

    #[error("Error normalizing question: {0}")]
    Normalization(String),

    #[error("Error generating response: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl VidaskError {
    /// Whether this error ends a pipeline run as a normal, user-facing outcome.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            VidaskError::TranscriptsUnavailable { .. }
                | VidaskError::TranscriptFetch(_)
                | VidaskError::EmptyTranscript
                | VidaskError::Embedding(_)
                | VidaskError::Normalization(_)
                | VidaskError::Generation(_)
                | VidaskError::Timeout(_)
        )
    }

    /// Report any failure during indexing or query embedding as an embedding failure.
    pub fn into_embedding_failure(self) -> Self {
        match self {
            VidaskError::Embedding(_) => self,
            other => VidaskError::Embedding(other.to_string()),
        }
    }

    pub fn into_normalization_failure(self) -> Self {
        match self {
            VidaskError::Normalization(_) => self,
            other => VidaskError::Normalization(other.to_string()),
        }
    }

    pub fn into_generation_failure(self) -> Self {
        match self {
            VidaskError::Generation(_) => self,
            other => VidaskError::Generation(other.to_string()),
        }
    }
}

/// Result type alias for vidask operations.
pub type Result<T> = std::result::Result<T, VidaskError>;
