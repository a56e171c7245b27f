//! Transcript chunking for embedding and retrieval.
//!
//! Chunk boundaries are content-agnostic character windows over the flattened
//! transcript, nudged toward paragraph, line and word breaks when one is near.

mod recursive;

pub use recursive::RecursiveChunker;

use crate::config::ChunkingSettings;
use serde::{Deserialize, Serialize};

/// A bounded slice of transcript text used as a retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
}

impl Chunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Configuration for chunking, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length.
    pub chunk_size: usize,
    /// Maximum text carried over from one chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}
