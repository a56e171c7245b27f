//! Recursive character splitting.
//!
//! The text is split on the coarsest separator it contains. Pieces that fit are
//! greedily merged into chunks; pieces that do not are split again with the
//! next finer separator. The empty separator splits into single characters,
//! which is the hard cut of last resort.

use super::{Chunk, ChunkingConfig};
use crate::error::{Result, VidaskError};
use std::collections::VecDeque;
use tracing::debug;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Sliding-window chunker preferring paragraph, line and word boundaries.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    config: ChunkingConfig,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a chunker. The overlap must be smaller than the chunk size.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(VidaskError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(VidaskError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }

        Ok(Self {
            config,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Split a transcript into chunks.
    ///
    /// Fails with `EmptyTranscript` when nothing but whitespace is left.
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        let chunks: Vec<Chunk> = self.split_text(text).into_iter().map(Chunk::new).collect();

        if chunks.is_empty() {
            return Err(VidaskError::EmptyTranscript);
        }

        debug!(
            "Split {} characters into {} chunks",
            text.chars().count(),
            chunks.len()
        );
        Ok(chunks)
    }

    /// Split text into trimmed, non-empty chunk strings.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let (separator, finer) = pick_separator(text, separators);

        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge_pieces(&fitting));
                fitting.clear();
            }

            if finer.is_empty() {
                chunks.extend(trimmed(piece));
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge_pieces(&fitting));
        }

        chunks
    }

    /// Greedily merge adjacent pieces, carrying a tail of at most
    /// `chunk_overlap` characters into the next chunk.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let ChunkingConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut docs = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > chunk_size && !window.is_empty() {
                docs.extend(join_window(&window));

                while total > chunk_overlap || (total > 0 && total + len > chunk_size) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        docs.extend(join_window(&window));
        docs
    }
}

/// First separator present in `text`, plus the finer separators after it.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), &separators[..0]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }
    (separators.last().map(String::as_str).unwrap_or(""), &separators[..0])
}

/// Split on `separator`, attaching each separator to the piece after it.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[last..idx]);
        last = idx;
    }
    pieces.push(&text[last..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    trimmed(&joined)
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
