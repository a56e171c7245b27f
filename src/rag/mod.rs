//! Retrieval-augmented answering over one video's transcript.
//!
//! The pieces run in this order per question: the [`QuestionNormalizer`]
//! cleans up the question, the [`Retriever`] pulls diverse relevant chunks
//! from the request's index, and the [`AnswerGenerator`] answers from them.

mod answer;
mod normalizer;
mod retriever;

pub use answer::AnswerGenerator;
pub use normalizer::QuestionNormalizer;
pub use retriever::{format_context, Retriever};

use crate::chunking::Chunk;

/// A grounded answer with the chunks it was generated from.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// The generated answer.
    pub answer: String,
    /// The question after normalization.
    pub question: String,
    /// Chunks handed to the model as context, in retrieval order.
    pub sources: Vec<Chunk>,
}

impl RagAnswer {
    /// Format the answer with its sources for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---");
            for (i, source) in self.sources.iter().enumerate() {
                output.push_str(&format!("\n\n[{}] {}", i + 1, preview(&source.content, 200)));
            }
        }

        output
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
