//! vidask - grounded question answering over YouTube transcripts
//!
//! Given a video and a question, vidask fetches the video's captions, splits
//! them into overlapping chunks, embeds them into a per-request index, cleans
//! up the question, retrieves a small diverse set of relevant chunks and asks
//! a chat model to answer from those chunks alone.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `transcript` - Caption fetching from YouTube
//! - `chunking` - Recursive character chunking
//! - `embedding` - Embedding generation
//! - `generation` - Chat-model text generation
//! - `vector_store` - In-memory index with MMR search
//! - `rag` - Question normalization, retrieval and answering
//! - `orchestrator` - Pipeline coordination
//! - `cli` - Command line and HTTP entry points
//!
//! # Example
//!
//! ```rust,no_run
//! use vidask::config::Settings;
//! use vidask::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let answer = orchestrator
//!         .respond("dQw4w9WgXcQ", "What is this video about?")
//!         .await;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod transcript;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, VidaskError};
