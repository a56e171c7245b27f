//! Query-side retrieval against a request's index.

use crate::chunking::Chunk;
use crate::config::RetrievalSettings;
use crate::embedding::Embedder;
use crate::error::{Result, VidaskError};
use crate::vector_store::MemoryIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Picks context chunks for a question by maximal marginal relevance.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    k: usize,
    fetch_k: usize,
    lambda: f32,
}

impl Retriever {
    /// Create a retriever with `k = 3`, `fetch_k = 20`, `lambda = 0.5`.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            k: 3,
            fetch_k: 20,
            lambda: 0.5,
        }
    }

    pub fn from_settings(embedder: Arc<dyn Embedder>, settings: &RetrievalSettings) -> Self {
        Self::new(embedder)
            .with_k(settings.k)
            .with_fetch_k(settings.fetch_k)
            .with_lambda(settings.lambda)
    }

    /// Set the number of chunks returned.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the size of the nearest-neighbour candidate pool.
    pub fn with_fetch_k(mut self, fetch_k: usize) -> Self {
        self.fetch_k = fetch_k;
        self
    }

    /// Set the relevance/diversity trade-off (1.0 is pure relevance).
    pub fn with_lambda(mut self, lambda: f32) -> Self {
        self.lambda = lambda;
        self
    }

    /// Up to `k` distinct chunks for the query, most relevant first.
    #[instrument(skip(self, index), fields(indexed = index.len()))]
    pub async fn retrieve<'i>(
        &self,
        index: &'i MemoryIndex,
        query: &str,
    ) -> Result<Vec<&'i Chunk>> {
        if self.k == 0 || index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(VidaskError::into_embedding_failure)?;

        let chunks = index.max_marginal_relevance_search(
            &query_embedding,
            self.k,
            self.fetch_k,
            self.lambda,
        );
        debug!("Retrieved {} chunks", chunks.len());
        Ok(chunks)
    }
}

/// Join chunk contents with blank lines, in the given order.
pub fn format_context(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
