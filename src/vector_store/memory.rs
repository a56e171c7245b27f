//! Ephemeral in-memory index over embedded chunks.

use super::{cosine_similarity, maximal_marginal_relevance};
use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, VidaskError};
use tracing::{debug, instrument};

/// Chunks paired 1:1 with their embeddings.
///
/// Built once, read-only afterwards. The index owns its data, so it needs no
/// locking and disappears when the request that built it finishes.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
}

impl MemoryIndex {
    /// Embed every chunk and build the index.
    ///
    /// Any embedder failure is reported as an embedding failure.
    #[instrument(skip(embedder, chunks), fields(chunks = chunks.len()))]
    pub async fn build(embedder: &dyn Embedder, chunks: Vec<Chunk>) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .map_err(VidaskError::into_embedding_failure)?;

        let index = Self::from_parts(chunks, embeddings)?;
        debug!("Indexed {} chunks", index.len());
        Ok(index)
    }

    /// Build an index from precomputed embeddings.
    pub fn from_parts(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(VidaskError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }
        Ok(Self { chunks, embeddings })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Diversity-aware search: take the `fetch_k` nearest chunks, then pick
    /// `k` of them by maximal marginal relevance.
    pub fn max_marginal_relevance_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        fetch_k: usize,
        lambda: f32,
    ) -> Vec<&Chunk> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        let scores: Vec<f32> = self
            .embeddings
            .iter()
            .map(|e| cosine_similarity(query_embedding, e))
            .collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order.truncate(fetch_k.max(k));

        let candidates: Vec<&[f32]> = order.iter().map(|&i| self.embeddings[i].as_slice()).collect();

        maximal_marginal_relevance(query_embedding, &candidates, k, lambda)
            .into_iter()
            .map(|picked| &self.chunks[order[picked]])
            .collect()
    }
}
