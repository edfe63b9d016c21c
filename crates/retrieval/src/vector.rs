//! Vector similarity search.
//!
//! Pure-Rust cosine similarity over the corpus embeddings; the query is
//! embedded through the configured embedding provider on every call.

use std::sync::Arc;

use async_trait::async_trait;
use lumen_core::error::RetrievalError;
use lumen_core::provider::{EmbeddingRequest, Provider};
use lumen_core::retrieval::{PassageRetriever, RelevanceSource, RetrievedPassage};

use crate::corpus::{Corpus, CorpusChunk};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank chunks by cosine similarity to a query embedding.
///
/// Returns passages sorted by descending similarity. Chunks without an
/// embedding are skipped.
pub fn vector_search(
    chunks: &[CorpusChunk],
    query_embedding: &[f32],
    limit: usize,
) -> Vec<RetrievedPassage> {
    let mut scored: Vec<(f32, &CorpusChunk)> = chunks
        .iter()
        .filter_map(|chunk| {
            let emb = chunk.embedding.as_ref()?;
            Some((cosine_similarity(emb, query_embedding), chunk))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, chunk)| RetrievedPassage {
            id: chunk.id.clone(),
            content: chunk.content.clone(),
            metadata: chunk.metadata.clone(),
            source: RelevanceSource::Vector,
            score,
        })
        .collect()
}

/// Dense index over the corpus.
pub struct VectorIndex {
    chunks: Vec<CorpusChunk>,
    embedder: Arc<dyn Provider>,
    model: String,
}

impl VectorIndex {
    /// Build from a corpus whose chunks are already embedded.
    pub fn new(corpus: &Corpus, embedder: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            chunks: corpus
                .chunks
                .iter()
                .filter(|c| c.embedding.is_some())
                .cloned()
                .collect(),
            embedder,
            model: model.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(RetrievalError::Embedding)?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Vector("embedding provider returned no vector".into()))
    }
}

#[async_trait]
impl PassageRetriever for VectorIndex {
    fn name(&self) -> &str {
        "vector"
    }

    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if self.chunks.is_empty() {
            return Err(RetrievalError::Vector("no embedded chunks in index".into()));
        }
        let query_embedding = self.embed_query(query).await?;
        Ok(vector_search(&self.chunks, &query_embedding, top_k))
    }
}
