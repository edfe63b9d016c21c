//! Hybrid retrieval: lexical and vector search run concurrently, results
//! concatenated (lexical block first) and then reordered for long contexts.

use std::sync::Arc;

use lumen_core::error::RetrievalError;
use lumen_core::retrieval::{PassageRetriever, RetrievedPassage};
use tracing::debug;

use crate::reorder::ReorderStrategy;

/// Fuses a lexical and a vector retriever.
///
/// Passages found by both strategies are kept twice; there is no dedup.
pub struct HybridRetriever {
    lexical: Arc<dyn PassageRetriever>,
    vector: Arc<dyn PassageRetriever>,
    lexical_top_k: usize,
    vector_top_k: usize,
    reorder: ReorderStrategy,
}

impl HybridRetriever {
    pub fn new(lexical: Arc<dyn PassageRetriever>, vector: Arc<dyn PassageRetriever>) -> Self {
        Self {
            lexical,
            vector,
            lexical_top_k: 2,
            vector_top_k: 2,
            reorder: ReorderStrategy::LongContext,
        }
    }

    pub fn with_top_k(mut self, lexical_top_k: usize, vector_top_k: usize) -> Self {
        self.lexical_top_k = lexical_top_k;
        self.vector_top_k = vector_top_k;
        self
    }

    pub fn with_reorder(mut self, reorder: ReorderStrategy) -> Self {
        self.reorder = reorder;
        self
    }

    /// Upper bound on passages returned per query.
    pub fn max_results(&self) -> usize {
        self.lexical_top_k + self.vector_top_k
    }

    /// Run both strategies and merge. Either one failing fails the call.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        let (lexical, vector) = tokio::try_join!(
            self.lexical.retrieve(query, self.lexical_top_k),
            self.vector.retrieve(query, self.vector_top_k),
        )?;

        debug!(
            lexical = lexical.len(),
            vector = vector.len(),
            lexical_strategy = self.lexical.name(),
            vector_strategy = self.vector.name(),
            "Hybrid retrieval merged"
        );

        let mut merged = lexical;
        merged.truncate(self.lexical_top_k);
        merged.extend(vector.into_iter().take(self.vector_top_k));

        Ok(self.reorder.apply(merged))
    }
}
