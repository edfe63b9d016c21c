//! The pre-built chunk corpus.
//!
//! Chunking happens offline; at startup we load the chunk file, fill in any
//! missing embeddings once through the embedding provider, and persist them
//! so the next start is a pure load.

use std::path::Path;
use std::sync::Arc;

use lumen_core::error::RetrievalError;
use lumen_core::provider::{EmbeddingRequest, Provider};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of texts sent per embedding request.
const EMBED_BATCH: usize = 32;

/// One indexed chunk of the chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub id: String,

    pub content: String,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// The whole chunk corpus, shared read-only by both indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub chunks: Vec<CorpusChunk>,
}

impl Corpus {
    pub fn new(chunks: Vec<CorpusChunk>) -> Self {
        Self { chunks }
    }

    /// Load the corpus from a JSON file. A missing or empty corpus is fatal.
    pub async fn load(path: &Path) -> Result<Self, RetrievalError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RetrievalError::CorpusMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(RetrievalError::CorpusInvalid {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let corpus: Corpus =
            serde_json::from_str(&raw).map_err(|e| RetrievalError::CorpusInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if corpus.chunks.is_empty() {
            return Err(RetrievalError::CorpusInvalid {
                path: path.to_path_buf(),
                reason: "corpus has no chunks".into(),
            });
        }

        info!(chunks = corpus.chunks.len(), path = %path.display(), "Corpus loaded");
        Ok(corpus)
    }

    /// Write the corpus (with embeddings) back to disk.
    pub async fn save(&self, path: &Path) -> Result<(), RetrievalError> {
        let json = serde_json::to_string(self).map_err(|e| RetrievalError::CorpusInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| RetrievalError::CorpusInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Number of chunks that still need an embedding.
    pub fn missing_embeddings(&self) -> usize {
        self.chunks.iter().filter(|c| c.embedding.is_none()).count()
    }

    /// Embed every chunk that has no embedding yet. Returns how many were
    /// embedded.
    pub async fn ensure_embeddings(
        &mut self,
        provider: &Arc<dyn Provider>,
        model: &str,
    ) -> Result<usize, RetrievalError> {
        let pending: Vec<usize> = self
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        for batch in pending.chunks(EMBED_BATCH) {
            let inputs = batch
                .iter()
                .map(|&i| self.chunks[i].content.clone())
                .collect::<Vec<_>>();

            let response = provider
                .embed(EmbeddingRequest {
                    model: model.to_string(),
                    inputs,
                })
                .await
                .map_err(RetrievalError::Embedding)?;

            if response.embeddings.len() != batch.len() {
                return Err(RetrievalError::Vector(format!(
                    "embedding provider returned {} vectors for {} inputs",
                    response.embeddings.len(),
                    batch.len()
                )));
            }

            for (&i, embedding) in batch.iter().zip(response.embeddings) {
                self.chunks[i].embedding = Some(embedding);
            }
            debug!(batch = batch.len(), "Embedded corpus batch");
        }

        Ok(pending.len())
    }
}
