//! Retrieval traits — passage search over the chapter corpus and visual
//! search over its page images.
//!
//! Both indexes are built outside the request path and are read-only while
//! serving, so implementations only need `&self`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// Which strategy produced a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceSource {
    /// Term-frequency ranking (BM25)
    Lexical,
    /// Dense embedding similarity
    Vector,
}

/// A passage returned by a retrieval strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Corpus chunk ID
    pub id: String,

    /// The passage text
    pub content: String,

    /// Chunk metadata (page label, file name, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// The strategy that returned it
    pub source: RelevanceSource,

    /// Strategy-specific relevance score (higher is better)
    #[serde(default)]
    pub score: f32,
}

impl RetrievedPassage {
    /// The text shown to the model: content only, trimmed.
    pub fn display_content(&self) -> &str {
        self.content.trim()
    }
}

/// Join passages into one context block separated by blank lines.
pub fn context_string(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(RetrievedPassage::display_content)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A single passage retrieval strategy.
#[async_trait]
pub trait PassageRetriever: Send + Sync {
    /// Strategy name for logging (e.g., "bm25", "vector").
    fn name(&self) -> &str;

    /// Return at most `top_k` passages, best first.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedPassage>, RetrievalError>;
}

/// A ranked page match from the visual retrieval engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMatch {
    /// Page index within the chapter image set
    #[serde(alias = "pageIndex")]
    pub page_num: u32,

    pub score: f32,
}

/// Visual (page-image) retrieval engine.
#[async_trait]
pub trait VisualRetriever: Send + Sync {
    /// Return up to `top_k` page matches, best first.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<PageMatch>, RetrievalError>;
}
