//! HTTP client for the external visual page-search engine.
//!
//! The engine indexes rendered chapter pages and answers
//! `POST {base}/search` with `{"query": ..., "k": ...}` by returning a JSON
//! array of `{page_num, score}` matches, best first.

use std::time::Duration;

use async_trait::async_trait;
use lumen_core::error::RetrievalError;
use lumen_core::retrieval::{PageMatch, VisualRetriever};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

/// Visual retriever backed by an HTTP search service.
pub struct HttpVisualRetriever {
    base_url: String,
    client: reqwest::Client,
}

impl HttpVisualRetriever {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl VisualRetriever for HttpVisualRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<PageMatch>, RetrievalError> {
        let response = self
            .client
            .post(self.search_url())
            .json(&SearchRequest { query, k: top_k })
            .send()
            .await
            .map_err(|e| RetrievalError::Visual(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Visual(format!("status {status}: {body}")));
        }

        let mut matches: Vec<PageMatch> = response
            .json()
            .await
            .map_err(|e| RetrievalError::Visual(format!("invalid response: {e}")))?;
        matches.truncate(top_k);

        debug!(matches = matches.len(), "Visual search returned");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_strips_trailing_slash() {
        let retriever = HttpVisualRetriever::new("http://127.0.0.1:8001/");
        assert_eq!(retriever.search_url(), "http://127.0.0.1:8001/search");
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(SearchRequest { query: "echo", k: 1 }).unwrap();
        assert_eq!(body, serde_json::json!({"query": "echo", "k": 1}));
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_visual_error() {
        let retriever =
            HttpVisualRetriever::with_timeout("http://127.0.0.1:1", Duration::from_millis(200));
        let err = retriever.search("echo", 1).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Visual(_)));
    }
}
