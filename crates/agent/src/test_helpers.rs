//! Shared test helpers for routing and handler tests.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use lumen_core::error::{ProviderError, Result, RetrievalError};
use lumen_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use lumen_core::retrieval::{
    PageMatch, PassageRetriever, RelevanceSource, RetrievedPassage, VisualRetriever,
};

use crate::mindmap::{MindmapGraph, MindmapRenderer};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Panics if more calls are made than responses
/// provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<std::result::Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<std::result::Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider answering with each text in turn.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the single message of request `n`.
    pub fn prompt(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n].messages[0].content.clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();

        if call >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                call,
                responses.len()
            );
        }

        requests.push(request);
        responses[call].clone().map(|text| make_text_response(&text))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: text.to_string(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn passage(id: &str, content: &str, source: RelevanceSource, score: f32) -> RetrievedPassage {
    RetrievedPassage {
        id: id.into(),
        content: content.into(),
        metadata: serde_json::Map::new(),
        source,
        score,
    }
}

/// Passage retriever returning a fixed list and counting calls.
pub struct StaticRetriever {
    passages: Vec<RetrievedPassage>,
    calls: AtomicUsize,
}

impl StaticRetriever {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PassageRetriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn retrieve(
        &self,
        _query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedPassage>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }
}

/// Visual retriever returning fixed matches and recording queries.
pub struct StaticVisual {
    matches: Vec<PageMatch>,
    queries: Mutex<Vec<String>>,
}

impl StaticVisual {
    pub fn page(page_num: u32) -> Self {
        Self {
            matches: vec![PageMatch {
                page_num,
                score: 0.9,
            }],
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VisualRetriever for StaticVisual {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<PageMatch>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.matches.iter().take(top_k).copied().collect())
    }
}

/// Renderer that keeps the graph instead of drawing it.
#[derive(Default)]
pub struct RecordingRenderer {
    rendered: Mutex<Vec<(usize, usize)>>,
}

impl RecordingRenderer {
    /// `(nodes, edges)` of every rendered graph.
    pub fn rendered(&self) -> Vec<(usize, usize)> {
        self.rendered.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MindmapRenderer for RecordingRenderer {
    async fn render(&self, _markup: &str, graph: &MindmapGraph) -> Result<PathBuf> {
        self.rendered
            .lock()
            .unwrap()
            .push((graph.node_count(), graph.edge_count()));
        Ok(self.image_path())
    }

    fn image_path(&self) -> PathBuf {
        PathBuf::from("mindmap.png")
    }
}
