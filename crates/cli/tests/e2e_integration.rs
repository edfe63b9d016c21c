//! End-to-end integration tests for Lumen.
//!
//! These tests wire the real indexes, handlers, router, and gateway
//! together over an on-disk corpus and page images. Only the model
//! provider and the page-search service are scripted.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lumen_agent::{
    ActionHandlers, GraphvizRenderer, IntentClassifier, LlmClient, MINDMAP_CONFIRMATION,
    QueryCondenser, ResponseKind, TurnRouter,
};
use lumen_core::error::{Error, ProviderError, RetrievalError};
use lumen_core::message::{ConversationHistory, ConversationTurn};
use lumen_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use lumen_core::retrieval::{PageMatch, VisualRetriever};
use lumen_retrieval::{
    Bm25Index, Corpus, CorpusChunk, HybridRetriever, PageImageStore, VectorIndex,
};
use tower::ServiceExt;

// ── Scripted collaborators ───────────────────────────────────────────────

/// Terms the fake embedder counts; one dimension each plus a bias.
const VOCAB: &[&str] = &["resonance", "echo", "medium", "frequency", "vibration"];

fn embed_text(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = VOCAB
        .iter()
        .map(|term| lower.matches(term).count() as f32)
        .collect();
    v.push(0.1);
    v
}

/// Returns scripted completions in order and embeds by term counts.
struct ScriptedProvider {
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
    embed_calls: Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
            embed_calls: Mutex::new(0),
        }
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();
        if call >= responses.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                call,
                responses.len()
            );
        }
        let model = request.model.clone();
        requests.push(request);
        Ok(ProviderResponse {
            content: responses[call].clone(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        *self.embed_calls.lock().unwrap() += 1;
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| embed_text(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}

/// Page search that always points at one page and records queries.
struct FixedPage {
    page_num: u32,
    queries: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl VisualRetriever for FixedPage {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<PageMatch>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![PageMatch {
            page_num: self.page_num,
            score: 0.8,
        }]
        .into_iter()
        .take(top_k)
        .collect())
    }
}

// ── Fixture ──────────────────────────────────────────────────────────────

const CHUNKS: &[(&str, &str)] = &[
    ("c1", "Resonance occurs when a body is made to vibrate at its natural frequency."),
    ("c2", "An echo is the sound heard after reflection from a distant obstacle."),
    ("c3", "Sound needs a medium such as air, water or steel to travel."),
    ("c4", "The frequency of vibration decides the pitch of a sound."),
    ("c5", "Ultrasound is used by bats for navigation."),
];

struct Lumen {
    provider: Arc<ScriptedProvider>,
    visual: Arc<FixedPage>,
    router: TurnRouter,
    dir: tempfile::TempDir,
}

impl Lumen {
    fn mindmap_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("mindmaps")
    }
}

/// Builds a router over a real corpus file the way startup does: load,
/// embed what is missing, save, then index.
async fn lumen(responses: &[&str], dot_binary: &str) -> Lumen {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.json");
    let corpus = Corpus::new(
        CHUNKS
            .iter()
            .map(|(id, content)| CorpusChunk {
                id: id.to_string(),
                content: content.to_string(),
                metadata: serde_json::Map::new(),
                embedding: None,
            })
            .collect(),
    );
    corpus.save(&corpus_path).await.unwrap();

    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("sound-07.jpg"), b"page seven").unwrap();

    let provider = Arc::new(ScriptedProvider::new(responses));
    let dyn_provider: Arc<dyn Provider> = provider.clone();

    let mut corpus = Corpus::load(&corpus_path).await.unwrap();
    let embedded = corpus
        .ensure_embeddings(&dyn_provider, "embed-model")
        .await
        .unwrap();
    assert_eq!(embedded, CHUNKS.len());

    let hybrid = HybridRetriever::new(
        Arc::new(Bm25Index::new(&corpus)),
        Arc::new(VectorIndex::new(&corpus, dyn_provider.clone(), "embed-model")),
    );
    let visual = Arc::new(FixedPage {
        page_num: 7,
        queries: Mutex::new(Vec::new()),
    });
    let llm = Arc::new(LlmClient::new(dyn_provider, "llama3-70b-8192", "llava-v1.5-7b"));
    let renderer = GraphvizRenderer::new(dir.path().join("mindmaps")).with_dot_binary(dot_binary);

    let handlers = ActionHandlers::new(
        llm.clone(),
        Arc::new(hybrid),
        visual.clone(),
        PageImageStore::new(&images, "sound"),
        Arc::new(renderer),
    );
    let router = TurnRouter::new(
        IntentClassifier::new(llm.clone()),
        QueryCondenser::new(llm),
        handlers,
    );

    Lumen {
        provider,
        visual,
        router,
        dir,
    }
}

/// A stand-in for Graphviz that writes a fake PNG to its `-o` argument.
#[cfg(unix)]
fn fake_dot(dir: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-dot");
    std::fs::write(&path, "#!/bin/sh\nprintf 'PNG' > \"$3\"\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_solve_skips_retrieval() {
    let app = lumen(&["0", "5 + 7 = 12"], "dot").await;
    let embeds_at_start = app.provider.embed_calls();
    let mut history = ConversationHistory::new();

    let response = app.router.handle_turn("What is 5+7?", &mut history).await.unwrap();

    assert_eq!(response, "5 + 7 = 12");
    let requests = app.provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages[0].content, "What is 5+7?");
    assert_eq!(requests[1].model, "llama3-70b-8192");
    assert_eq!(app.provider.embed_calls(), embeds_at_start);
    assert!(app.visual.queries.lock().unwrap().is_empty());
    assert!(history.is_empty());
}

#[tokio::test]
async fn e2e_retrieve_answers_from_passages_and_page() {
    let app = lumen(
        &["1", "Explain resonance.", "Resonance is vibration at the natural frequency."],
        "dot",
    )
    .await;
    let mut history = ConversationHistory::new();

    let response = app
        .router
        .handle_turn("Explain resonance", &mut history)
        .await
        .unwrap();
    assert_eq!(response, "Resonance is vibration at the natural frequency.");

    let requests = app.provider.requests();
    assert_eq!(requests.len(), 3);

    let answer = &requests[2];
    assert_eq!(answer.model, "llava-v1.5-7b");
    assert_eq!(answer.messages[0].images.len(), 1);
    assert_eq!(answer.messages[0].images[0].media_type, "image/jpeg");

    // Two lexical plus two vector passages at most; the resonance chunk
    // wins both strategies and appears once per strategy.
    let prompt = &answer.messages[0].content;
    let hits: usize = CHUNKS
        .iter()
        .map(|(_, content)| prompt.matches(content).count())
        .sum();
    assert!(hits <= 4, "expected at most 4 passages, found {hits}");
    assert_eq!(prompt.matches(CHUNKS[0].1).count(), 2);

    assert_eq!(
        app.visual.queries.lock().unwrap().as_slice(),
        &["Explain resonance.".to_string()]
    );
    assert_eq!(history.last().unwrap().content, "Explain resonance.");
}

#[tokio::test]
async fn e2e_quiz_returns_renderable_item() {
    let quiz = r#"```json
{"question": "An echo is produced by?", "choices": ["Refraction of sound", "Reflection of sound", "Absorption of sound", "Diffraction of sound"], "answer": "Reflection of sound", "explanation": "An echo is sound reflected from a distant obstacle."}
```"#;
    let app = lumen(&["3", "Create a quiz question about echoes.", quiz], "dot").await;
    let mut history = ConversationHistory::new();

    let response = app
        .router
        .handle_turn("Quiz me on echoes", &mut history)
        .await
        .unwrap();

    assert!(response.starts_with('{'));
    match ResponseKind::classify(&response) {
        ResponseKind::Quiz(item) => {
            assert_eq!(item.choices.len(), 4);
            assert_eq!(item.answer_index(), Some(1));
        }
        other => panic!("expected a quiz, got {other:?}"),
    }
}

#[tokio::test]
async fn e2e_malformed_quiz_fails_turn() {
    let app = lumen(&["3", "Quiz about echoes.", "Sure! Here is a quiz..."], "dot").await;
    let mut history = ConversationHistory::new();

    let err = app
        .router
        .handle_turn("Quiz me on echoes", &mut history)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedOutput { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn e2e_mindmap_writes_artifacts() {
    let bin = tempfile::tempdir().unwrap();
    let markup = r#"<?xml version="1.0" encoding="UTF-8"?>
<mindmap>
  <node text="Sound">
    <node text="Propagation"><node text="Medium"/></node>
    <node text="Reflection"><node text="Echo"/></node>
  </node>
</mindmap>"#;
    let app = lumen(&["2", "Mindmap of sound.", markup], &fake_dot(bin.path())).await;
    let mut history = ConversationHistory::new();

    let response = app
        .router
        .handle_turn("Make a mindmap of sound", &mut history)
        .await
        .unwrap();
    assert_eq!(response, MINDMAP_CONFIRMATION);

    let dot = std::fs::read_to_string(app.mindmap_dir().join("mindmap.dot")).unwrap();
    assert!(dot.starts_with("digraph mindmap {"));
    assert_eq!(dot.matches(" -> ").count(), 4);
    assert!(app.mindmap_dir().join("mindmap.xml").exists());
    assert_eq!(
        std::fs::read(app.mindmap_dir().join("mindmap.png")).unwrap(),
        b"PNG"
    );
}

#[tokio::test]
async fn e2e_mindmap_without_graphviz_fails_turn() {
    let markup = r#"<?xml version="1.0"?><map text="Sound"><n text="Echo"/></map>"#;
    let app = lumen(&["2", "Mindmap of sound.", markup], "/nonexistent/dot").await;
    let mut history = ConversationHistory::new();

    let err = app
        .router
        .handle_turn("Make a mindmap of sound", &mut history)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Render(_)));
    // The intermediate artifacts are still written.
    assert!(app.mindmap_dir().join("mindmap.dot").exists());
}

#[tokio::test]
async fn e2e_missing_page_image_fails_turn() {
    let app = lumen(&["1", "Explain echo."], "dot").await;
    std::fs::remove_file(app.dir.path().join("images").join("sound-07.jpg")).unwrap();
    let mut history = ConversationHistory::new();

    let err = app
        .router
        .handle_turn("Explain echo", &mut history)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingArtifact { .. }));
}

#[tokio::test]
async fn e2e_gateway_chat_roundtrip() {
    let app = lumen(
        &["4", "Find the wavelength of a 500 Hz wave.", "1. ...\n2. ..."],
        "dot",
    )
    .await;
    let mindmap_path = app.mindmap_dir().join("mindmap.png");
    let provider = app.provider.clone();
    let state = Arc::new(lumen_gateway::GatewayState {
        turns: Arc::new(app.router),
        mindmap_path,
    });
    let router = lumen_gateway::build_router(state, 1024 * 1024);

    let history = vec![
        ConversationTurn::assistant("Ask anything about the chapter Sound!"),
        ConversationTurn::user("Find the wavelength of a 500 Hz wave."),
        ConversationTurn::assistant("0.68 m"),
    ];
    let body = serde_json::json!({
        "prompt": "give me similar questions",
        "message_history": history,
    });
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["response"], "1. ...\n2. ...");

    // The condenser saw the caller's history.
    let condense = &provider.requests()[1].messages[0].content;
    assert!(condense.contains("assistant: 0.68 m"));
}
