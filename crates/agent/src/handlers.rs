//! One handler per action. Handlers that need a standalone question take
//! the already-condensed one; the router does the condensing.

use std::sync::Arc;

use lumen_core::error::{Error, RetrievalError, Result};
use lumen_core::retrieval::{RetrievedPassage, VisualRetriever, context_string};
use lumen_retrieval::{HybridRetriever, PageImageStore};
use tracing::{debug, info};

use crate::llm::LlmClient;
use crate::mindmap::{MindmapGraph, MindmapRenderer, MindmapTree};
use crate::prompts;
use crate::quiz::QuizItem;
use crate::response::MINDMAP_CONFIRMATION;

/// The services every action handler draws on.
pub struct ActionHandlers {
    llm: Arc<LlmClient>,
    retriever: Arc<HybridRetriever>,
    visual: Arc<dyn VisualRetriever>,
    visual_top_k: usize,
    images: PageImageStore,
    renderer: Arc<dyn MindmapRenderer>,
}

impl ActionHandlers {
    pub fn new(
        llm: Arc<LlmClient>,
        retriever: Arc<HybridRetriever>,
        visual: Arc<dyn VisualRetriever>,
        images: PageImageStore,
        renderer: Arc<dyn MindmapRenderer>,
    ) -> Self {
        Self {
            llm,
            retriever,
            visual,
            visual_top_k: 1,
            images,
            renderer,
        }
    }

    /// Number of page matches requested; only the best is used.
    pub fn with_visual_top_k(mut self, top_k: usize) -> Self {
        self.visual_top_k = top_k.max(1);
        self
    }

    pub fn renderer(&self) -> &Arc<dyn MindmapRenderer> {
        &self.renderer
    }

    async fn context_for(&self, question: &str) -> Result<String> {
        let passages: Vec<RetrievedPassage> = self.retriever.retrieve(question).await?;
        debug!(passages = passages.len(), "Context retrieved");
        Ok(context_string(&passages))
    }

    /// SOLVE: the raw prompt goes straight to the text model.
    pub async fn solve(&self, prompt: &str) -> Result<String> {
        self.llm.complete(prompt).await.map_err(Error::Generation)
    }

    /// RETRIEVE: passages plus the best-matching page image, answered by
    /// the vision model.
    pub async fn retrieve(&self, question: &str) -> Result<String> {
        let context = self.context_for(question).await?;

        let matches = self.visual.search(question, self.visual_top_k).await?;
        let best = matches.first().ok_or_else(|| {
            Error::Retrieval(RetrievalError::Visual("no page matched the question".into()))
        })?;
        debug!(page = best.page_num, score = best.score, "Page image selected");

        let image = self.images.load(best.page_num).await?;
        self.llm
            .complete_with_image(&prompts::retrieve_answer(question, &context), image)
            .await
            .map_err(Error::Generation)
    }

    /// MINDMAP: generate markup, parse it, render the graph. Returns the
    /// fixed confirmation rather than the artifact.
    pub async fn mindmap(&self, question: &str) -> Result<String> {
        let context = self.context_for(question).await?;
        let markup = self
            .llm
            .complete(&prompts::mindmap(question, &context))
            .await
            .map_err(Error::Generation)?;

        let tree = MindmapTree::parse(&markup)?;
        let graph = MindmapGraph::from_tree(&tree);
        let image = self.renderer.render(&markup, &graph).await?;
        info!(
            nodes = graph.node_count(),
            image = %image.display(),
            "Mindmap created"
        );

        Ok(MINDMAP_CONFIRMATION.to_string())
    }

    /// QUIZ: one validated MCQ, returned as compact JSON.
    pub async fn quiz(&self, question: &str) -> Result<String> {
        let context = self.context_for(question).await?;
        let raw = self
            .llm
            .complete(&prompts::quiz(&context, question))
            .await
            .map_err(Error::Generation)?;

        QuizItem::parse(&raw)?.to_json()
    }

    /// SIMILAR: two harder variants of the question. No retrieval.
    pub async fn similar(&self, question: &str) -> Result<String> {
        self.llm
            .complete(&prompts::similar(question))
            .await
            .map_err(Error::Generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        RecordingRenderer, SequentialMockProvider, StaticRetriever, StaticVisual, passage,
    };
    use lumen_core::error::OutputKind;
    use lumen_core::retrieval::RelevanceSource;
    use lumen_retrieval::ReorderStrategy;

    struct Fixture {
        provider: Arc<SequentialMockProvider>,
        lexical: Arc<StaticRetriever>,
        visual: Arc<StaticVisual>,
        renderer: Arc<RecordingRenderer>,
        handlers: ActionHandlers,
        _images: tempfile::TempDir,
    }

    fn fixture(responses: &[&str], page: u32) -> Fixture {
        let images = tempfile::tempdir().unwrap();
        std::fs::write(images.path().join("sound-07.jpg"), b"jpeg bytes").unwrap();

        let provider = Arc::new(SequentialMockProvider::texts(responses));
        let lexical = Arc::new(StaticRetriever::new(vec![
            passage("l1", "Resonance occurs at the natural frequency.", RelevanceSource::Lexical, 2.0),
            passage("l2", "Forced vibrations.", RelevanceSource::Lexical, 1.0),
        ]));
        let vector = Arc::new(StaticRetriever::new(vec![
            passage("v1", "  A swing pushed in rhythm.  ", RelevanceSource::Vector, 0.8),
            passage("v2", "Bridges and soldiers.", RelevanceSource::Vector, 0.7),
            passage("v3", "Never reached.", RelevanceSource::Vector, 0.1),
        ]));
        let hybrid = HybridRetriever::new(lexical.clone(), vector).with_reorder(ReorderStrategy::None);
        let visual = Arc::new(StaticVisual::page(page));
        let renderer = Arc::new(RecordingRenderer::default());

        let handlers = ActionHandlers::new(
            Arc::new(LlmClient::new(provider.clone(), "llama3", "llava")),
            Arc::new(hybrid),
            visual.clone(),
            PageImageStore::new(images.path(), "sound"),
            renderer.clone(),
        );

        Fixture {
            provider,
            lexical,
            visual,
            renderer,
            handlers,
            _images: images,
        }
    }

    #[tokio::test]
    async fn solve_sends_raw_prompt_without_retrieval() {
        let f = fixture(&["12"], 7);
        assert_eq!(f.handlers.solve("What is 5+7?").await.unwrap(), "12");
        assert_eq!(f.provider.prompt(0), "What is 5+7?");
        assert_eq!(f.lexical.calls(), 0);
    }

    #[tokio::test]
    async fn retrieve_sends_context_and_page_image() {
        let f = fixture(&["Resonance is..."], 7);
        let answer = f.handlers.retrieve("Explain resonance").await.unwrap();
        assert_eq!(answer, "Resonance is...");

        let request = &f.provider.requests()[0];
        assert_eq!(request.model, "llava");
        let message = &request.messages[0];
        assert_eq!(message.images.len(), 1);
        assert!(message.content.contains(
            "Resonance occurs at the natural frequency.\n\nForced vibrations.\n\nA swing pushed in rhythm.\n\nBridges and soldiers."
        ));
        assert!(!message.content.contains("Never reached."));
        assert_eq!(f.visual.queries(), vec!["Explain resonance"]);
    }

    #[tokio::test]
    async fn retrieve_with_missing_page_is_missing_artifact() {
        let f = fixture(&[], 12);
        let err = f.handlers.retrieve("Explain resonance").await.unwrap_err();
        match err {
            Error::MissingArtifact { path } => assert!(path.ends_with("sound-12.jpg")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn quiz_returns_validated_json() {
        let raw = r#"```json
{"question": "An echo is a...", "choices": ["refraction", "reflection", "diffraction", "absorption"], "answer": "reflection", "explanation": "Echo is reflected sound."}
```"#;
        let f = fixture(&[raw], 7);
        let json = f.handlers.quiz("Quiz me on echoes").await.unwrap();
        assert!(json.starts_with('{'));
        let item = QuizItem::parse(&json).unwrap();
        assert_eq!(item.choices.len(), 4);
        assert!(f.provider.prompt(0).contains("Here is the user query: Quiz me on echoes"));
    }

    #[tokio::test]
    async fn quiz_with_bad_answer_fails() {
        let raw = r#"{"question": "q", "choices": ["a", "b", "c", "d"], "answer": "e", "explanation": "x"}"#;
        let f = fixture(&[raw], 7);
        let err = f.handlers.quiz("quiz").await.unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedOutput {
                kind: OutputKind::Quiz,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn mindmap_renders_and_confirms() {
        let markup = r#"<?xml version="1.0" encoding="UTF-8"?>
<map text="Sound"><branches><b text="Echo"/><b text="Pitch"/></branches></map>"#;
        let f = fixture(&[markup], 7);
        let response = f.handlers.mindmap("Mindmap of sound").await.unwrap();
        assert_eq!(response, MINDMAP_CONFIRMATION);
        assert_eq!(f.renderer.rendered(), vec![(3, 2)]);
    }

    #[tokio::test]
    async fn mindmap_without_declaration_fails_before_render() {
        let f = fixture(&["Here is your mindmap: <map/>"], 7);
        let err = f.handlers.mindmap("Mindmap of sound").await.unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedOutput {
                kind: OutputKind::Mindmap,
                ..
            }
        ));
        assert!(f.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn similar_skips_retrieval() {
        let f = fixture(&["1. ...\n2. ..."], 7);
        let out = f.handlers.similar("A sound wave has f = 500 Hz").await.unwrap();
        assert_eq!(out, "1. ...\n2. ...");
        assert!(f.provider.prompt(0).contains("Here's the question: A sound wave has f = 500 Hz."));
        assert_eq!(f.lexical.calls(), 0);
    }
}
