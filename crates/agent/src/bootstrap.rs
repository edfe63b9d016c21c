//! Startup wiring: config in, ready [`TurnRouter`] out.

use std::sync::Arc;
use std::time::Duration;

use lumen_config::AppConfig;
use lumen_core::error::{Error, Result};
use lumen_providers::router::build_from_config;
use lumen_retrieval::{
    Bm25Index, Corpus, HttpVisualRetriever, HybridRetriever, PageImageStore, ReorderStrategy,
    VectorIndex,
};
use tracing::{info, warn};

use crate::classifier::IntentClassifier;
use crate::condenser::QueryCondenser;
use crate::handlers::ActionHandlers;
use crate::llm::LlmClient;
use crate::mindmap::GraphvizRenderer;
use crate::router::TurnRouter;

/// Build every service and the router. Fails if the corpus is missing or a
/// referenced provider cannot be resolved.
///
/// Chunks without embeddings are embedded here and the corpus is written
/// back, so later starts skip that step.
pub async fn build_turn_router(config: &AppConfig) -> Result<TurnRouter> {
    let providers = build_from_config(config);
    let text = providers.default().ok_or_else(|| Error::Config {
        message: format!("provider '{}' is not registered", config.default_provider),
    })?;
    let vision = resolve(&providers, config.vision.provider.as_deref())?;
    let embedder = resolve(&providers, config.embedding.provider.as_deref())?;

    let corpus_path = &config.retrieval.corpus_path;
    let mut corpus = Corpus::load(corpus_path).await?;
    let embedded = corpus
        .ensure_embeddings(&embedder, &config.embedding.model)
        .await?;
    if embedded > 0 {
        info!(embedded, "Embedded new corpus chunks");
        if let Err(e) = corpus.save(corpus_path).await {
            warn!(error = %e, "Could not persist corpus embeddings");
        }
    }

    let lexical = Bm25Index::with_params(&corpus, config.retrieval.bm25_k1, config.retrieval.bm25_b);
    let vector = VectorIndex::new(&corpus, embedder, config.embedding.model.clone());
    let hybrid = HybridRetriever::new(Arc::new(lexical), Arc::new(vector))
        .with_top_k(config.retrieval.lexical_top_k, config.retrieval.vector_top_k)
        .with_reorder(ReorderStrategy::from_config(&config.retrieval.reorder));

    let llm = Arc::new(
        LlmClient::new(text, &config.default_model, &config.vision.model)
            .with_vision_provider(vision)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens),
    );

    let visual = HttpVisualRetriever::with_timeout(
        &config.visual.url,
        Duration::from_secs(config.request_timeout_secs),
    );
    let handlers = ActionHandlers::new(
        llm.clone(),
        Arc::new(hybrid),
        Arc::new(visual),
        PageImageStore::new(&config.images.dir, &config.images.prefix),
        Arc::new(GraphvizRenderer::from_config(&config.mindmap)),
    )
    .with_visual_top_k(config.visual.top_k);

    info!(
        chunks = corpus.chunks.len(),
        provider = %config.default_provider,
        model = %config.default_model,
        vision_model = %config.vision.model,
        "Turn router ready"
    );

    Ok(TurnRouter::new(
        IntentClassifier::new(llm.clone()),
        QueryCondenser::new(llm),
        handlers,
    ))
}

fn resolve(
    providers: &lumen_providers::ProviderRouter,
    name: Option<&str>,
) -> Result<Arc<dyn lumen_core::Provider>> {
    providers.get_or_default(name).ok_or_else(|| Error::Config {
        message: format!("provider '{}' is not registered", name.unwrap_or("default")),
    })
}
