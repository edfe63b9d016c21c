//! HTTP API gateway for Lumen.
//!
//! Exposes the turn endpoint, the rendered mindmap artifact, and a health
//! check. Conversation history is owned by the caller and sent with every
//! turn; the gateway keeps no session state.
//!
//! Built on Axum.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use lumen_agent::TurnHandler;
use lumen_core::message::{ConversationHistory, ConversationTurn};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub turns: Arc<dyn TurnHandler>,
    /// Where the mindmap renderer writes its image
    pub mindmap_path: PathBuf,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/mindmap", get(mindmap_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the turn router once (loading and, if needed, embedding the
/// corpus) before binding; a missing corpus stops startup here.
pub async fn start(config: lumen_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let turns = lumen_agent::build_turn_router(&config).await?;
    let state = Arc::new(GatewayState {
        turns: Arc::new(turns),
        mindmap_path: config.mindmap.image_path(),
    });
    let app = build_router(state, config.gateway.body_limit_bytes);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub message_history: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Error body; `detail` carries the failure message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    info!(
        prompt_len = request.prompt.len(),
        history = request.message_history.len(),
        "Chat turn received"
    );

    let mut history = ConversationHistory::from(request.message_history);
    match state.turns.handle_turn(&request.prompt, &mut history).await {
        Ok(response) => Json(ChatResponse { response }).into_response(),
        Err(e) => {
            error!(stage = e.stage(), error = %e, "Turn failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn mindmap_handler(State(state): State<SharedState>) -> Response {
    match tokio::fs::read(&state.mindmap_path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error_response(StatusCode::NOT_FOUND, "no mindmap has been rendered yet")
        }
        Err(e) => {
            error!(error = %e, path = %state.mindmap_path.display(), "Reading mindmap failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
