//! Error types for the Lumen domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each stage of a turn has its own variant so the failing step is visible
//! in logs, even though the gateway reports every failure the same way.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Lumen operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Turn stages ---
    #[error("Classification failed: {0}")]
    Classification(#[source] ProviderError),

    #[error("Condensing the question failed: {0}")]
    Condense(#[source] ProviderError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Generation failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("Malformed {kind} output: {reason}")]
    MalformedOutput { kind: OutputKind, reason: String },

    #[error("Missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Rendering failed: {0}")]
    Render(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Infrastructure ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// The structured output a generation step was expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Quiz,
    Mindmap,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Quiz => write!(f, "quiz"),
            OutputKind::Mindmap => write!(f, "mindmap"),
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Lexical search failed: {0}")]
    Lexical(String),

    #[error("Vector search failed: {0}")]
    Vector(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("Visual page search failed: {0}")]
    Visual(String),

    #[error("Corpus not found at {}", path.display())]
    CorpusMissing { path: PathBuf },

    #[error("Corpus at {} is invalid: {reason}", path.display())]
    CorpusInvalid { path: PathBuf, reason: String },
}

/// Failures while turning a parsed mindmap into a graph. These never fail
/// a turn; the partial graph is still rendered.
#[derive(Debug, Clone, Error)]
pub enum MindmapError {
    #[error("Mindmap nesting exceeds depth {limit}")]
    TooDeep { limit: usize },

    #[error("Mindmap exceeds {limit} nodes")]
    TooManyNodes { limit: usize },
}

impl Error {
    /// Short machine-readable name of the failing stage, used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Classification(_) => "classification",
            Error::Condense(_) => "condense",
            Error::Retrieval(_) => "retrieval",
            Error::Generation(_) => "generation",
            Error::MalformedOutput { .. } => "malformed_output",
            Error::MissingArtifact { .. } => "missing_artifact",
            Error::Render(_) => "render",
            Error::Config { .. } => "config",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }
}
