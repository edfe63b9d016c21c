//! Configuration loading, validation, and management for Lumen.
//!
//! Loads configuration from `~/.lumen/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reorder modes accepted by `retrieval.reorder`.
pub const REORDER_MODES: &[&str] = &["long_context", "none"];

/// The root configuration structure.
///
/// Maps directly to `~/.lumen/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model used for classification, condensing, and text generation
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per LLM response (unset = provider default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// HTTP timeout for every outbound call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Multimodal model used for retrieval answers
    #[serde(default)]
    pub vision: VisionConfig,

    /// Embedding model for the vector index
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Hybrid retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Visual page-retrieval sidecar
    #[serde(default)]
    pub visual: VisualConfig,

    /// Chapter page images
    #[serde(default)]
    pub images: ImagesConfig,

    /// Mindmap rendering
    #[serde(default)]
    pub mindmap: MindmapConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama3-70b-8192".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_request_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("vision", &self.vision)
            .field("embedding", &self.embedding)
            .field("retrieval", &self.retrieval)
            .field("visual", &self.visual)
            .field("images", &self.images)
            .field("mindmap", &self.mindmap)
            .field("gateway", &self.gateway)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Provider name; falls back to `default_provider`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default = "default_vision_model")]
    pub model: String,
}

fn default_vision_model() -> String {
    "llava-v1.5-7b-4096-preview".into()
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: default_vision_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name; falls back to `default_provider`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embedding_model() -> String {
    "BAAI/bge-large-en-v1.5".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: default_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Pre-built chunk corpus (JSON)
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    #[serde(default = "default_top_k")]
    pub lexical_top_k: usize,

    #[serde(default = "default_top_k")]
    pub vector_top_k: usize,

    /// BM25 term-frequency saturation
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,

    /// BM25 length normalization
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,

    /// Post-merge reorder: "long_context" or "none"
    #[serde(default = "default_reorder")]
    pub reorder: String,
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("sarvam_ai_index/corpus.json")
}
fn default_top_k() -> usize {
    2
}
fn default_bm25_k1() -> f32 {
    1.2
}
fn default_bm25_b() -> f32 {
    0.75
}
fn default_reorder() -> String {
    "long_context".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            lexical_top_k: default_top_k(),
            vector_top_k: default_top_k(),
            bm25_k1: default_bm25_k1(),
            bm25_b: default_bm25_b(),
            reorder: default_reorder(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    /// Base URL of the page-retrieval sidecar
    #[serde(default = "default_visual_url")]
    pub url: String,

    #[serde(default = "default_visual_top_k")]
    pub top_k: usize,
}

fn default_visual_url() -> String {
    "http://127.0.0.1:8001".into()
}
fn default_visual_top_k() -> usize {
    1
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            url: default_visual_url(),
            top_k: default_visual_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,

    /// File name prefix; pages are `<prefix>-<NN>.jpg`
    #[serde(default = "default_images_prefix")]
    pub prefix: String,
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("document_images")
}
fn default_images_prefix() -> String {
    "7261ff67-0f02-4a11-a8f8-60264af5c3cf".into()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            prefix: default_images_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindmapConfig {
    /// Directory the mindmap artifacts are written to
    #[serde(default = "default_mindmap_dir")]
    pub output_dir: PathBuf,

    /// Artifact base name (`<stem>.png`, `<stem>.dot`, `<stem>.xml`)
    #[serde(default = "default_mindmap_stem")]
    pub file_stem: String,

    /// Graphviz `dot` executable
    #[serde(default = "default_dot_binary")]
    pub dot_binary: String,

    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Graphviz `size` attribute
    #[serde(default = "default_mindmap_size")]
    pub size: String,
}

fn default_mindmap_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_mindmap_stem() -> String {
    "mindmap".into()
}
fn default_dot_binary() -> String {
    "dot".into()
}
fn default_dpi() -> u32 {
    300
}
fn default_mindmap_size() -> String {
    "10,10!".into()
}

impl Default for MindmapConfig {
    fn default() -> Self {
        Self {
            output_dir: default_mindmap_dir(),
            file_stem: default_mindmap_stem(),
            dot_binary: default_dot_binary(),
            dpi: default_dpi(),
            size: default_mindmap_size(),
        }
    }
}

impl MindmapConfig {
    /// Path of the rendered PNG.
    pub fn image_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.png", self.file_stem))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.lumen/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `LUMEN_API_KEY` (highest priority)
    /// - `GROQ_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("LUMEN_API_KEY")
                .ok()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("LUMEN_PROVIDER") {
            self.default_provider = provider;
        }

        if let Ok(model) = std::env::var("LUMEN_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lumen")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.lexical_top_k == 0 || self.retrieval.vector_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval top_k values must be > 0".into(),
            ));
        }

        if self.retrieval.bm25_k1 < 0.0 || !(0.0..=1.0).contains(&self.retrieval.bm25_b) {
            return Err(ConfigError::ValidationError(
                "bm25_k1 must be >= 0 and bm25_b must be within 0.0..=1.0".into(),
            ));
        }

        if !REORDER_MODES.contains(&self.retrieval.reorder.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.reorder must be one of {REORDER_MODES:?}, got '{}'",
                self.retrieval.reorder
            )));
        }

        if self.visual.top_k == 0 {
            return Err(ConfigError::ValidationError("visual.top_k must be > 0".into()));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: None,
            request_timeout_secs: default_request_timeout(),
            vision: VisionConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            visual: VisualConfig::default(),
            images: ImagesConfig::default(),
            mindmap: MindmapConfig::default(),
            gateway: GatewayConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
