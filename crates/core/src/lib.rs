//! # Lumen Core
//!
//! Domain types, traits, and error definitions for the Lumen study
//! assistant. This crate has **zero framework dependencies**; it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external capability (LLM inference, passage retrieval, visual page
//! search) is a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{ConversationHistory, ConversationTurn, Role};
pub use provider::{ImageAttachment, Provider, ProviderRequest, ProviderResponse};
pub use retrieval::{
    PageMatch, PassageRetriever, RelevanceSource, RetrievedPassage, VisualRetriever, context_string,
};
