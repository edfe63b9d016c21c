//! Turn handling for Lumen.
//!
//! Every user turn follows the same path:
//!
//! 1. **Classify** the raw prompt into one [`Action`]
//! 2. **Condense** the prompt and history into a standalone question
//!    (retrieve, mindmap, quiz, and similar actions only)
//! 3. **Retrieve** passages from the hybrid index (retrieve, mindmap, quiz)
//! 4. **Generate** with the text or vision model and format per action
//!
//! [`TurnRouter`] drives the path; [`bootstrap::build_turn_router`] wires
//! it from configuration.

pub mod action;
pub mod bootstrap;
pub mod classifier;
pub mod condenser;
pub mod handlers;
pub mod llm;
pub mod markup;
pub mod mindmap;
pub mod prompts;
pub mod quiz;
pub mod response;
pub mod router;

pub use action::Action;
pub use bootstrap::build_turn_router;
pub use classifier::IntentClassifier;
pub use condenser::QueryCondenser;
pub use handlers::ActionHandlers;
pub use llm::LlmClient;
pub use mindmap::{GraphvizRenderer, MindmapGraph, MindmapRenderer, MindmapTree};
pub use quiz::QuizItem;
pub use response::{MINDMAP_CONFIRMATION, ResponseKind};
pub use router::{TurnHandler, TurnRouter};

#[cfg(test)]
pub(crate) mod test_helpers;
