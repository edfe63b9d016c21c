//! Long-context reordering of merged passages.
//!
//! Models attend best to the start and end of a long context, so the most
//! relevant passages are moved to the extremes and the weakest to the middle.

use std::collections::VecDeque;

use lumen_core::retrieval::RetrievedPassage;

/// How merged passages are ordered before they reach the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReorderStrategy {
    /// Highest scores at both ends, lowest in the middle
    #[default]
    LongContext,
    /// Keep merge order (lexical block then vector block)
    None,
}

impl ReorderStrategy {
    /// Parse the config value; unknown names fall back to `LongContext`.
    pub fn from_config(value: &str) -> Self {
        match value {
            "none" => ReorderStrategy::None,
            _ => ReorderStrategy::LongContext,
        }
    }

    pub fn apply(self, passages: Vec<RetrievedPassage>) -> Vec<RetrievedPassage> {
        match self {
            ReorderStrategy::LongContext => long_context_reorder(passages),
            ReorderStrategy::None => passages,
        }
    }
}

/// Sort ascending by score, then alternate: even positions go to the
/// front, odd positions to the back. The best passage ends up at one end
/// and the runner-up at the other.
///
/// The sort is stable, so equal scores keep their merge order.
pub fn long_context_reorder(mut passages: Vec<RetrievedPassage>) -> Vec<RetrievedPassage> {
    passages.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = VecDeque::with_capacity(passages.len());
    for (i, passage) in passages.into_iter().enumerate() {
        if i % 2 == 0 {
            out.push_front(passage);
        } else {
            out.push_back(passage);
        }
    }
    out.into()
}
