//! How a caller interprets a turn's response text.

use crate::quiz::QuizItem;

/// The exact response of a successful MINDMAP turn. Callers seeing it fetch
/// the rendered image instead of showing the text.
pub const MINDMAP_CONFIRMATION: &str = "A mindmap is created as per your request.";

/// What a response string means to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// A mindmap image is ready to fetch
    Mindmap,
    /// A quiz item to present interactively
    Quiz(QuizItem),
    /// Plain text to show as-is
    Text(String),
}

impl ResponseKind {
    /// A leading `{` marks quiz JSON; text that fails to parse as a quiz is
    /// shown as text.
    pub fn classify(response: &str) -> Self {
        if response == MINDMAP_CONFIRMATION {
            return ResponseKind::Mindmap;
        }
        if response.starts_with('{') {
            if let Ok(item) = QuizItem::parse(response) {
                return ResponseKind::Quiz(item);
            }
        }
        ResponseKind::Text(response.to_string())
    }
}
