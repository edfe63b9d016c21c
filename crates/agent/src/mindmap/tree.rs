//! Parsing generated mindmap markup.

use lumen_core::error::{Error, OutputKind, Result};

use crate::markup::strip_code_fence;

/// One element of the markup. Elements carrying a `text` attribute are
/// labeled; unlabeled elements are structural wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindmapNode {
    pub label: Option<String>,
    pub children: Vec<MindmapNode>,
}

impl MindmapNode {
    fn from_element(element: roxmltree::Node<'_, '_>) -> Self {
        let label = element
            .attribute("text")
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(String::from);

        let children = element
            .children()
            .filter(roxmltree::Node::is_element)
            .map(MindmapNode::from_element)
            .collect();

        Self { label, children }
    }

    /// Number of labeled nodes in this subtree.
    pub fn labeled_count(&self) -> usize {
        usize::from(self.label.is_some())
            + self
                .children
                .iter()
                .map(MindmapNode::labeled_count)
                .sum::<usize>()
    }
}

/// A parsed mindmap, rooted at the document element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindmapTree {
    pub root: MindmapNode,
}

impl MindmapTree {
    /// Parse model output. It must be an XML document with a declaration,
    /// optionally wrapped in a code fence.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        if !body.starts_with("<?xml") {
            return Err(malformed("output does not begin with an XML declaration"));
        }

        let doc = roxmltree::Document::parse(body).map_err(|e| malformed(&e.to_string()))?;
        Ok(Self {
            root: MindmapNode::from_element(doc.root_element()),
        })
    }
}

fn malformed(reason: &str) -> Error {
    Error::MalformedOutput {
        kind: OutputKind::Mindmap,
        reason: reason.to_string(),
    }
}
