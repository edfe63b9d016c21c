//! Mindmap generation: generated XML markup is parsed into a tree, turned
//! into a directed graph, and rendered to an image artifact.
//!
//! Markup that fails to parse fails the turn. Problems while building the
//! graph do not; whatever was built before the problem is rendered.

pub mod graph;
pub mod render;
pub mod tree;

pub use graph::MindmapGraph;
pub use render::{GraphvizRenderer, MindmapRenderer};
pub use tree::{MindmapNode, MindmapTree};
