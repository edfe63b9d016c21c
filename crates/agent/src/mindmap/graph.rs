//! Mindmap tree to directed graph, and graph to DOT source.

use lumen_core::error::MindmapError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::warn;

use super::tree::{MindmapNode, MindmapTree};

/// Deepest nesting followed before building stops.
pub const MAX_DEPTH: usize = 64;

/// Most labeled nodes drawn in one mindmap.
pub const MAX_NODES: usize = 500;

/// Labeled nodes with parent → child edges. Node ids in the DOT output are
/// `label_<n>` in insertion order, so equal labels stay distinct nodes.
#[derive(Debug, Default)]
pub struct MindmapGraph {
    graph: DiGraph<String, ()>,
}

struct Builder {
    graph: DiGraph<String, ()>,
    max_depth: usize,
    max_nodes: usize,
}

impl Builder {
    /// Walk `node`, attaching labeled nodes under `anchor`. An unlabeled
    /// node hands its own `anchor` down to its children unchanged.
    fn add(
        &mut self,
        node: &MindmapNode,
        anchor: Option<NodeIndex>,
        depth: usize,
    ) -> Result<(), MindmapError> {
        if depth > self.max_depth {
            return Err(MindmapError::TooDeep {
                limit: self.max_depth,
            });
        }

        let anchor = match &node.label {
            Some(label) => {
                if self.graph.node_count() >= self.max_nodes {
                    return Err(MindmapError::TooManyNodes {
                        limit: self.max_nodes,
                    });
                }
                let idx = self.graph.add_node(label.clone());
                if let Some(parent) = anchor {
                    self.graph.add_edge(parent, idx, ());
                }
                Some(idx)
            }
            None => anchor,
        };

        for child in &node.children {
            self.add(child, anchor, depth + 1)?;
        }
        Ok(())
    }
}

impl MindmapGraph {
    pub fn from_tree(tree: &MindmapTree) -> Self {
        Self::with_limits(tree, MAX_DEPTH, MAX_NODES)
    }

    /// Build the graph. Hitting a limit stops the walk; the nodes added so
    /// far are kept.
    pub fn with_limits(tree: &MindmapTree, max_depth: usize, max_nodes: usize) -> Self {
        let mut builder = Builder {
            graph: DiGraph::new(),
            max_depth,
            max_nodes,
        };

        if let Err(e) = builder.add(&tree.root, None, 0) {
            warn!(
                error = %e,
                nodes = builder.graph.node_count(),
                "Mindmap graph incomplete, rendering partial graph"
            );
        }

        Self {
            graph: builder.graph,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Labels of nodes with no parent.
    pub fn roots(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Child labels of the first node labeled `label`, in document order.
    pub fn children_of(&self, label: &str) -> Vec<&str> {
        let Some(parent) = self.graph.node_indices().find(|&i| self.graph[i] == label) else {
            return Vec::new();
        };
        self.graph
            .edge_references()
            .filter(|e| e.source() == parent)
            .map(|e| self.graph[e.target()].as_str())
            .collect()
    }

    /// Graphviz source with the given `size` and `dpi` graph attributes.
    pub fn to_dot(&self, size: &str, dpi: u32) -> String {
        let mut dot = String::from("digraph mindmap {\n");
        dot.push_str(&format!("    graph [size=\"{}\", dpi={dpi}];\n", escape(size)));

        for idx in self.graph.node_indices() {
            dot.push_str(&format!(
                "    label_{} [label=\"{}\"];\n",
                idx.index(),
                escape(&self.graph[idx])
            ));
        }
        for edge in self.graph.edge_references() {
            dot.push_str(&format!(
                "    label_{} -> label_{};\n",
                edge.source().index(),
                edge.target().index()
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
