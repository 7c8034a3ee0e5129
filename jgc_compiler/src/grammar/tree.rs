//! Index arena for annotated parse trees
//!
//! Nodes live in one vector in insertion order and reference each other
//! by `NodeId`. Parsers append nodes as productions reduce, so partially
//! built statements are already addressable and a failed statement leaves
//! no dangling references behind.

use serde::{Deserialize, Serialize};

use super::nodes::{NodeId, NodeKind};
use crate::utils::Span;

/// One node slot in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed annotated parse tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh tree with a script root, the usual starting point for one
    /// compile unit.
    pub fn with_script_root() -> (Self, NodeId) {
        let mut tree = Self::new();
        let root = tree.push(None, NodeKind::Script, Span::dummy());
        (tree, root)
    }

    /// Append a node and link it under `parent`.
    pub fn push(&mut self, parent: Option<NodeId>, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.index()].children.push(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Ids are minted by this arena, so the slot always exists.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The first node pushed, which is the script root for any tree
    /// built through [`ParseTree::with_script_root`].
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    /// Widen a node's span to also cover `span`. Reductions call this as
    /// a production grows to the right; an empty placeholder span is
    /// replaced outright.
    pub fn widen_span(&mut self, id: NodeId, span: Span) {
        let node = &mut self.nodes[id.index()];
        if node.span.is_empty() {
            node.span = span;
        } else {
            node.span = node.span.merge(span);
        }
    }

    /// Rebase spans of every node from slot `first` onward onto `base`.
    /// Statement text is parsed from an excerpt, so its nodes arrive with
    /// excerpt-local spans; block assembly translates them afterwards.
    pub fn rebase_spans_from(&mut self, first: usize, base: crate::utils::Position) {
        for node in self.nodes.iter_mut().skip(first) {
            node.span = node.span.rebased(base);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }

    /// The model invocation child of a statement, once reduced.
    pub fn scoped_model(&self, statement: NodeId) -> Option<NodeId> {
        self.children(statement)
            .iter()
            .copied()
            .find(|&child| self.kind(child).is_model())
    }

    /// All statement nodes in insertion order.
    pub fn statements(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Statement { .. }))
            .map(|(id, _)| id)
            .collect()
    }

    /// Indented outline of the whole tree, for logs and test assertions.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for (id, node) in self.iter() {
            if node.parent.is_none() {
                self.outline_into(id, 0, &mut out);
            }
        }
        out
    }

    fn outline_into(&self, id: NodeId, depth: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), self.node(id).kind);
        for &child in self.children(id) {
            self.outline_into(child, depth + 1, out);
        }
    }
}
