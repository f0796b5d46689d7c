//! The decision tree the engine searches.
//!
//! Nodes live in an arena owned by [`Tree`] and are addressed by [`NodeId`]
//! handles, so the engine can keep identity-keyed bookkeeping (the history
//! table) without holding references into the tree. The tree is built by an
//! external editor and is strictly read-only during a trace.

use serde::Serialize;

/// Handle to a node stored in a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

/// How a node combines its children: pick the maximum, pick the minimum, or
/// take the probability-weighted average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// A maximizing decision node
    Max,
    /// A minimizing decision node
    Min,
    /// A chance node whose value is the weighted sum of its children
    Chance,
}

/// A single node of the input tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Display name, also used in trace signatures and history deltas
    pub name: String,
    /// Max, Min or Chance
    pub kind: NodeKind,
    /// Static value used whenever the node is evaluated as a leaf
    pub value: f64,
    /// Ordered children, left to right as the editor laid them out
    pub children: Vec<NodeId>,
    /// Non-owning back-reference, `None` for the root
    pub parent: Option<NodeId>,
    /// Marks a position worth extending past the depth limit
    pub quiescent: bool,
    /// Percentage weight under a chance parent (0-100).
    ///
    /// The engine never renormalizes these; the weighted sum is computed with
    /// whatever values are present.
    pub probability: f64,
    /// Preset history count seeded into the history table at trace start
    pub history: u32,
}

/// Arena holding a whole decision tree.
///
/// The builder methods are the only way to grow a tree, which keeps the
/// parent back-references consistent. Removing nodes is the editor's problem,
/// not ours.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// An empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parentless node and return its handle
    pub fn add_root(&mut self, name: impl Into<String>, kind: NodeKind, value: f64) -> NodeId {
        self.push(name.into(), kind, value, None)
    }

    /// Add a child under `parent`, appended after its existing children
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
        value: f64,
    ) -> NodeId {
        let id = self.push(name.into(), kind, value, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, name: String, kind: NodeKind, value: f64, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            kind,
            value,
            children: Vec::new(),
            parent,
            quiescent: false,
            probability: 0.0,
            history: 0,
        });
        id
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node, for the editor-side attributes (quiescent flag,
    /// probability, preset history count)
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The ordered children of `id`
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// True when `id` has no children
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].children.is_empty()
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first preorder walk of the subtree under `root`
    pub fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            // push in reverse so children come out left to right
            stack.extend(self.children(id).iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_parent_links_consistent() {
        let mut tree = Tree::new();
        let root = tree.add_root("A", NodeKind::Max, 0.0);
        let b = tree.add_child(root, "B", NodeKind::Min, 0.0);
        let c = tree.add_child(root, "C", NodeKind::Min, 0.0);
        let d = tree.add_child(b, "D", NodeKind::Max, 7.0);

        assert_eq!(tree.node(root).parent, None);
        assert_eq!(tree.node(b).parent, Some(root));
        assert_eq!(tree.node(d).parent, Some(b));
        assert_eq!(tree.children(root), &[b, c]);
        assert!(tree.is_leaf(d));
        assert!(!tree.is_leaf(root));
    }

    #[test]
    fn walk_is_preorder_left_to_right() {
        let mut tree = Tree::new();
        let root = tree.add_root("A", NodeKind::Max, 0.0);
        let b = tree.add_child(root, "B", NodeKind::Min, 0.0);
        let c = tree.add_child(root, "C", NodeKind::Min, 0.0);
        let d = tree.add_child(b, "D", NodeKind::Max, 0.0);

        assert_eq!(tree.walk(root), vec![root, b, d, c]);
    }
}
