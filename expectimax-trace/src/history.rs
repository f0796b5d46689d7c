//! The history heuristic: per-trace counters of how often each node has been
//! the winning move, used to reorder children most-promising first.

use std::cmp::Reverse;

use rustc_hash::FxHashMap;

use crate::tree::{NodeId, Tree};

/// Identity-keyed map from node to winning-move count.
///
/// Rebuilt once per trace from the preset counts stored in the tree, and kept
/// alive across iterative-deepening passes within that trace. The tree's own
/// counters are never written back.
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    counts: FxHashMap<NodeId, u32>,
}

impl HistoryTable {
    /// Build the table from the preset history counts of every node under
    /// `root`, one depth-first walk
    pub fn seed(tree: &Tree, root: NodeId) -> Self {
        let mut counts = FxHashMap::default();
        for id in tree.walk(root) {
            counts.insert(id, tree.node(id).history);
        }
        Self { counts }
    }

    /// The recorded count for `id`
    pub fn count(&self, id: NodeId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Reorder `children` by descending count when `enabled`, a no-op
    /// otherwise.
    ///
    /// The sort is stable: ties keep their original left-to-right order.
    pub fn ordered(&self, children: &[NodeId], enabled: bool) -> Vec<NodeId> {
        let mut out = children.to_vec();
        if enabled {
            out.sort_by_key(|&id| Reverse(self.count(id)));
        }
        out
    }

    /// Count one more win for `id` and return the readable `move:count`
    /// delta that goes into the trace
    pub fn bump(&mut self, tree: &Tree, id: NodeId) -> String {
        let count = self.counts.entry(id).or_insert(0);
        *count += 1;
        format!("{}:{}", tree.node(id).name, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    fn counted_tree(counts: &[(&str, u32)]) -> (Tree, NodeId, Vec<NodeId>) {
        let mut tree = Tree::new();
        let root = tree.add_root("root", NodeKind::Max, 0.0);
        let children = counts
            .iter()
            .map(|&(name, count)| {
                let id = tree.add_child(root, name, NodeKind::Min, 0.0);
                tree.node_mut(id).history = count;
                id
            })
            .collect();
        (tree, root, children)
    }

    #[test]
    fn descending_sort_is_stable() {
        let (tree, root, children) = counted_tree(&[("A", 3), ("B", 5), ("C", 5), ("D", 1)]);
        let table = HistoryTable::seed(&tree, root);

        let ordered = table.ordered(&children, true);
        let names: Vec<_> = ordered.iter().map(|&id| tree.node(id).name.as_str()).collect();
        // B before C: equal counts keep their original order
        assert_eq!(names, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn disabled_ordering_is_a_no_op() {
        let (tree, root, children) = counted_tree(&[("A", 1), ("B", 9)]);
        let table = HistoryTable::seed(&tree, root);

        assert_eq!(table.ordered(&children, false), children);
    }

    #[test]
    fn bump_formats_the_delta() {
        let mut tree = Tree::new();
        let root = tree.add_root("root", NodeKind::Max, 0.0);
        let a = tree.add_child(root, "A", NodeKind::Min, 0.0);
        tree.node_mut(a).history = 2;

        let mut table = HistoryTable::seed(&tree, root);
        assert_eq!(table.bump(&tree, a), "A:3");
        assert_eq!(table.bump(&tree, a), "A:4");
        assert_eq!(table.count(a), 4);
    }
}
