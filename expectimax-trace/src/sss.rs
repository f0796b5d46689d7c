//! The single-successor shortcut.
//!
//! A chain with exactly one child per level carries no decision and no
//! uncertainty, so the engine may descend it directly and reuse the terminal
//! static value instead of building a sub-call per level. The descent here
//! advances the depth and quiescence budgets exactly as the full search
//! would, so the shortcut value is always the value the search would have
//! computed.

use crate::config::SearchConfig;
use crate::engine::eval::{descend_budget, is_end_point};
use crate::history::HistoryTable;
use crate::tree::{NodeId, Tree};

/// True when `node` may be collapsed by the shortcut under the given budget:
/// it is a leaf, an endpoint, or a single-child node whose child recursively
/// qualifies after the budget is advanced one level
pub fn check_sss(tree: &Tree, config: &SearchConfig, node: NodeId, depth: u32, qs: u32) -> bool {
    if !config.allow_sss {
        return false;
    }
    check_chain(tree, config, node, depth, qs)
}

fn check_chain(tree: &Tree, config: &SearchConfig, node: NodeId, depth: u32, qs: u32) -> bool {
    if tree.is_leaf(node) || is_end_point(tree, config, node, depth, qs) {
        return true;
    }
    let children = tree.children(node);
    if children.len() != 1 {
        return false;
    }
    let (depth, qs) = descend_budget(depth, qs);
    check_chain(tree, config, children[0], depth, qs)
}

/// Descend the single-child chain under `node` and return the terminal
/// static value, without constructing any sub-call
pub fn sss_value(tree: &Tree, config: &SearchConfig, node: NodeId, depth: u32, qs: u32) -> f64 {
    let (mut node, mut depth, mut qs) = (node, depth, qs);
    loop {
        if tree.is_leaf(node) || is_end_point(tree, config, node, depth, qs) {
            return tree.node(node).value;
        }
        let next = tree.children(node)[0];
        let (d, q) = descend_budget(depth, qs);
        node = next;
        depth = d;
        qs = q;
    }
}

/// The same descent purely for history bookkeeping: every chain child is its
/// level's winner and gets its count bumped, a chance link's child included.
/// Returns the formatted deltas deepest-first.
pub fn sss_history_updates(
    tree: &Tree,
    config: &SearchConfig,
    history: &mut HistoryTable,
    node: NodeId,
    depth: u32,
    qs: u32,
) -> Vec<String> {
    let (mut node, mut depth, mut qs) = (node, depth, qs);
    let mut deltas = Vec::new();
    loop {
        if tree.is_leaf(node) || is_end_point(tree, config, node, depth, qs) {
            deltas.reverse();
            return deltas;
        }
        let next = tree.children(node)[0];
        deltas.push(history.bump(tree, next));
        let (d, q) = descend_budget(depth, qs);
        node = next;
        depth = d;
        qs = q;
    }
}
