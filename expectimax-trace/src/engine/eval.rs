//! The recursive evaluators.
//!
//! One recursion serves all four historical variants (plain vs. bounded,
//! decision vs. chance): the node kind is dispatched by pattern matching and
//! the bounding behavior comes from the [`BoundsPolicy`] the pass carries.

use crate::config::SearchConfig;
use crate::error::StructuralMismatch;
use crate::sss::{check_sss, sss_history_updates, sss_value};
use crate::trace::{format_value, Annotation, Call, Line};
use crate::tree::{NodeId, NodeKind, Tree};

use super::bounds::{BoundsPolicy, Window};
use super::Engine;

/// Advance the search budget one level: spend regular depth while any
/// remains, quiescence budget afterwards. `u32::MAX` stands for "no depth
/// limit" and is never spent.
pub(crate) fn descend_budget(depth: u32, qs: u32) -> (u32, u32) {
    if depth == u32::MAX {
        (depth, qs)
    } else if depth > 0 {
        (depth - 1, qs)
    } else {
        (0, qs.saturating_sub(1))
    }
}

/// True when the search stops at `node` under its own budget: no children,
/// or depth exhausted and no quiescence extension applies
pub(crate) fn is_end_point(
    tree: &Tree,
    config: &SearchConfig,
    node: NodeId,
    depth: u32,
    qs: u32,
) -> bool {
    if tree.is_leaf(node) {
        return true;
    }
    let extends = config.is_qs && tree.node(node).quiescent;
    depth == 0 && (!extends || qs == 0)
}

fn format_depth(depth: u32) -> String {
    if depth == u32::MAX {
        "inf".to_owned()
    } else {
        depth.to_string()
    }
}

fn names(tree: &Tree, children: &[NodeId]) -> Vec<String> {
    children.iter().map(|&id| tree.node(id).name.clone()).collect()
}

impl<'t> Engine<'t> {
    /// Evaluate a Max/Min node. `maximizing` must agree with the node's kind.
    pub(crate) fn eval_decision(
        &mut self,
        policy: &dyn BoundsPolicy,
        id: NodeId,
        depth: u32,
        qs: u32,
        maximizing: bool,
        window: Window,
    ) -> Result<(Call, f64), StructuralMismatch> {
        let tree = self.tree;
        let node = tree.node(id);
        let expected = if maximizing { NodeKind::Max } else { NodeKind::Min };
        if node.kind != expected {
            return Err(StructuralMismatch::WrongKind {
                node: id,
                expected,
                found: node.kind,
            });
        }
        if node.children.is_empty() {
            return Err(StructuralMismatch::ChildlessDecision { node: id });
        }

        let children = self.history.ordered(tree.children(id), self.config.is_ht);
        let show_bounds = self.config.is_ab && self.config.is_cp;
        let mut call = Call::default();
        call.lines.push(Line {
            signature: format!(
                "{}({}, {}, {})",
                if maximizing { "max" } else { "min" },
                node.name,
                format_depth(depth),
                qs
            ),
            open: names(tree, &children),
            bounds: show_bounds.then(|| window.label()),
            ..Default::default()
        });

        let mut alpha = window.alpha;
        let mut beta = window.beta;
        let mut best: Option<(NodeId, f64)> = None;

        for (i, &child_id) in children.iter().enumerate() {
            let (cd, cq) = descend_budget(depth, qs);
            let end_point = is_end_point(tree, &self.config, child_id, cd, cq);
            let mut line = Line::default();
            let value = self.resolve_child(
                policy,
                &mut call,
                &mut line,
                child_id,
                cd,
                cq,
                end_point,
                Window { alpha, beta },
            )?;

            // strict comparison: the first child is provisionally best and
            // ties keep the earlier child
            let (best_id, best_value) = match best {
                Some((b_id, b_v)) if (maximizing && value <= b_v) || (!maximizing && value >= b_v) => {
                    (b_id, b_v)
                }
                _ => (child_id, value),
            };
            best = Some((best_id, best_value));

            line.value = Some(value);
            line.open = names(tree, &children[i + 1..]);
            line.best = Some(format!(
                "{}={}",
                tree.node(best_id).name,
                format_value(best_value)
            ));

            if policy.decision_cut(best_value, Window { alpha, beta }, maximizing) {
                line.annotations.push(Annotation::Prune);
                if self.config.is_ab {
                    line.alpha_beta = Some((alpha, beta));
                }
                call.lines.push(line);
                break;
            }

            if maximizing {
                alpha = alpha.max(best_value);
            } else {
                beta = beta.min(best_value);
            }
            if self.config.is_ab {
                line.alpha_beta = Some((alpha, beta));
            }
            call.lines.push(line);
        }

        let (best_id, best_value) =
            best.ok_or(StructuralMismatch::ChildlessDecision { node: id })?;
        call.return_value = best_value;
        if let Some(last) = call.lines.last_mut() {
            last.boxed = true;
            if self.config.is_ht {
                last.history.push(self.history.bump(tree, best_id));
            }
        }
        Ok((call, best_value))
    }

    /// Evaluate a chance node: the probability-weighted sum of its children,
    /// with Star-1 window tightening when the policy provides it
    pub(crate) fn eval_chance(
        &mut self,
        policy: &dyn BoundsPolicy,
        id: NodeId,
        depth: u32,
        qs: u32,
        window: Window,
    ) -> Result<(Call, f64), StructuralMismatch> {
        let tree = self.tree;
        let node = tree.node(id);
        if node.kind != NodeKind::Chance {
            return Err(StructuralMismatch::WrongKind {
                node: id,
                expected: NodeKind::Chance,
                found: node.kind,
            });
        }

        let children = self.history.ordered(tree.children(id), self.config.is_ht);
        let show_bounds = self.config.is_ab && self.config.is_cp;
        let mut call = Call::default();
        call.lines.push(Line {
            signature: format!("chance({}, {}, {})", node.name, format_depth(depth), qs),
            open: names(tree, &children),
            bounds: show_bounds.then(|| window.label()),
            ..Default::default()
        });

        let mut x = 0.0;
        let mut y = 1.0;
        let mut forced = None;

        for (i, &child_id) in children.iter().enumerate() {
            let prob = tree.node(child_id).probability / 100.0;
            // the child's own mass leaves the remainder before we descend
            y -= prob;
            let child_window = policy
                .chance_child_window(window, x, y, prob)
                .unwrap_or_else(|| policy.root_window());

            let (cd, cq) = descend_budget(depth, qs);
            let end_point = is_end_point(tree, &self.config, child_id, cd, cq);
            let mut line = Line::default();
            if show_bounds {
                line.bounds = Some(child_window.label());
            }
            let value = self.resolve_child(
                policy,
                &mut call,
                &mut line,
                child_id,
                cd,
                cq,
                end_point,
                child_window,
            )?;

            x += prob * value;
            line.value = Some(value);
            line.open = names(tree, &children[i + 1..]);
            if self.config.is_ab {
                line.alpha_beta = Some((window.alpha, window.beta));
            }

            if let Some(bound) = policy.chance_cut(value, child_window, x, y) {
                // the cutting child's contribution is already folded into x;
                // no further siblings are evaluated
                forced = Some(bound);
                line.annotations.push(Annotation::ChancePrune);
                line.best = Some(format!("[{}]", format_value(bound)));
                call.lines.push(line);
                break;
            }

            line.best = Some(format!("[{}]", format_value(x)));
            call.lines.push(line);
        }

        let result = forced.unwrap_or(x);
        call.return_value = result;
        if let Some(last) = call.lines.last_mut() {
            last.boxed = true;
        }
        Ok((call, result))
    }

    /// Resolve one child's value: static value at an endpoint, the shortcut
    /// value for a single-successor chain, a full sub-call otherwise
    #[allow(clippy::too_many_arguments)]
    fn resolve_child(
        &mut self,
        policy: &dyn BoundsPolicy,
        call: &mut Call,
        line: &mut Line,
        child_id: NodeId,
        depth: u32,
        qs: u32,
        end_point: bool,
        window: Window,
    ) -> Result<f64, StructuralMismatch> {
        let tree = self.tree;
        let child = tree.node(child_id);
        if depth == 0 && self.config.is_qs && child.quiescent {
            line.annotations.push(Annotation::Quiescent);
        }

        if end_point {
            return Ok(child.value);
        }

        if check_sss(tree, &self.config, child_id, depth, qs) {
            let value = sss_value(tree, &self.config, child_id, depth, qs);
            line.annotations.push(Annotation::Sss);
            if self.config.is_ht {
                let deltas =
                    sss_history_updates(tree, &self.config, &mut self.history, child_id, depth, qs);
                line.history.extend(deltas);
            }
            if policy.flags_sss_prune(value, window) {
                line.annotations.push(Annotation::SssPrune);
            }
            return Ok(value);
        }

        let (sub, value) = match child.kind {
            NodeKind::Max => self.eval_decision(policy, child_id, depth, qs, true, window)?,
            NodeKind::Min => self.eval_decision(policy, child_id, depth, qs, false, window)?,
            NodeKind::Chance => self.eval_chance(policy, child_id, depth, qs, window)?,
        };
        line.expanded = Some(call.children.len());
        call.children.push(sub);
        Ok(value)
    }
}
