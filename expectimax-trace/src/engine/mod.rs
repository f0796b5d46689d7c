//! The search engine: evaluates a decision tree under a [`SearchConfig`] and
//! records every step in a [`Trace`].
//!
//! [`Engine::trace`] is the entry point. It fixes the trace columns, seeds
//! the history table, runs one pass per iterative-deepening depth (or a
//! single pass), and either returns the full trace or, on a structural
//! mismatch anywhere in the recursion, discards the partial record and
//! returns a trace with headers only.

pub mod bounds;
pub(crate) mod eval;

use derivative::Derivative;
use tracing::{info, info_span, warn};

use crate::config::SearchConfig;
use crate::error::StructuralMismatch;
use crate::history::HistoryTable;
use crate::trace::{Call, Columns, Trace};
use crate::tree::{NodeId, NodeKind, Tree};

use bounds::{BoundsPolicy, Star1, Unbounded};

/// One tracing search instance.
///
/// The engine owns the mutable scratch of a single `trace()` invocation (the
/// history table), reused across all recursive calls and all deepening
/// passes of that invocation. It is not safe to share one engine between
/// concurrent traces; give every concurrent caller its own.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Engine<'t> {
    #[derivative(Debug = "ignore")]
    tree: &'t Tree,
    pub(crate) config: SearchConfig,
    pub(crate) history: HistoryTable,
}

impl<'t> Engine<'t> {
    /// A new engine over `tree`. The tree is only ever read; its preset
    /// history counts are copied, never written back.
    pub fn new(tree: &'t Tree, config: SearchConfig) -> Self {
        Self {
            tree,
            config,
            history: HistoryTable::default(),
        }
    }

    /// The configuration this engine runs under
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Evaluate the tree under `root` and record every step.
    ///
    /// With `is_id` set this runs one independent pass per depth
    /// `1..=depth_limit`; with only `is_dl` set a single pass at
    /// `depth_limit`; otherwise a single pass with an effectively unlimited
    /// budget. The history table persists across the passes of one call.
    ///
    /// A structural mismatch anywhere in the recursion discards the partial
    /// record: the returned trace then has its headers populated and
    /// `depths` empty.
    pub fn trace(&mut self, root: NodeId) -> Trace {
        let columns = Columns::for_config(&self.config);
        let name = self.tree.node(root).name.clone();

        let span = info_span!(
            "trace",
            root = %name,
            depth_limit = self.config.depth_limit,
            iterative = self.config.is_id,
            alpha_beta = self.config.is_ab,
        );
        let _entered = span.enter();

        self.history = HistoryTable::seed(self.tree, root);

        let passes: Vec<u32> = if self.config.is_id {
            (1..=self.config.depth_limit).collect()
        } else if self.config.is_dl {
            vec![self.config.depth_limit]
        } else {
            vec![u32::MAX]
        };

        let mut depths = Vec::with_capacity(passes.len());
        for depth in passes {
            match self.run_pass(root, depth) {
                Ok(call) => depths.push(call),
                Err(mismatch) => {
                    warn!(?mismatch, "structural mismatch, trace discarded");
                    return Trace::empty(name, columns);
                }
            }
        }

        if let Some(last) = depths.last() {
            info!(
                passes = depths.len(),
                value = last.return_value,
                "trace complete"
            );
        }

        Trace {
            name,
            headers: columns.headers(),
            columns,
            depths,
        }
    }

    /// Run `f` with the bounds policy the configuration selects
    fn with_policy<R>(&mut self, f: impl FnOnce(&mut Self, &dyn BoundsPolicy) -> R) -> R {
        let config = self.config;
        if config.is_ab {
            let policy = Star1 {
                lower: config.lower_bound,
                upper: config.upper_bound,
                chance_pruning: config.is_cp,
            };
            f(self, &policy)
        } else {
            f(self, &Unbounded)
        }
    }

    fn run_pass(&mut self, root: NodeId, depth: u32) -> Result<Call, StructuralMismatch> {
        self.with_policy(|engine, policy| {
            let window = policy.root_window();
            let qs = engine.config.qs_depth;
            let (call, _) = match engine.tree.node(root).kind {
                NodeKind::Max => engine.eval_decision(policy, root, depth, qs, true, window)?,
                NodeKind::Min => engine.eval_decision(policy, root, depth, qs, false, window)?,
                NodeKind::Chance => engine.eval_chance(policy, root, depth, qs, window)?,
            };
            Ok(call)
        })
    }

    /// Run the decision evaluator directly on `node` and return its value.
    ///
    /// This is the raw evaluator surface: the node's kind must agree with
    /// `maximizing` and the node must have children, otherwise the
    /// structural mismatch that `trace()` would swallow is returned here.
    pub fn evaluate_decision(
        &mut self,
        node: NodeId,
        depth: u32,
        qs: u32,
        maximizing: bool,
    ) -> Result<f64, StructuralMismatch> {
        self.history = HistoryTable::seed(self.tree, node);
        self.with_policy(|engine, policy| {
            engine
                .eval_decision(policy, node, depth, qs, maximizing, policy.root_window())
                .map(|(_, value)| value)
        })
    }

    /// Run the chance evaluator directly on `node` and return its weighted
    /// sum, or the structural mismatch if `node` is not a chance node
    pub fn evaluate_chance(
        &mut self,
        node: NodeId,
        depth: u32,
        qs: u32,
    ) -> Result<f64, StructuralMismatch> {
        self.history = HistoryTable::seed(self.tree, node);
        self.with_policy(|engine, policy| {
            engine
                .eval_chance(policy, node, depth, qs, policy.root_window())
                .map(|(_, value)| value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let a = tree.add_root("A", NodeKind::Max, 0.0);
        let b = tree.add_child(a, "B", NodeKind::Min, 0.0);
        let c = tree.add_child(a, "C", NodeKind::Min, 0.0);
        tree.add_child(b, "D", NodeKind::Max, 3.0);
        tree.add_child(b, "E", NodeKind::Max, 5.0);
        tree.add_child(c, "F", NodeKind::Max, 2.0);
        tree.add_child(c, "G", NodeKind::Max, 9.0);
        (tree, a)
    }

    #[test]
    fn iterative_deepening_runs_one_pass_per_depth() {
        let (tree, a) = small_tree();
        let config = SearchConfig {
            is_dl: true,
            is_id: true,
            depth_limit: 3,
            ..Default::default()
        };
        let mut engine = Engine::new(&tree, config);
        assert_eq!(engine.trace(a).depths.len(), 3);

        let single = SearchConfig {
            is_dl: true,
            depth_limit: 3,
            ..Default::default()
        };
        let mut engine = Engine::new(&tree, single);
        assert_eq!(engine.trace(a).depths.len(), 1);
    }

    #[test]
    fn mismatched_tree_yields_headers_only() {
        let mut tree = Tree::new();
        // a childless decision root cannot be evaluated
        let root = tree.add_root("A", NodeKind::Max, 1.0);

        let mut engine = Engine::new(&tree, SearchConfig::default());
        let trace = engine.trace(root);
        assert!(!trace.headers.is_empty());
        assert!(trace.depths.is_empty());
        assert!(trace.rows().is_empty());
    }

    #[test]
    fn every_row_matches_the_header_width() {
        let (tree, a) = small_tree();
        let configs = [
            SearchConfig::default(),
            SearchConfig {
                is_ab: true,
                ..Default::default()
            },
            SearchConfig {
                is_ab: true,
                is_cp: true,
                is_ht: true,
                ..Default::default()
            },
        ];
        for config in configs {
            let mut engine = Engine::new(&tree, config);
            let trace = engine.trace(a);
            for row in trace.rows() {
                assert_eq!(row.cells.len(), trace.headers.len());
            }
        }
    }

    #[test]
    fn passes_are_separated_by_a_blank_row() {
        let (tree, a) = small_tree();
        let config = SearchConfig {
            is_dl: true,
            is_id: true,
            depth_limit: 2,
            ..Default::default()
        };
        let mut engine = Engine::new(&tree, config);
        let trace = engine.trace(a);

        let rows = trace.rows();
        let blanks: Vec<_> = rows
            .iter()
            .filter(|row| row.cells.iter().all(String::is_empty))
            .collect();
        assert_eq!(blanks.len(), 1);
        assert_eq!(blanks[0].cells.len(), trace.headers.len());
    }

    #[test]
    fn rows_replay_the_recursion_in_execution_order() {
        let (tree, a) = small_tree();
        let mut engine = Engine::new(&tree, SearchConfig::default());
        let trace = engine.trace(a);

        let rows = trace.rows();
        let signatures: Vec<_> = rows
            .iter()
            .map(|row| row.cells[0].clone())
            .filter(|sig| !sig.is_empty())
            .collect();
        // the root signature opens the record; each sub-call's rows come
        // before the root line that consumes its value
        assert_eq!(
            signatures,
            vec!["max(A, inf, 0)", "min(B, inf, 0)", "min(C, inf, 0)"]
        );
    }

    #[test]
    fn trace_serializes_for_the_export_pipeline() {
        let (tree, a) = small_tree();
        let mut engine = Engine::new(&tree, SearchConfig::default());
        let trace = engine.trace(a);

        let json = serde_json::to_value(&trace).expect("trace serializes");
        assert_eq!(json["name"], "A");
        assert_eq!(json["depths"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn direct_chance_evaluator_call_requires_a_chance_node() {
        let (tree, a) = small_tree();
        let mut engine = Engine::new(&tree, SearchConfig::default());
        assert_eq!(
            engine.evaluate_chance(a, 3, 0),
            Err(StructuralMismatch::WrongKind {
                node: a,
                expected: NodeKind::Chance,
                found: NodeKind::Max,
            })
        );
    }
}
