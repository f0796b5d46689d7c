//! Structural failures that abort a trace.

use crate::tree::{NodeId, NodeKind};

/// Why the recursion gave up on the tree it was handed.
///
/// These propagate up through every evaluator; [`crate::Engine::trace`] is
/// the catch point and turns them into an empty trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralMismatch {
    /// An evaluator was invoked on a node of the wrong kind, or with a
    /// `maximizing` flag that contradicts the node's kind
    WrongKind {
        /// The offending node
        node: NodeId,
        /// What the evaluator was asked to treat the node as
        expected: NodeKind,
        /// What the node actually is
        found: NodeKind,
    },
    /// A decision call was made on a node with no children
    ChildlessDecision {
        /// The offending node
        node: NodeId,
    },
}
