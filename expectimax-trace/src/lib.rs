#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs
)]
//! A configurable adversarial-search tracer.
//!
//! The engine evaluates a Max/Min/Chance decision tree with minimax or
//! expectiminimax — optionally with alpha-beta and Star-1 pruning,
//! quiescence extension, iterative deepening, history-heuristic move
//! ordering and a single-successor shortcut — while recording every call,
//! every evaluated value, every pruning event and the winning move in a
//! replayable [`Trace`] for a grid renderer or a table exporter to consume.
//!
//! ```rust
//! use expectimax_trace::{Engine, NodeKind, SearchConfig, Tree};
//!
//! // A Max root whose only move leads to a 60/40 gamble between 4 and 10
//! let mut tree = Tree::new();
//! let root = tree.add_root("A", NodeKind::Max, 0.0);
//! let gamble = tree.add_child(root, "C", NodeKind::Chance, 0.0);
//! let low = tree.add_child(gamble, "L", NodeKind::Max, 4.0);
//! let high = tree.add_child(gamble, "H", NodeKind::Max, 10.0);
//! tree.node_mut(low).probability = 60.0;
//! tree.node_mut(high).probability = 40.0;
//!
//! let mut engine = Engine::new(&tree, SearchConfig::default());
//! let trace = engine.trace(root);
//!
//! // 0.6 * 4 + 0.4 * 10
//! assert_eq!(trace.depths[0].return_value, 6.4);
//!
//! // every row of the flattened trace matches the fixed column headers
//! for row in trace.rows() {
//!     assert_eq!(row.cells.len(), trace.headers.len());
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod sss;
pub mod trace;
pub mod tree;

pub use config::SearchConfig;
pub use engine::bounds::{BoundsPolicy, Star1, Unbounded, Window};
pub use engine::Engine;
pub use error::StructuralMismatch;
pub use trace::{Annotation, Call, Columns, Line, Row, Trace};
pub use tree::{Node, NodeId, NodeKind, Tree};
