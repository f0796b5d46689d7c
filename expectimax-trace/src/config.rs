//! Search configuration.

use serde::Serialize;

/// The full set of switches and limits a trace runs under.
///
/// Every field is independent and none of them are validated; combinations
/// the engine does not define (chance pruning without alpha-beta, iterative
/// deepening without a depth limit, `lower_bound > upper_bound`) are caller
/// errors.
///
/// The defaults (as implemented by [Default]) are all optimizations off:
/// ```
/// use expectimax_trace::SearchConfig;
///
/// let defaults: SearchConfig = Default::default();
///
/// assert!(!defaults.is_ab);
/// assert_eq!(defaults.depth_limit, 3);
/// assert_eq!((defaults.lower_bound, defaults.upper_bound), (-100.0, 100.0));
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchConfig {
    /// Extend the search at quiescent leaves instead of cutting at the depth
    /// limit
    pub is_qs: bool,
    /// Reorder children by recorded history counts and keep counting winners
    pub is_ht: bool,
    /// Stop descending once `depth_limit` levels have been used
    pub is_dl: bool,
    /// Run one independent pass per depth `1..=depth_limit`. Only meaningful
    /// together with `is_dl`
    pub is_id: bool,
    /// Alpha-beta cutoffs at decision nodes
    pub is_ab: bool,
    /// Star-1 window tightening at chance nodes. Only meaningful together
    /// with `is_ab`
    pub is_cp: bool,
    /// Collapse single-successor chains without building sub-calls
    pub allow_sss: bool,
    /// Levels of regular search per pass
    pub depth_limit: u32,
    /// Extra levels granted to quiescent positions once `depth_limit` is used
    /// up
    pub qs_depth: u32,
    /// Static lower bound on every leaf value, used by Star-1
    pub lower_bound: f64,
    /// Static upper bound on every leaf value, used by Star-1
    pub upper_bound: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            is_qs: false,
            is_ht: false,
            is_dl: false,
            is_id: false,
            is_ab: false,
            is_cp: false,
            allow_sss: false,
            depth_limit: 3,
            qs_depth: 0,
            lower_bound: -100.0,
            upper_bound: 100.0,
        }
    }
}
