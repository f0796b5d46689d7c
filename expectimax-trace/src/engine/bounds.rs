//! Bounding strategies for the search.
//!
//! The recursion in [`super::eval`] is written once; whether it prunes is
//! decided by the [`BoundsPolicy`] it carries. [`Unbounded`] never cuts and
//! reproduces plain minimax/expectiminimax. [`Star1`] applies classic
//! fail-hard alpha-beta at decision nodes and, when chance pruning is on,
//! the Star-1 window tightening at chance nodes.

use crate::trace::format_value;

/// An alpha/beta window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Lower edge
    pub alpha: f64,
    /// Upper edge
    pub beta: f64,
}

impl Window {
    /// The window containing every value
    pub fn full() -> Self {
        Self {
            alpha: f64::NEG_INFINITY,
            beta: f64::INFINITY,
        }
    }

    /// The `[alpha; beta]` text recorded in trace lines
    pub fn label(&self) -> String {
        format!("[{}; {}]", format_value(self.alpha), format_value(self.beta))
    }
}

/// How a search pass handles bounds.
///
/// `x` is the running probability-weighted sum at a chance node, `y` the
/// remaining probability mass with the current child already deducted, and
/// `prob` the current child's weight.
pub trait BoundsPolicy: std::fmt::Debug {
    /// The window every pass starts from
    fn root_window(&self) -> Window;

    /// True when a decision node may stop: the running best has reached
    /// `beta` (maximizing) or `alpha` (minimizing)
    fn decision_cut(&self, best: f64, window: Window, maximizing: bool) -> bool;

    /// The window a chance child is searched under. `None` means the child
    /// is searched under the root window, untightened.
    fn chance_child_window(&self, window: Window, x: f64, y: f64, prob: f64) -> Option<Window>;

    /// The forced call value when a chance child's result escapes its
    /// window, with the child's contribution already folded into `x`
    fn chance_cut(&self, value: f64, child_window: Window, x: f64, y: f64) -> Option<f64>;

    /// Whether an SSS value at or beyond the window gets the trace-only
    /// prune marker
    fn flags_sss_prune(&self, value: f64, window: Window) -> bool;
}

/// No bounding at all: plain minimax/expectiminimax
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl BoundsPolicy for Unbounded {
    fn root_window(&self) -> Window {
        Window::full()
    }

    fn decision_cut(&self, _best: f64, _window: Window, _maximizing: bool) -> bool {
        false
    }

    fn chance_child_window(&self, _window: Window, _x: f64, _y: f64, _prob: f64) -> Option<Window> {
        None
    }

    fn chance_cut(&self, _value: f64, _child_window: Window, _x: f64, _y: f64) -> Option<f64> {
        None
    }

    fn flags_sss_prune(&self, _value: f64, _window: Window) -> bool {
        false
    }
}

/// Alpha-beta at decision nodes, optional Star-1 at chance nodes.
///
/// `lower`/`upper` are the caller-asserted static bounds on every leaf
/// value; Star-1's window algebra is built on them.
#[derive(Debug, Clone, Copy)]
pub struct Star1 {
    /// Static lower bound on leaf values
    pub lower: f64,
    /// Static upper bound on leaf values
    pub upper: f64,
    /// Tighten chance-child windows (the `is_cp` toggle)
    pub chance_pruning: bool,
}

impl BoundsPolicy for Star1 {
    fn root_window(&self) -> Window {
        Window {
            alpha: self.lower,
            beta: self.upper,
        }
    }

    fn decision_cut(&self, best: f64, window: Window, maximizing: bool) -> bool {
        if maximizing {
            best >= window.beta
        } else {
            best <= window.alpha
        }
    }

    fn chance_child_window(&self, window: Window, x: f64, y: f64, prob: f64) -> Option<Window> {
        if !self.chance_pruning {
            return None;
        }
        let ax = self.lower.max((window.alpha - self.upper * y - x) / prob);
        let bx = self.upper.min((window.beta - self.lower * y - x) / prob);
        Some(Window { alpha: ax, beta: bx })
    }

    fn chance_cut(&self, value: f64, child_window: Window, x: f64, y: f64) -> Option<f64> {
        if !self.chance_pruning {
            return None;
        }
        if value >= child_window.beta {
            // fail high: completing the siblings pessimistically still
            // reaches beta
            Some(x + self.lower * y)
        } else if value <= child_window.alpha {
            // fail low: completing them optimistically still misses alpha
            Some(x + self.upper * y)
        } else {
            None
        }
    }

    fn flags_sss_prune(&self, value: f64, window: Window) -> bool {
        value <= window.alpha || value >= window.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star1_tightens_the_child_window() {
        let policy = Star1 {
            lower: 0.0,
            upper: 10.0,
            chance_pruning: true,
        };
        let window = Window {
            alpha: 5.0,
            beta: 10.0,
        };
        // first of two equal children, prob 0.5 each, nothing seen yet
        let child = policy.chance_child_window(window, 0.0, 0.5, 0.5).unwrap();
        assert_eq!(child.alpha, 0.0);
        assert_eq!(child.beta, 10.0);

        // second child: the first contributed 0.5, no mass remains
        let child = policy.chance_child_window(window, 0.5, 0.0, 0.5).unwrap();
        assert_eq!(child.alpha, 9.0);
        assert_eq!(child.beta, 10.0);
    }

    #[test]
    fn star1_cut_freezes_after_folding_the_cutting_child() {
        let policy = Star1 {
            lower: 0.0,
            upper: 10.0,
            chance_pruning: true,
        };
        let child = Window {
            alpha: 5.0,
            beta: 8.0,
        };
        // fail low with mass 0.3 outstanding: optimistic completion
        assert_eq!(policy.chance_cut(4.0, child, 0.7, 0.3), Some(3.7));
        // fail high: pessimistic completion
        assert_eq!(policy.chance_cut(9.0, child, 2.0, 0.3), Some(2.0));
        // inside the window: no cut
        assert_eq!(policy.chance_cut(6.0, child, 0.7, 0.3), None);
    }

    #[test]
    fn unbounded_never_cuts() {
        let policy = Unbounded;
        let window = policy.root_window();
        assert!(!policy.decision_cut(f64::INFINITY, window, true));
        assert!(policy.chance_child_window(window, 0.0, 1.0, 0.5).is_none());
        assert!(policy.chance_cut(1e9, window, 0.0, 1.0).is_none());
    }
}
