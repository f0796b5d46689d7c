//! The replayable execution record a trace produces.
//!
//! A [`Trace`] holds one [`Call`] tree per search pass. Each `Call` mirrors
//! one evaluator invocation: its first [`Line`] carries the call signature,
//! then one line per evaluated child. The column set is fixed when the trace
//! starts and every line renders exactly that many cells, in the same order.
//! That is the whole contract toward the grid renderer and the text exporter.

use itertools::Itertools;
use serde::Serialize;
use text_trees::StringTreeNode;

use crate::config::SearchConfig;

/// Marker attached to an evaluated value in a [`Line`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Annotation {
    /// The child's depth budget was exhausted while it was quiescent
    Quiescent,
    /// The value came from the single-successor shortcut, no sub-call exists
    Sss,
    /// Alpha-beta cutoff: the siblings after this line were never evaluated
    Prune,
    /// Star-1 cutoff: the call's value was forced from the static bounds
    ChancePrune,
    /// An SSS value that lies at or beyond the current window. Recorded for
    /// trace fidelity only; SSS already terminated the branch
    SssPrune,
}

impl Annotation {
    fn tag(self) -> &'static str {
        match self {
            Annotation::Quiescent => "q",
            Annotation::Sss => "sss",
            Annotation::Prune => "prune",
            Annotation::ChancePrune => "c-prune",
            Annotation::SssPrune => "sss-prune",
        }
    }
}

/// Which optional columns the configuration enables
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Columns {
    /// Star-1 child windows ("bounds")
    pub bounds: bool,
    /// Running alpha/beta
    pub alpha_beta: bool,
    /// History-table deltas
    pub history: bool,
}

impl Columns {
    /// Fix the column set for `config`. Done once, at trace start.
    pub fn for_config(config: &SearchConfig) -> Self {
        Self {
            bounds: config.is_ab && config.is_cp,
            alpha_beta: config.is_ab,
            history: config.is_ht,
        }
    }

    /// The ordered column headers
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["call".to_owned(), "open".to_owned()];
        if self.bounds {
            headers.push("bounds".to_owned());
        }
        headers.push("value".to_owned());
        if self.alpha_beta {
            headers.push("alpha/beta".to_owned());
        }
        headers.push("best".to_owned());
        if self.history {
            headers.push("history".to_owned());
        }
        headers
    }
}

/// One row of a call record
#[derive(Debug, Clone, Default, Serialize)]
pub struct Line {
    /// Call signature, filled on the first line of a call only
    pub signature: String,
    /// Children still unevaluated when this line was written
    pub open: Vec<String>,
    /// Window text for this line (Star-1 child window, or the call's own)
    pub bounds: Option<String>,
    /// The child's evaluated value
    pub value: Option<f64>,
    /// Markers explaining where the value came from or why the loop stopped
    pub annotations: Vec<Annotation>,
    /// Running alpha/beta after this line's child was folded in
    pub alpha_beta: Option<(f64, f64)>,
    /// Running best action and value (decision), or the bracketed running
    /// weighted sum (chance)
    pub best: Option<String>,
    /// True on the last line of a call: this is the terminal decision
    pub boxed: bool,
    /// Formatted `move:count` history deltas recorded on this line
    pub history: Vec<String>,
    /// Index into the call's children of the sub-call evaluated for this
    /// line, when the child was recursed into
    pub expanded: Option<usize>,
}

impl Line {
    /// Render exactly one cell per enabled column, in header order
    pub fn cells(&self, columns: &Columns) -> Vec<String> {
        let mut cells = vec![self.signature.clone(), format_set(&self.open)];
        if columns.bounds {
            cells.push(self.bounds.clone().unwrap_or_default());
        }
        cells.push(self.value_cell());
        if columns.alpha_beta {
            cells.push(match self.alpha_beta {
                Some((alpha, beta)) => {
                    format!("{} / {}", format_value(alpha), format_value(beta))
                }
                None => String::new(),
            });
        }
        cells.push(self.best.clone().unwrap_or_default());
        if columns.history {
            cells.push(self.history.iter().join(" "));
        }
        cells
    }

    fn value_cell(&self) -> String {
        let tags = self.annotations.iter().map(|a| a.tag()).join(" ");
        match (self.value, tags.is_empty()) {
            (Some(v), true) => format_value(v),
            (Some(v), false) => format!("{} {}", format_value(v), tags),
            (None, true) => String::new(),
            (None, false) => tags,
        }
    }
}

/// The record of one evaluator invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Call {
    /// The signature line followed by one line per evaluated child
    pub lines: Vec<Line>,
    /// Sub-calls, in the order they were made
    pub children: Vec<Call>,
    /// The value this call returned to its parent
    pub return_value: f64,
}

impl Call {
    /// Flatten into rows in true execution order: a child's sub-call rows
    /// come before the line that records its returned value
    fn flatten(&self, columns: &Columns, out: &mut Vec<Row>) {
        for line in &self.lines {
            if let Some(idx) = line.expanded {
                self.children[idx].flatten(columns, out);
            }
            out.push(Row {
                cells: line.cells(columns),
                boxed: line.boxed,
            });
        }
    }

    fn to_text_tree_node(&self) -> StringTreeNode {
        let label = match self.lines.first() {
            Some(first) => format!("{} = {}", first.signature, format_value(self.return_value)),
            None => format_value(self.return_value),
        };
        let mut node = StringTreeNode::new(label);
        for child in &self.children {
            node.push_node(child.to_text_tree_node());
        }
        node
    }
}

/// One rendered grid row; blank rows separate iterative-deepening passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Exactly one cell per column header
    pub cells: Vec<String>,
    /// True for the terminal-decision line of a call
    pub boxed: bool,
}

/// The complete output of one `trace()` invocation
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    /// Name of the traced root node
    pub name: String,
    /// Ordered column headers, fixed at trace start
    pub headers: Vec<String>,
    /// The enabled-column switches behind `headers`
    pub columns: Columns,
    /// One call tree per search pass; empty when the trace was aborted
    pub depths: Vec<Call>,
}

impl Trace {
    /// A trace that carries headers but no call data. This is what a
    /// structurally mismatched tree produces.
    pub fn empty(name: impl Into<String>, columns: Columns) -> Self {
        Self {
            name: name.into(),
            headers: columns.headers(),
            columns,
            depths: Vec::new(),
        }
    }

    /// Flatten every pass depth-first into grid rows, with one blank row
    /// between passes. Every non-blank row has exactly `headers.len()` cells.
    pub fn rows(&self) -> Vec<Row> {
        let mut out = Vec::new();
        for (i, call) in self.depths.iter().enumerate() {
            if i > 0 {
                out.push(Row {
                    cells: vec![String::new(); self.headers.len()],
                    boxed: false,
                });
            }
            call.flatten(&self.columns, &mut out);
        }
        out
    }

    /// A human-readable rendering of the call trees, for debugging
    pub fn to_text_tree(&self) -> Option<String> {
        if self.depths.is_empty() {
            return None;
        }
        let rendered = self
            .depths
            .iter()
            .map(|call| format!("{}", call.to_text_tree_node()))
            .join("\n");
        Some(rendered)
    }
}

/// Drop the fraction when there is none, so traces read `4`, not `4.0`
pub(crate) fn format_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn format_set(names: &[String]) -> String {
    format!("{{{}}}", names.iter().join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> SearchConfig {
        SearchConfig {
            is_qs: true,
            is_ht: true,
            is_dl: true,
            is_id: true,
            is_ab: true,
            is_cp: true,
            allow_sss: true,
            ..Default::default()
        }
    }

    #[test]
    fn headers_follow_the_config() {
        let bare = Columns::for_config(&SearchConfig::default());
        assert_eq!(bare.headers(), vec!["call", "open", "value", "best"]);

        let full = Columns::for_config(&all_on());
        assert_eq!(
            full.headers(),
            vec!["call", "open", "bounds", "value", "alpha/beta", "best", "history"]
        );
    }

    #[test]
    fn chance_pruning_without_alpha_beta_adds_no_bounds_column() {
        let config = SearchConfig {
            is_cp: true,
            ..Default::default()
        };
        let columns = Columns::for_config(&config);
        assert!(!columns.bounds);
        assert!(!columns.alpha_beta);
    }

    #[test]
    fn every_line_renders_one_cell_per_header() {
        let line = Line {
            signature: "max(A, 2, 0)".to_owned(),
            open: vec!["B".to_owned(), "C".to_owned()],
            value: Some(4.5),
            annotations: vec![Annotation::Sss, Annotation::SssPrune],
            alpha_beta: Some((f64::NEG_INFINITY, 10.0)),
            best: Some("B=4.5".to_owned()),
            ..Default::default()
        };

        for columns in [
            Columns::for_config(&SearchConfig::default()),
            Columns::for_config(&all_on()),
        ] {
            assert_eq!(line.cells(&columns).len(), columns.headers().len());
        }
    }

    #[test]
    fn value_cell_carries_annotations() {
        let line = Line {
            value: Some(4.0),
            annotations: vec![Annotation::Quiescent],
            ..Default::default()
        };
        let columns = Columns::for_config(&SearchConfig::default());
        assert_eq!(line.cells(&columns)[2], "4 q");
    }

    #[test]
    fn format_value_drops_whole_fractions() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(6.4), "6.4");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
    }
}
