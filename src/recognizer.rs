//! Recognizer callbacks (§6). Trimmed down from the teacher crate's
//! `Recognizer` trait to the subset the lexer ATN simulator actually calls:
//! `sempred`/`action`. Parser-only members (decision/prediction profiling,
//! `ParseInfo`, rule-context plumbing) are parser-side prediction machinery,
//! an explicit Non-goal (§1), and are not carried over — see DESIGN.md.

/// Implemented by a grammar-specific lexer. The ATN simulator treats
/// `sempred` as a pure predicate and `action` as a side-effecting callback;
/// it never inspects the result beyond the boolean it gets back.
pub trait Recognizer {
    /// Evaluates the user predicate numbered `pred_index` within `rule_index`.
    /// Called speculatively during closure (§4.G.9) and must have no
    /// observable side effect beyond what `action` performs.
    fn sempred(&mut self, rule_index: usize, pred_index: usize) -> bool;

    /// Fires the user action numbered `action_index` within `rule_index`.
    /// Always called non-speculatively, after the winning accept has been
    /// committed (§4.E, §9 "Deferred side effects").
    fn action(&mut self, rule_index: usize, action_index: usize);
}

/// A `Recognizer` that never has grammar-defined predicates or actions
/// attached; every predicate is vacuously true, matching §4.G.9 ("if no
/// recognizer is attached, evaluate to true").
#[derive(Default)]
pub struct NullRecognizer;

impl Recognizer for NullRecognizer {
    fn sempred(&mut self, _rule_index: usize, _pred_index: usize) -> bool {
        true
    }

    fn action(&mut self, _rule_index: usize, _action_index: usize) {}
}
