//! ATN states (§3). Identified by integer index into [`crate::atn::ATN::states`];
//! carry an ordered outgoing-transition list and classification flags.

use crate::transition::Transition;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum StateKind {
    Basic,
    RuleStart,
    RuleStop,
    /// A mode start state or any other state whose outgoing alternatives are
    /// prioritized by source order (used to assign `alt` numbers in §4.G.3).
    /// `non_greedy` marks a closure-loop decision such as `.*?`: configs that
    /// pass through it are deprioritized once their alt has accepted once
    /// (§4.G.5, §8 "non-greedy").
    Decision { non_greedy: bool },
}

#[derive(Clone, Debug)]
pub struct ATNState {
    pub state_number: usize,
    pub kind: StateKind,
    pub rule_index: usize,
    /// In source order: this order *is* the alt-priority order when the
    /// state is a decision state.
    pub transitions: Vec<Transition>,
}

impl ATNState {
    pub fn new(state_number: usize, kind: StateKind, rule_index: usize) -> Self {
        ATNState { state_number, kind, rule_index, transitions: Vec::new() }
    }

    pub fn is_rule_stop(&self) -> bool {
        self.kind == StateKind::RuleStop
    }

    pub fn is_non_greedy_decision(&self) -> bool {
        matches!(self.kind, StateKind::Decision { non_greedy: true })
    }

    pub fn only_has_epsilon_transitions(&self) -> bool {
        self.transitions.iter().all(Transition::is_epsilon)
    }
}
