//! The ATN graph (§4.B) and its builder (§4.B', since ATN *deserialization*
//! is out of scope — grammars are assembled directly against this graph).

use std::sync::Arc;

use crate::atn_state::{ATNState, StateKind};
use crate::interval_set::IntervalSet;
use crate::lexer_action::LexerAction;
use crate::token::TOKEN_INVALID_TYPE;
use crate::transition::{ATNStateRef, Transition};

pub type ModeRef = usize;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ATNType {
    Lexer,
    Parser,
}

/// Read-only accessor over a compiled ATN graph. Immutable after
/// [`ATNBuilder::build`].
pub struct ATN {
    pub grammar_type: ATNType,
    states: Vec<ATNState>,
    mode_to_start_state: Vec<ATNStateRef>,
    rule_to_token_type: Vec<isize>,
    rule_to_start_state: Vec<ATNStateRef>,
    rule_to_stop_state: Vec<ATNStateRef>,
    lexer_actions: Vec<LexerAction>,
}

impl ATN {
    pub fn state(&self, state: ATNStateRef) -> &ATNState {
        &self.states[state]
    }

    pub fn states(&self) -> &[ATNState] {
        &self.states
    }

    pub fn mode_start_state(&self, mode: ModeRef) -> ATNStateRef {
        self.mode_to_start_state[mode]
    }

    pub fn mode_count(&self) -> usize {
        self.mode_to_start_state.len()
    }

    pub fn rule_to_token_type(&self, rule_index: usize) -> isize {
        self.rule_to_token_type.get(rule_index).copied().unwrap_or(TOKEN_INVALID_TYPE)
    }

    pub fn rule_start_state(&self, rule_index: usize) -> ATNStateRef {
        self.rule_to_start_state[rule_index]
    }

    pub fn rule_stop_state(&self, rule_index: usize) -> ATNStateRef {
        self.rule_to_stop_state[rule_index]
    }

    pub fn lexer_action(&self, index: usize) -> &LexerAction {
        &self.lexer_actions[index]
    }

    /// The set of code points for which some transition leaving `state`
    /// would make progress; used by error reporting to describe "expected"
    /// tokens. A thin, lexer-only rendering of the ANTLR "expected set" API.
    pub fn next_tokens(&self, state: ATNStateRef) -> IntervalSet {
        let mut out = IntervalSet::new();
        for t in &self.states[state].transitions {
            match t {
                Transition::Atom { code_point, .. } => out.add_one(*code_point),
                Transition::Range { lo, hi, .. } => out.add_range(*lo, *hi),
                Transition::Set { set, .. } => out = out.union(set),
                _ => {}
            }
        }
        out
    }
}

/// Builder used in place of an ATN deserializer (§4.B'). Every method appends
/// to source order, which doubles as alt-priority order for decision states.
pub struct ATNBuilder {
    grammar_type: ATNType,
    states: Vec<ATNState>,
    mode_to_start_state: Vec<ATNStateRef>,
    rule_to_token_type: Vec<isize>,
    rule_to_start_state: Vec<ATNStateRef>,
    rule_to_stop_state: Vec<ATNStateRef>,
    lexer_actions: Vec<LexerAction>,
}

impl ATNBuilder {
    pub fn new(grammar_type: ATNType) -> Self {
        let mut b = ATNBuilder {
            grammar_type,
            states: Vec::new(),
            mode_to_start_state: Vec::new(),
            rule_to_token_type: Vec::new(),
            rule_to_start_state: Vec::new(),
            rule_to_stop_state: Vec::new(),
            lexer_actions: Vec::new(),
        };
        // DEFAULT_MODE (0) always exists.
        b.add_mode();
        b
    }

    fn push_state(&mut self, kind: StateKind, rule_index: usize) -> ATNStateRef {
        let n = self.states.len();
        self.states.push(ATNState::new(n, kind, rule_index));
        n
    }

    pub fn add_state(&mut self, rule_index: usize) -> ATNStateRef {
        self.push_state(StateKind::Basic, rule_index)
    }

    pub fn add_rule_start_state(&mut self, rule_index: usize) -> ATNStateRef {
        self.push_state(StateKind::RuleStart, rule_index)
    }

    pub fn add_rule_stop_state(&mut self, rule_index: usize) -> ATNStateRef {
        self.push_state(StateKind::RuleStop, rule_index)
    }

    /// A closure-loop decision state, e.g. the loop-back state of `.*?`.
    /// `non_greedy` marks it so the simulator deprioritizes configs that
    /// pass through it once their alt has already accepted (§4.G.5).
    pub fn add_decision_state(&mut self, rule_index: usize, non_greedy: bool) -> ATNStateRef {
        self.push_state(StateKind::Decision { non_greedy }, rule_index)
    }

    /// Allocates a new mode (its start state is a decision state whose
    /// outgoing transitions are the mode's alternatives) and returns its index.
    pub fn add_mode(&mut self) -> ModeRef {
        let mode = self.mode_to_start_state.len();
        let state = self.push_state(StateKind::Decision { non_greedy: false }, usize::MAX);
        self.mode_to_start_state.push(state);
        mode
    }

    pub fn add_transition(&mut self, from: ATNStateRef, transition: Transition) {
        self.states[from].transitions.push(transition);
    }

    /// Wires a new rule: `token_type` becomes `ruleToTokenType[rule_index]`,
    /// and `start` becomes one more alternative of `mode`'s start state
    /// (reached through an epsilon transition, in call order = alt-priority
    /// order per §4.G.3).
    pub fn define_rule(&mut self, mode: ModeRef, rule_index: usize, token_type: isize, start: ATNStateRef, stop: ATNStateRef) {
        if self.rule_to_token_type.len() <= rule_index {
            self.rule_to_token_type.resize(rule_index + 1, TOKEN_INVALID_TYPE);
            self.rule_to_start_state.resize(rule_index + 1, 0);
            self.rule_to_stop_state.resize(rule_index + 1, 0);
        }
        self.rule_to_token_type[rule_index] = token_type;
        self.rule_to_start_state[rule_index] = start;
        self.rule_to_stop_state[rule_index] = stop;
        let mode_start = self.mode_to_start_state[mode];
        self.add_transition(mode_start, Transition::Epsilon { target: start });
    }

    pub fn register_lexer_action(&mut self, action: LexerAction) -> usize {
        self.lexer_actions.push(action);
        self.lexer_actions.len() - 1
    }

    pub fn build(self) -> Arc<ATN> {
        Arc::new(ATN {
            grammar_type: self.grammar_type,
            states: self.states,
            mode_to_start_state: self.mode_to_start_state,
            rule_to_token_type: self.rule_to_token_type,
            rule_to_start_state: self.rule_to_start_state,
            rule_to_stop_state: self.rule_to_stop_state,
            lexer_actions: self.lexer_actions,
        })
    }
}
