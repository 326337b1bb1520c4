//! Per-mode DFA and its state cache (§3, §4.F). States are interned by their
//! `configs` identity; edges are a bounded array covering only
//! `[MIN_DFA_EDGE, MAX_DFA_EDGE]` — everything else always falls back to the
//! ATN, trading a little simulation cost on rare code points for a small,
//! fixed-size edge table on the common ASCII path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use crate::atn_config_set::ATNConfigSet;
use crate::lexer_action::LexerActionExecutor;
use crate::token::TOKEN_INVALID_TYPE;

pub const MIN_DFA_EDGE: isize = 0;
pub const MAX_DFA_EDGE: isize = 127;

fn edge_index(symbol: isize) -> Option<usize> {
    if (MIN_DFA_EDGE..=MAX_DFA_EDGE).contains(&symbol) {
        Some((symbol - MIN_DFA_EDGE) as usize)
    } else {
        None
    }
}

/// Whatever the simulator determined about a freshly-interned config set:
/// does it contain a rule-stop config, and if so which token type/executor
/// wins (§4.G.7 — "scanning for a config whose state is a rule-stop").
#[derive(Clone, Default)]
pub struct AcceptInfo {
    pub prediction: isize,
    pub lexer_action_executor: LexerActionExecutor,
}

pub struct DFAState {
    pub state_number: usize,
    pub configs: Arc<ATNConfigSet>,
    edges: RwLock<Vec<Option<Arc<DFAState>>>>,
    pub is_accept_state: bool,
    pub prediction: isize,
    pub lexer_action_executor: LexerActionExecutor,
}

impl DFAState {
    fn new(state_number: usize, configs: Arc<ATNConfigSet>, accept: Option<AcceptInfo>) -> Self {
        let edge_count = (MAX_DFA_EDGE - MIN_DFA_EDGE + 1) as usize;
        let (is_accept_state, prediction, lexer_action_executor) = match accept {
            Some(info) => (true, info.prediction, info.lexer_action_executor),
            None => (false, TOKEN_INVALID_TYPE, LexerActionExecutor::empty()),
        };
        DFAState {
            state_number,
            configs,
            edges: RwLock::new(vec![None; edge_count]),
            is_accept_state,
            prediction,
            lexer_action_executor,
        }
    }

    pub fn get_edge(&self, symbol: isize) -> Option<Arc<DFAState>> {
        edge_index(symbol).and_then(|i| self.edges.read().unwrap()[i].clone())
    }

    pub fn set_edge(&self, symbol: isize, target: Arc<DFAState>) {
        if let Some(i) = edge_index(symbol) {
            self.edges.write().unwrap()[i] = Some(target);
        }
    }
}

/// A single mode's DFA: a start state plus every state reachable from it,
/// interned by configuration-set identity. Grows monotonically during
/// matching; [`Dfa::clear`] resets it to empty. Mutation is safe under a
/// single writer with concurrent readers because all shared access goes
/// through `RwLock`, matching the concurrency model of §5.
#[derive(Default)]
pub struct Dfa {
    pub s0: RwLock<Option<Arc<DFAState>>>,
    states: RwLock<FxHashMap<Arc<ATNConfigSet>, Arc<DFAState>>>,
    next_state_number: AtomicUsize,
}

impl Dfa {
    pub fn new() -> Self {
        Dfa::default()
    }

    pub fn clear(&self) {
        *self.s0.write().unwrap() = None;
        self.states.write().unwrap().clear();
    }

    pub fn num_states(&self) -> usize {
        self.states.read().unwrap().len()
    }

    /// Interns `configs`, returning the existing [`DFAState`] if an
    /// equal-by-identity one is already cached, or creating a fresh one
    /// (marked accepting per `accept`, computed by the caller from the ATN)
    /// otherwise.
    pub fn add_state(&self, configs: ATNConfigSet, accept: Option<AcceptInfo>) -> Arc<DFAState> {
        let configs = Arc::new(configs);
        if let Some(existing) = self.states.read().unwrap().get(&configs) {
            return existing.clone();
        }
        let mut states = self.states.write().unwrap();
        if let Some(existing) = states.get(&configs) {
            return existing.clone();
        }
        let state_number = self.next_state_number.fetch_add(1, Ordering::SeqCst);
        let new_state = Arc::new(DFAState::new(state_number, configs.clone(), accept));
        states.insert(configs, new_state.clone());
        new_state
    }
}
