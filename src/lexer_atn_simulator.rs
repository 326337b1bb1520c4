//! The lexer ATN simulator (§4.G): `match`, `execATN`, `closure`, `reach`, and
//! the accept/failure arbitration that picks the longest match with the
//! earliest-declared rule winning ties.

use std::sync::Arc;

use log::trace;

use crate::atn::ATN;
use crate::atn_config::LexerATNConfig;
use crate::atn_config_set::ATNConfigSet;
use crate::char_stream::{CharStream, MarkGuard};
use crate::dfa::{AcceptInfo, Dfa, DFAState};
use crate::errors::LexerError;
use crate::int_stream::{IntStream, EOF};
use crate::lexer_action::LexerActionExecutor;
use crate::prediction_context::{PredictionContext, PredictionContextCache, EMPTY_RETURN_STATE};
use crate::recognizer::Recognizer;
use crate::token::{MAX_CHAR, MIN_CHAR};
use crate::transition::Transition;

/// Outcome of a successful match (§4.G.10): how far the input was consumed
/// and what the winning rule decided the token type and pending actions are.
pub struct SimResult {
    pub token_type: isize,
    pub lexer_action_executor: LexerActionExecutor,
}

/// One simulator per mode-switchable lexer instance. Owns the per-mode DFA
/// cache and the prediction-context cons table; both persist across calls to
/// `match_` (§5 "lazily built, then cached for the session's lifetime").
pub struct LexerATNSimulator {
    atn: Arc<ATN>,
    dfas: Vec<Dfa>,
    context_cache: PredictionContextCache,
    mode: usize,
    /// Start index of the token currently being matched, needed to resolve
    /// position-dependent actions (§4.E) relative to the token, not the mark.
    start_index: usize,
    line: isize,
    column: isize,
}

impl LexerATNSimulator {
    pub fn new(atn: Arc<ATN>) -> Self {
        let mode_count = atn.mode_count();
        LexerATNSimulator {
            atn,
            dfas: (0..mode_count).map(|_| Dfa::new()).collect(),
            context_cache: PredictionContextCache::new(),
            mode: crate::token::DEFAULT_MODE,
            start_index: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn mode(&self) -> usize {
        self.mode
    }

    pub fn set_mode(&mut self, mode: usize) {
        self.mode = mode;
    }

    pub fn line(&self) -> isize {
        self.line
    }

    pub fn column(&self) -> isize {
        self.column
    }

    pub fn reset_line_column(&mut self, line: isize, column: isize) {
        self.line = line;
        self.column = column;
    }

    /// Entry point (§4.G.1): attempts to recognize one token starting at the
    /// stream's current position, in `self.mode`. On success, the stream is
    /// left positioned one past the last consumed symbol.
    pub fn match_<R: Recognizer>(&mut self, input: &mut dyn CharStream, recognizer: &mut R) -> Result<SimResult, LexerError> {
        self.start_index = input.index();
        let dfa_index = self.mode;
        let s0 = self.dfas[dfa_index].s0.read().unwrap().clone();
        let s0 = match s0 {
            Some(s0) => s0,
            None => {
                let computed = self.compute_start_state(input, recognizer)?;
                // A predicate reachable from the mode's start state may change
                // truth value between scans, so s0 itself must not be cached
                // in that case (§4.G.3) — recompute it fresh every call.
                let has_semantic_context = computed.has_semantic_context();
                let installed = self.dfas[dfa_index].add_state(computed, None);
                if !has_semantic_context {
                    *self.dfas[dfa_index].s0.write().unwrap() = Some(installed.clone());
                }
                installed
            }
        };
        self.exec_atn(input, recognizer, s0)
    }

    /// Builds the start config set for `self.mode`: one config per rule
    /// reachable from the mode's start state, numbered in source order so
    /// that order doubles as alt-priority (§4.G.3).
    fn compute_start_state<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        recognizer: &mut R,
    ) -> Result<ATNConfigSet, LexerError> {
        let mut configs = ATNConfigSet::new();
        let start = self.atn.mode_start_state(self.mode);
        let transitions = self.atn.state(start).transitions.clone();
        for (alt, tr) in transitions.iter().enumerate() {
            if let Transition::Epsilon { target } = tr {
                let cfg = LexerATNConfig::new(*target, alt + 1, PredictionContext::empty());
                self.closure(input, recognizer, cfg, &mut configs, false, false, false)?;
            }
        }
        Ok(configs)
    }

    /// The main simulation loop (§4.G.2): repeatedly computes `reach`,
    /// accepting the longest match seen so far at each step, until `reach`
    /// is empty or the DFA has nowhere left to grow.
    fn exec_atn<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        recognizer: &mut R,
        ds0: Arc<DFAState>,
    ) -> Result<SimResult, LexerError> {
        trace!("execATN starting at index {}", input.index());
        let mut prev_accept: Option<(usize, Arc<DFAState>)> = None;
        if ds0.is_accept_state {
            prev_accept = Some((input.index(), ds0.clone()));
        }
        let mut t = input.la(1);
        let mut s = ds0;

        loop {
            let mut target = s.get_edge(t);
            if target.is_none() {
                target = Some(self.compute_target_state(input, recognizer, &s, t)?);
            }
            let target = target.unwrap();

            // Dead state: no live config survived consuming `t`. Stop without
            // consuming it, so the offending text and any later retry both
            // see the input positioned exactly where the match gave up. `s`
            // (not the dead `target`) is the last live config set, and is
            // what `NoViableAlt` must report as its dead-end configs (§6).
            if target.configs.is_empty() {
                return self.fail_or_accept(input, recognizer, prev_accept, &s.configs);
            }
            if t != EOF {
                input.consume();
                self.update_line_column(t);
            }
            if target.is_accept_state {
                prev_accept = Some((input.index(), target.clone()));
            }
            if t == EOF {
                break;
            }
            s = target;
            t = input.la(1);
        }

        self.fail_or_accept(input, recognizer, prev_accept, &s.configs)
    }

    fn compute_target_state<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        recognizer: &mut R,
        s: &Arc<DFAState>,
        t: isize,
    ) -> Result<Arc<DFAState>, LexerError> {
        let mut reach = ATNConfigSet::new();
        self.reach(input, recognizer, &s.configs, t, &mut reach)?;

        if reach.is_empty() {
            // No live config consumes `t`: install an empty dead-end state so
            // future calls at this (state, symbol) short-circuit via the
            // cached edge instead of re-running closure.
            let dead = self.dfas[self.mode].add_state(ATNConfigSet::new(), None);
            s.set_edge(t, dead.clone());
            return Ok(dead);
        }

        let has_semantic_context = reach.has_semantic_context();
        let accept = self.accept_info_for(&reach);
        let new_state = self.dfas[self.mode].add_state(reach, accept);
        // A predicate's truth value can change between scans, so an edge
        // computed through one must be recomputed every time (§4.G.7) — we
        // still return the state for this scan, just don't cache the edge.
        if !has_semantic_context {
            s.set_edge(t, new_state.clone());
        }
        Ok(new_state)
    }

    /// Scans an interned config set for the first config whose state is a
    /// rule-stop (source order = priority order, §4.G.3/§4.G.7): that config's
    /// rule decides the DFA state's `prediction` and executor.
    fn accept_info_for(&self, configs: &ATNConfigSet) -> Option<AcceptInfo> {
        for cfg in configs.iter() {
            let state = self.atn.state(cfg.state);
            if state.is_rule_stop() {
                return Some(AcceptInfo {
                    prediction: self.atn.rule_to_token_type(state.rule_index),
                    lexer_action_executor: cfg.lexer_action_executor.clone(),
                });
            }
        }
        None
    }

    /// Builds `reach`: every config reachable from `closure_configs` by
    /// consuming `t`, then epsilon-closed (§4.G.6). Once some config of a
    /// given alt has reached an accept state during this call, further
    /// configs of that same alt which passed through a non-greedy decision
    /// are skipped (§4.G.5) — this is what makes `.*?` stop at the first
    /// match instead of the last.
    fn reach<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        recognizer: &mut R,
        closure_configs: &ATNConfigSet,
        t: isize,
        reach: &mut ATNConfigSet,
    ) -> Result<(), LexerError> {
        let mut accepted_alts: rustc_hash::FxHashSet<usize> = rustc_hash::FxHashSet::default();
        let offset = (input.index() - self.start_index) as usize;
        let eof_as_epsilon = t == EOF;
        for cfg in closure_configs.iter() {
            if cfg.passed_through_non_greedy_decision && accepted_alts.contains(&cfg.alt) {
                continue;
            }
            let already_accepted = accepted_alts.contains(&cfg.alt);
            let transitions = self.atn.state(cfg.state).transitions.clone();
            for tr in &transitions {
                if let Some(target) = self.matching_target(tr, t) {
                    let mut new_cfg = cfg.transition_to(target, false);
                    new_cfg.lexer_action_executor = cfg.lexer_action_executor.fix_offset_before_match(offset);
                    if self.closure(input, recognizer, new_cfg, reach, false, eof_as_epsilon, already_accepted)? {
                        accepted_alts.insert(cfg.alt);
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn matching_target(&self, tr: &Transition, t: isize) -> Option<crate::transition::ATNStateRef> {
        if tr.matches(t, MIN_CHAR, MAX_CHAR) {
            Some(tr.target())
        } else {
            None
        }
    }

    /// Epsilon closure (§4.G.6/§4.G.8): follows every chain of non-consuming
    /// transitions from `config`, evaluating predicates along the way and
    /// rejecting `Precedence` transitions (§7 class 3, lexer-invalid).
    /// Returns whether this call (directly or through recursion) added a
    /// rule-stop config — callers use this to mark the config's alt as
    /// having accepted for non-greedy suppression (§4.G.5).
    ///
    /// `already_accepted` is a snapshot (taken once by `reach`, unchanged
    /// across this whole recursion) of whether some other config of this
    /// same alt already reached an accept state during the current `reach`
    /// call; it gates whether a "still waiting" config at a non-greedy
    /// decision gets added at all (§4.G.6).
    fn closure<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        recognizer: &mut R,
        config: LexerATNConfig,
        configs: &mut ATNConfigSet,
        speculative: bool,
        eof_as_epsilon: bool,
        already_accepted: bool,
    ) -> Result<bool, LexerError> {
        let state = self.atn.state(config.state);
        if state.is_rule_stop() {
            if config.context.is_empty() {
                configs.add(config);
                return Ok(true);
            }
            // The context can carry both an empty path (this rule was also
            // entered as a top-level alternative, with nothing to return to)
            // and one or more real return states (this rule was also reached
            // via a `Rule` transition from a caller). Both must be handled,
            // not just whichever one `get_return_state(0)` happens to be
            // (§4.G.6): accept directly for the empty path, and separately
            // pop back into every caller and keep matching its rule body.
            let mut accepted = false;
            if config.context.has_empty_path() {
                configs.add(config.clone());
                accepted = true;
            }
            for i in 0..config.context.size() {
                let return_state = config.context.get_return_state(i);
                if return_state == EMPTY_RETURN_STATE {
                    continue;
                }
                let new_cfg = LexerATNConfig {
                    state: return_state,
                    alt: config.alt,
                    context: config.context.get_parent(i),
                    passed_through_non_greedy_decision: config.passed_through_non_greedy_decision,
                    lexer_action_executor: config.lexer_action_executor.clone(),
                };
                accepted |= self.closure(input, recognizer, new_cfg, configs, speculative, eof_as_epsilon, already_accepted)?;
            }
            return Ok(accepted);
        }

        // A config sitting at a state with at least one consuming
        // transition is a "waiting point" for the next `reach` call and must
        // be recorded now, not just recursed through — otherwise it's lost
        // the moment closure returns and no input can ever be matched past
        // this state (§4.G.6).
        if !state.only_has_epsilon_transitions()
            && !(already_accepted && config.passed_through_non_greedy_decision)
        {
            configs.add(config.clone());
        }

        let non_greedy = state.is_non_greedy_decision();
        let transitions = state.transitions.clone();
        let mut accepted = false;
        for tr in &transitions {
            match tr {
                Transition::Epsilon { target } => {
                    let new_cfg = config.transition_to(*target, non_greedy);
                    accepted |= self.closure(input, recognizer, new_cfg, configs, speculative, eof_as_epsilon, already_accepted)?;
                }
                Transition::Rule { target, follow_state, .. } => {
                    let new_context = self.context_cache.create(config.context.clone(), *follow_state);
                    let new_cfg = LexerATNConfig {
                        state: *target,
                        alt: config.alt,
                        context: new_context,
                        passed_through_non_greedy_decision: config.passed_through_non_greedy_decision,
                        lexer_action_executor: config.lexer_action_executor.clone(),
                    };
                    accepted |= self.closure(input, recognizer, new_cfg, configs, speculative, eof_as_epsilon, already_accepted)?;
                }
                Transition::Predicate { rule_index, pred_index, .. } => {
                    configs.set_has_semantic_context(true);
                    if self.evaluate_predicate(input, recognizer, *rule_index, *pred_index, speculative) {
                        let new_cfg = config.transition_to(tr.target(), false);
                        accepted |= self.closure(input, recognizer, new_cfg, configs, speculative, eof_as_epsilon, already_accepted)?;
                    }
                }
                Transition::Action { target, action_index } => {
                    // Actions within referenced rules (non-empty, non-return
                    // call stack) are suppressed: only a start-rule action
                    // gets recorded (§4.G.8, an acknowledged limitation).
                    let new_cfg = if config.context.is_empty() || config.context.has_empty_path() {
                        let action = self.atn.lexer_action(*action_index).clone();
                        let executor = LexerActionExecutor::append(&config.lexer_action_executor, Arc::new(action));
                        LexerATNConfig {
                            state: *target,
                            alt: config.alt,
                            context: config.context.clone(),
                            passed_through_non_greedy_decision: config.passed_through_non_greedy_decision,
                            lexer_action_executor: executor,
                        }
                    } else {
                        config.transition_to(*target, false)
                    };
                    accepted |= self.closure(input, recognizer, new_cfg, configs, speculative, eof_as_epsilon, already_accepted)?;
                }
                Transition::Precedence { .. } => {
                    return Err(LexerError::PrecedenceInLexer { state: config.state });
                }
                Transition::Atom { .. } | Transition::Range { .. } | Transition::Set { .. } => {
                    if eof_as_epsilon && tr.matches(EOF, MIN_CHAR, MAX_CHAR) {
                        let new_cfg = config.transition_to(tr.target(), false);
                        accepted |= self.closure(input, recognizer, new_cfg, configs, speculative, eof_as_epsilon, already_accepted)?;
                    }
                }
                Transition::NotSet { .. } => {}
            }
        }
        Ok(accepted)
    }

    /// Evaluates a semantic predicate (§4.G.9). A speculative evaluation
    /// temporarily consumes one character first, so position-sensitive
    /// predicates see the same state the lexer will see once this transition
    /// actually commits, then restores `index`/`line`/`column` exactly.
    fn evaluate_predicate<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        recognizer: &mut R,
        rule_index: usize,
        pred_index: usize,
        speculative: bool,
    ) -> bool {
        if !speculative {
            return recognizer.sempred(rule_index, pred_index);
        }
        let saved_index = input.index();
        let saved_line = self.line;
        let saved_column = self.column;
        let _guard = MarkGuard::new(input);
        if input.la(1) != EOF {
            let t = input.la(1);
            input.consume();
            self.update_line_column(t);
        }
        let result = recognizer.sempred(rule_index, pred_index);
        input.seek(saved_index);
        self.line = saved_line;
        self.column = saved_column;
        result
    }

    fn update_line_column(&mut self, consumed: isize) {
        if consumed == '\n' as isize {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    /// Arbitration once `execATN`'s loop has stopped (§4.G.10): the longest
    /// accepting state seen wins; if none was ever seen, the match fails with
    /// `NoViableAlt` and the input is rewound to `start_index`.
    fn fail_or_accept<R: Recognizer>(
        &mut self,
        input: &mut dyn CharStream,
        _recognizer: &mut R,
        prev_accept: Option<(usize, Arc<DFAState>)>,
        dead_end_configs: &ATNConfigSet,
    ) -> Result<SimResult, LexerError> {
        match prev_accept {
            Some((index, state)) => {
                input.seek(index);
                Ok(SimResult {
                    token_type: state.prediction,
                    lexer_action_executor: state.lexer_action_executor.clone(),
                })
            }
            None => {
                input.seek(self.start_index);
                if input.la(1) == EOF {
                    return Ok(SimResult {
                        token_type: crate::token::TOKEN_EOF,
                        lexer_action_executor: LexerActionExecutor::empty(),
                    });
                }
                let offending = input.get_text(crate::interval_set::Interval::new(
                    self.start_index as isize,
                    input.index() as isize,
                ));
                Err(LexerError::no_viable_alt(self.start_index, dead_end_configs, &self.atn, &offending))
            }
        }
    }
}
