//! End-to-end grammar scenarios (§8): each builds a small ATN by hand with
//! [`ATNBuilder`] and drives it through [`Lexer`] exactly as a generated
//! lexer would, checking the observable token sequence.

use std::cell::Cell;
use std::sync::Arc;

use lexatn::atn::{ATNBuilder, ATNType, ATN};
use lexatn::char_stream::InputStream;
use lexatn::errors::LexerError;
use lexatn::lexer::{ErrorListener, Lexer};
use lexatn::lexer_action::LexerAction;
use lexatn::recognizer::{NullRecognizer, Recognizer};
use lexatn::token::{CommonToken, Token, DEFAULT_MODE, TOKEN_EOF};
use lexatn::token_factory::CommonTokenFactory;
use lexatn::transition::Transition;

/// A fixed-char (or fixed-range) plus-loop rule: `start --c--> s1 -eps-> decision`,
/// `decision --c--> s1` (continue, tried first) and `decision -eps-> stop` (exit).
/// Matches `c+` with greedy (maximal-munch) semantics.
fn add_plus_loop_rule(
    b: &mut ATNBuilder,
    mode: usize,
    rule_index: usize,
    token_type: isize,
    make: impl Fn(usize) -> Transition,
) {
    let start = b.add_rule_start_state(rule_index);
    let s1 = b.add_state(rule_index);
    let decision = b.add_decision_state(rule_index, false);
    let stop = b.add_rule_stop_state(rule_index);
    b.add_transition(start, make(s1));
    b.add_transition(s1, Transition::Epsilon { target: decision });
    b.add_transition(decision, make(s1));
    b.add_transition(decision, Transition::Epsilon { target: stop });
    b.define_rule(mode, rule_index, token_type, start, stop);
}

fn digit_range(target: usize) -> Transition {
    Transition::Range { target, lo: '0' as isize, hi: '9' as isize }
}

fn lower_range(target: usize) -> Transition {
    Transition::Range { target, lo: 'a' as isize, hi: 'z' as isize }
}

/// `WS: [ \t\n]+ -> skip ;`
fn add_ws_skip_rule(b: &mut ATNBuilder, mode: usize, rule_index: usize, token_type: isize) {
    let ws_set = {
        let mut s = lexatn::interval_set::IntervalSet::new();
        s.add_one(' ' as isize);
        s.add_one('\t' as isize);
        s.add_one('\n' as isize);
        s
    };
    let make = |target: usize| Transition::Set { target, set: ws_set.clone() };

    let start = b.add_rule_start_state(rule_index);
    let s1 = b.add_state(rule_index);
    let decision = b.add_decision_state(rule_index, false);
    let action_state = b.add_state(rule_index);
    let stop = b.add_rule_stop_state(rule_index);
    b.add_transition(start, make(s1));
    b.add_transition(s1, Transition::Epsilon { target: decision });
    b.add_transition(decision, make(s1));
    b.add_transition(decision, Transition::Epsilon { target: action_state });
    let skip_idx = b.register_lexer_action(LexerAction::Skip);
    b.add_transition(action_state, Transition::Action { target: stop, action_index: skip_idx });
    b.define_rule(mode, rule_index, token_type, start, stop);
}

struct RecordingListener {
    errors: Vec<String>,
}

impl RecordingListener {
    fn new() -> Self {
        RecordingListener { errors: Vec::new() }
    }
}

impl ErrorListener for RecordingListener {
    fn syntax_error(&mut self, error: &LexerError) {
        self.errors.push(error.to_string());
    }
}

fn new_lexer(atn: Arc<ATN>) -> Lexer<NullRecognizer, CommonTokenFactory> {
    Lexer::new(atn, NullRecognizer, CommonTokenFactory, "<test>")
}

#[test]
fn maximal_munch_int_and_skipped_whitespace() {
    const INT: isize = 1;
    const WS: isize = 2;

    let mut b = ATNBuilder::new(ATNType::Lexer);
    add_plus_loop_rule(&mut b, DEFAULT_MODE, 0, INT, digit_range);
    add_ws_skip_rule(&mut b, DEFAULT_MODE, 1, WS);
    let atn = b.build();

    let mut lexer = new_lexer(atn);
    let mut input = InputStream::new("  123 45");
    let mut listener = RecordingListener::new();

    let t1: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t1.get_token_type(), INT);
    assert_eq!(t1.get_text(), Some("123"));

    let t2: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t2.get_token_type(), INT);
    assert_eq!(t2.get_text(), Some("45"));

    let eof: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(eof.get_token_type(), TOKEN_EOF);
    assert!(listener.errors.is_empty());
}

#[test]
fn alternative_priority_breaks_length_ties_by_declaration_order() {
    const IF: isize = 1;
    const ID: isize = 2;
    const WS: isize = 3;

    let mut b = ATNBuilder::new(ATNType::Lexer);

    // IF: 'if' ; declared first, so it wins a length tie against ID.
    let if_start = b.add_rule_start_state(0);
    let if_mid = b.add_state(0);
    let if_stop = b.add_rule_stop_state(0);
    b.add_transition(if_start, Transition::Atom { target: if_mid, code_point: 'i' as isize });
    b.add_transition(if_mid, Transition::Atom { target: if_stop, code_point: 'f' as isize });
    b.define_rule(DEFAULT_MODE, 0, IF, if_start, if_stop);

    // ID: [a-z]+ ;
    add_plus_loop_rule(&mut b, DEFAULT_MODE, 1, ID, lower_range);

    add_ws_skip_rule(&mut b, DEFAULT_MODE, 2, WS);

    let atn = b.build();
    let mut lexer = new_lexer(atn);
    let mut input = InputStream::new("ifx if");
    let mut listener = RecordingListener::new();

    let t1: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t1.get_token_type(), ID);
    assert_eq!(t1.get_text(), Some("ifx"));

    let t2: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t2.get_token_type(), IF);
    assert_eq!(t2.get_text(), Some("if"));

    let eof: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(eof.get_token_type(), TOKEN_EOF);
    assert!(listener.errors.is_empty());
}

#[test]
fn non_greedy_comment_stops_at_first_close() {
    const COMMENT: isize = 1;
    const WS: isize = 2;

    let mut b = ATNBuilder::new(ATNType::Lexer);

    // COMMENT: '/*' .*? '*/' ;
    // `decision`'s two outgoing transitions are both epsilon, so a config
    // that takes either one is marked `passed_through_non_greedy_decision`;
    // actual character consumption happens at the states past each epsilon.
    let start = b.add_rule_start_state(0);
    let after_open = b.add_state(0);
    let loop_entry = b.add_state(0);
    let decision = b.add_decision_state(0, true);
    let close_attempt = b.add_state(0);
    let star2 = b.add_state(0);
    let any_char_entry = b.add_state(0);
    let stop = b.add_rule_stop_state(0);

    b.add_transition(start, Transition::Atom { target: after_open, code_point: '/' as isize });
    b.add_transition(after_open, Transition::Atom { target: loop_entry, code_point: '*' as isize });
    b.add_transition(loop_entry, Transition::Epsilon { target: decision });
    // exit first (non-greedy priority): try to close the comment
    b.add_transition(decision, Transition::Epsilon { target: close_attempt });
    // stay in the loop: consume any character and re-enter the decision
    b.add_transition(decision, Transition::Epsilon { target: any_char_entry });
    b.add_transition(close_attempt, Transition::Atom { target: star2, code_point: '*' as isize });
    b.add_transition(star2, Transition::Atom { target: stop, code_point: '/' as isize });
    b.add_transition(any_char_entry, Transition::NotSet { target: loop_entry, set: lexatn::interval_set::IntervalSet::new() });
    b.define_rule(DEFAULT_MODE, 0, COMMENT, start, stop);

    add_ws_skip_rule(&mut b, DEFAULT_MODE, 1, WS);

    let atn = b.build();
    let mut lexer = new_lexer(atn);
    let mut input = InputStream::new("/* a */ /* b */");
    let mut listener = RecordingListener::new();

    let t1: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t1.get_token_type(), COMMENT);
    assert_eq!(t1.get_text(), Some("/* a */"));

    let t2: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t2.get_token_type(), COMMENT);
    assert_eq!(t2.get_text(), Some("/* b */"));

    let eof: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(eof.get_token_type(), TOKEN_EOF);
    assert!(listener.errors.is_empty());
}

#[test]
fn mode_switch_pushes_and_pops_across_a_nested_word() {
    const OPEN: isize = 1;
    const CLOSE: isize = 2;
    const WORD: isize = 3;

    let mut b = ATNBuilder::new(ATNType::Lexer);
    let inner_mode = b.add_mode();

    // OPEN: '<<' -> pushMode(INNER) ;  (default mode)
    let open_start = b.add_rule_start_state(0);
    let open_mid = b.add_state(0);
    let open_action = b.add_state(0);
    let open_stop = b.add_rule_stop_state(0);
    b.add_transition(open_start, Transition::Atom { target: open_mid, code_point: '<' as isize });
    b.add_transition(open_mid, Transition::Atom { target: open_action, code_point: '<' as isize });
    let push_idx = b.register_lexer_action(LexerAction::PushMode { mode: inner_mode });
    b.add_transition(open_action, Transition::Action { target: open_stop, action_index: push_idx });
    b.define_rule(DEFAULT_MODE, 0, OPEN, open_start, open_stop);

    // CLOSE: '>>' -> popMode ;  (INNER mode)
    let close_start = b.add_rule_start_state(1);
    let close_mid = b.add_state(1);
    let close_action = b.add_state(1);
    let close_stop = b.add_rule_stop_state(1);
    b.add_transition(close_start, Transition::Atom { target: close_mid, code_point: '>' as isize });
    b.add_transition(close_mid, Transition::Atom { target: close_action, code_point: '>' as isize });
    let pop_idx = b.register_lexer_action(LexerAction::PopMode);
    b.add_transition(close_action, Transition::Action { target: close_stop, action_index: pop_idx });
    b.define_rule(inner_mode, 1, CLOSE, close_start, close_stop);

    // WORD: [a-z]+ ;  (INNER mode)
    add_plus_loop_rule(&mut b, inner_mode, 2, WORD, lower_range);

    let atn = b.build();
    let mut lexer = new_lexer(atn);
    let mut input = InputStream::new("<<abc>>");
    let mut listener = RecordingListener::new();

    let t1: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t1.get_token_type(), OPEN);
    assert_eq!(t1.get_text(), Some("<<"));
    assert_eq!(lexer.mode(), inner_mode);

    let t2: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t2.get_token_type(), WORD);
    assert_eq!(t2.get_text(), Some("abc"));

    let t3: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t3.get_token_type(), CLOSE);
    assert_eq!(t3.get_text(), Some(">>"));
    assert_eq!(lexer.mode(), DEFAULT_MODE);

    let eof: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(eof.get_token_type(), TOKEN_EOF);
    assert!(listener.errors.is_empty());
}

/// `sempred` returns `true` only on its first call, modeling `isFive`'s
/// claim of being true only at the start of the text "5".
struct TrueOnceRecognizer {
    calls: Cell<usize>,
}

impl Recognizer for TrueOnceRecognizer {
    fn sempred(&mut self, _rule_index: usize, _pred_index: usize) -> bool {
        let n = self.calls.get();
        self.calls.set(n + 1);
        n == 0
    }

    fn action(&mut self, _rule_index: usize, _action_index: usize) {}
}

#[test]
fn predicate_gated_rule_then_recoverable_no_viable_alt() {
    const NUM: isize = 1;
    const WS: isize = 2;

    let mut b = ATNBuilder::new(ATNType::Lexer);

    // NUM: {isFive()}? [0-9]+ ;
    let start = b.add_rule_start_state(0);
    let after_pred = b.add_state(0);
    add_plus_loop_rule_from(&mut b, 0, NUM, after_pred, digit_range, start, |b, rule_index, target| {
        b.add_transition(
            target,
            Transition::Predicate { target: after_pred, rule_index, pred_index: 0, is_ctx_dependent: false },
        );
    });

    add_ws_skip_rule(&mut b, DEFAULT_MODE, 1, WS);

    let atn = b.build();
    let mut lexer: Lexer<TrueOnceRecognizer, CommonTokenFactory> =
        Lexer::new(atn, TrueOnceRecognizer { calls: Cell::new(0) }, CommonTokenFactory, "<test>");
    let mut input = InputStream::new("5 7");
    let mut listener = RecordingListener::new();

    let t1: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t1.get_token_type(), NUM);
    assert_eq!(t1.get_text(), Some("5"));

    // "7" no longer satisfies the predicate: NoViableAlt is reported, then
    // recovered (one code point skipped) and the driver reaches EOF.
    let t2: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(t2.get_token_type(), TOKEN_EOF);
    assert_eq!(listener.errors.len(), 1);
}

/// Helper used only by the predicate scenario: builds `start -eps-> pred_state`
/// then wires the predicate edge in via `wire_pred`, followed by the same
/// plus-loop shape `add_plus_loop_rule` uses from `after_pred` onward.
fn add_plus_loop_rule_from(
    b: &mut ATNBuilder,
    rule_index: usize,
    token_type: isize,
    after_pred: usize,
    make: impl Fn(usize) -> Transition,
    start: usize,
    wire_pred: impl FnOnce(&mut ATNBuilder, usize, usize),
) {
    let pred_state = b.add_state(rule_index);
    b.add_transition(start, Transition::Epsilon { target: pred_state });
    wire_pred(b, rule_index, pred_state);

    let s1 = b.add_state(rule_index);
    let decision = b.add_decision_state(rule_index, false);
    let stop = b.add_rule_stop_state(rule_index);
    b.add_transition(after_pred, make(s1));
    b.add_transition(s1, Transition::Epsilon { target: decision });
    b.add_transition(decision, make(s1));
    b.add_transition(decision, Transition::Epsilon { target: stop });
    b.define_rule(DEFAULT_MODE, rule_index, token_type, start, stop);
}

#[test]
fn eof_on_empty_input_returns_eof_directly() {
    const A: isize = 1;

    let mut b = ATNBuilder::new(ATNType::Lexer);
    let start = b.add_rule_start_state(0);
    let stop = b.add_rule_stop_state(0);
    b.add_transition(start, Transition::Atom { target: stop, code_point: 'a' as isize });
    b.define_rule(DEFAULT_MODE, 0, A, start, stop);
    let atn = b.build();

    let mut lexer = new_lexer(atn);
    let mut input = InputStream::new("");
    let mut listener = RecordingListener::new();

    let tok: CommonToken = lexer.next_token_with(&mut input, &mut listener).unwrap();
    assert_eq!(tok.get_token_type(), TOKEN_EOF);
    assert!(listener.errors.is_empty());
}
