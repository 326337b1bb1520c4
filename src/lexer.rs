//! The lexer driver (§4.H): `nextToken`'s retry loop around the simulator,
//! mode stack, `SKIP`/`MORE` handling, and error recovery.

use std::sync::Arc;

use log::{debug, trace};

use crate::atn::ATN;
use crate::char_stream::CharStream;
use crate::errors::LexerError;
use crate::int_stream::IntStream;
use crate::interval_set::Interval;
use crate::lexer_action::LexerActionEffects;
use crate::lexer_atn_simulator::LexerATNSimulator;
use crate::recognizer::Recognizer;
use crate::token::{MORE, SKIP, TOKEN_DEFAULT_CHANNEL, TOKEN_EOF};
use crate::token_factory::{TokenFactory, TokenSource};

/// A listener notified of lexical errors (§7), mirroring the ANTLR runtimes'
/// `ErrorListener` seam. The default implementation just traces them.
pub trait ErrorListener {
    fn syntax_error(&mut self, error: &LexerError);
}

#[derive(Default)]
pub struct ConsoleErrorListener;

impl ErrorListener for ConsoleErrorListener {
    fn syntax_error(&mut self, error: &LexerError) {
        debug!("lexer error: {error}");
    }
}

/// Drives one [`LexerATNSimulator`] over one [`CharStream`] to produce a
/// stream of tokens (§1, §4.H). Generic over the recognizer (predicates and
/// actions) and the token factory, matching the upstream runtimes' design of
/// keeping the driver grammar-agnostic.
pub struct Lexer<R, TF>
where
    R: Recognizer,
    TF: TokenFactory,
{
    simulator: LexerATNSimulator,
    recognizer: R,
    factory: TF,
    source_name: String,
    mode_stack: Vec<usize>,
    token_start_index: usize,
    token_start_line: isize,
    token_start_column: isize,
    text_override: Option<String>,
    channel: isize,
    token_index: isize,
}

impl<R, TF> Lexer<R, TF>
where
    R: Recognizer,
    TF: TokenFactory,
{
    pub fn new(atn: Arc<ATN>, recognizer: R, factory: TF, source_name: impl Into<String>) -> Self {
        Lexer {
            simulator: LexerATNSimulator::new(atn),
            recognizer,
            factory,
            source_name: source_name.into(),
            mode_stack: Vec::new(),
            token_start_index: 0,
            token_start_line: 1,
            token_start_column: 0,
            text_override: None,
            channel: TOKEN_DEFAULT_CHANNEL,
            token_index: 0,
        }
    }

    pub fn mode(&self) -> usize {
        self.simulator.mode()
    }

    pub fn push_mode(&mut self, mode: usize) {
        self.mode_stack.push(self.simulator.mode());
        self.simulator.set_mode(mode);
    }

    /// §7 class 2: popping past the bottom of the stack is a lexer error, not
    /// a panic — grammars that mismatch `pushMode`/`popMode` should see it as
    /// a recoverable, reported condition.
    pub fn pop_mode(&mut self) -> Result<usize, LexerError> {
        let previous = self.mode_stack.pop().ok_or(LexerError::EmptyModePop)?;
        self.simulator.set_mode(previous);
        Ok(previous)
    }

    /// Recognizes and returns the next token (§4.H.1), transparently
    /// retrying on `SKIP`/`MORE` and on recoverable lexical errors (§4.H.4).
    pub fn next_token(&mut self, input: &mut dyn CharStream) -> Result<TF::Tok, LexerError> {
        self.next_token_with(input, &mut ConsoleErrorListener)
    }

    pub fn next_token_with(
        &mut self,
        input: &mut dyn CharStream,
        listener: &mut dyn ErrorListener,
    ) -> Result<TF::Tok, LexerError> {
        // `accumulating` is set once a rule fires `-> more`: the next match's
        // text is appended to what's already been consumed instead of
        // restarting the token at the new position (§4.H.2).
        let mut accumulating = false;
        loop {
            if !accumulating {
                self.token_start_index = input.index();
                self.token_start_line = self.simulator.line();
                self.token_start_column = self.simulator.column();
                self.channel = TOKEN_DEFAULT_CHANNEL;
            }
            self.text_override = None;

            if input.la(1) == crate::int_stream::EOF {
                return Ok(self.emit_eof());
            }

            match self.simulator.match_(input, &mut self.recognizer) {
                Ok(result) => {
                    let effects = self.run_actions(input, &result);
                    let token_type = effects.type_override.unwrap_or(result.token_type);

                    if let Some(mode) = effects.mode {
                        self.simulator.set_mode(mode);
                    }
                    if let Some(mode) = effects.push_mode {
                        self.push_mode(mode);
                    }
                    if effects.pop_mode {
                        self.pop_mode()?;
                    }
                    if let Some(channel) = effects.channel_override {
                        self.channel = channel;
                    }

                    if effects.skip || token_type == SKIP {
                        trace!("skip at index {}", self.token_start_index);
                        accumulating = false;
                        continue;
                    }
                    if effects.more || token_type == MORE {
                        trace!("more at index {}", self.token_start_index);
                        accumulating = true;
                        continue;
                    }
                    return Ok(self.emit(input, token_type));
                }
                // §7: `NoViableAlt` is recoverable — report it, skip one code
                // point, and let the driver try again from there. Every other
                // class (mode-stack misuse, malformed ATN, stream misuse) is
                // fatal and propagates to the caller.
                Err(err @ LexerError::NoViableAlt { .. }) => {
                    listener.syntax_error(&err);
                    if input.la(1) != crate::int_stream::EOF {
                        input.consume();
                    }
                    accumulating = false;
                    continue;
                }
                Err(err) => {
                    listener.syntax_error(&err);
                    return Err(err);
                }
            }
        }
    }

    /// Executes the winning rule's deferred actions (§4.E). Position-dependent
    /// offsets were already bound relative to token start while the simulator
    /// walked `reach` (§4.G.5); here we only replay them.
    fn run_actions(&mut self, input: &mut dyn CharStream, result: &crate::lexer_atn_simulator::SimResult) -> LexerActionEffects {
        if result.lexer_action_executor.is_empty() {
            return LexerActionEffects::default();
        }
        result.lexer_action_executor.execute(&mut self.recognizer, input, self.token_start_index)
    }

    fn emit(&mut self, input: &mut dyn CharStream, token_type: isize) -> TF::Tok {
        let stop = input.index().saturating_sub(1);
        let text = self.text_override.take().or_else(|| {
            Some(input.get_text(Interval::new(self.token_start_index as isize, stop as isize)))
        });
        let index = self.token_index;
        self.token_index += 1;
        self.factory.create(
            &TokenSource { source_name: &self.source_name },
            token_type,
            text,
            self.channel,
            self.token_start_index,
            stop,
            self.token_start_line,
            self.token_start_column,
            index,
        )
    }

    fn emit_eof(&mut self) -> TF::Tok {
        let index = self.token_index;
        self.token_index += 1;
        self.factory.create(
            &TokenSource { source_name: &self.source_name },
            TOKEN_EOF,
            Some(String::new()),
            TOKEN_DEFAULT_CHANNEL,
            self.token_start_index,
            self.token_start_index.saturating_sub(1),
            self.simulator.line(),
            self.simulator.column(),
            index,
        )
    }
}
