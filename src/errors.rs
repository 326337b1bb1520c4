//! Error taxonomy (§7). One enum, matching the teacher crate's single
//! `BaseRecognitionError`-rooted hierarchy rather than a per-component zoo.

use thiserror::Error;

use crate::atn::ATN;
use crate::atn_config_set::ATNConfigSet;
use crate::char_stream::escape_for_error;
use crate::interval_set::IntervalSet;

/// A snapshot of the dead-end configuration set carried by [`LexerError::NoViableAlt`].
///
/// Stored separately from the live `ATNConfigSet` so the error can outlive
/// the simulation call that produced it. `expected` is the union of
/// [`ATN::next_tokens`] over every config's state: the set of code points
/// that would have let some alternative make progress.
#[derive(Clone, Debug, Default)]
pub struct ConfigSetSnapshot {
    pub size: usize,
    pub expected: IntervalSet,
}

impl ConfigSetSnapshot {
    pub fn from_configs(set: &ATNConfigSet, atn: &ATN) -> Self {
        let mut expected = IntervalSet::new();
        for cfg in set.iter() {
            expected = expected.union(&atn.next_tokens(cfg.state));
        }
        ConfigSetSnapshot { size: set.len(), expected }
    }
}

#[derive(Error, Debug, Clone)]
pub enum LexerError {
    /// §4.G.10, §7 class 1: no alternative survived to consume the input.
    /// `offending_text` is already escaped per §6.
    #[error("token recognition error at: '{offending_text}'")]
    NoViableAlt {
        start_index: usize,
        dead_end_configs: ConfigSetSnapshot,
        offending_text: String,
    },

    /// §7 class 2: `popMode` called with an empty mode stack.
    #[error("cannot pop mode: mode stack is empty")]
    EmptyModePop,

    /// §7 class 3: a `Precedence` transition is reachable during lexer closure.
    #[error("precedence predicate transition is not valid in a lexer (state {state})")]
    PrecedenceInLexer { state: usize },

    /// §7 class 4 (state/index half).
    #[error("invalid ATN state reference: {detail}")]
    InvalidState { detail: &'static str },

    /// §7 class 4 (IntervalSet/IntegerList half).
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// §7 class 5.
    #[error("attempt to mutate a read-only IntervalSet")]
    ReadOnlyIntervalSet,

    /// §7 class 6.
    #[error("nextToken called with no input stream attached")]
    NullInput,
}

impl LexerError {
    pub fn no_viable_alt(start_index: usize, dead_end_configs: &ATNConfigSet, atn: &ATN, offending_text: &str) -> Self {
        LexerError::NoViableAlt {
            start_index,
            dead_end_configs: ConfigSetSnapshot::from_configs(dead_end_configs, atn),
            offending_text: escape_for_error(offending_text),
        }
    }
}
