//! A standalone lexer ATN simulator: runtime simulation of an Augmented
//! Transition Network over a character stream, with a lazily-built,
//! interned DFA cache per mode (§1).
//!
//! Entry points: build a grammar's [`atn::ATN`] with [`atn::ATNBuilder`],
//! wrap it in a [`lexer::Lexer`], and call [`lexer::Lexer::next_token`] in a
//! loop over a [`char_stream::CharStream`].

pub mod atn;
pub mod atn_config;
pub mod atn_config_set;
pub mod atn_state;
pub mod char_stream;
pub mod dfa;
pub mod errors;
pub mod int_stream;
pub mod interval_set;
pub mod lexer;
pub mod lexer_action;
pub mod lexer_atn_simulator;
pub mod prediction_context;
pub mod recognizer;
pub mod token;
pub mod token_factory;
pub mod transition;

pub use atn::{ATNBuilder, ATNType, ATN};
pub use char_stream::{CharStream, InputStream};
pub use errors::LexerError;
pub use lexer::Lexer;
pub use recognizer::{NullRecognizer, Recognizer};
pub use token::{CommonToken, Token};
pub use token_factory::{CommonTokenFactory, TokenFactory};
