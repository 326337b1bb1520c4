//! Token factory contract (§4.K, §6) and the default `CommonTokenFactory`.

use std::rc::Rc;

use crate::token::CommonToken;

/// Source-pair argument mirrors the upstream `(TokenSource, CharStream)` pair;
/// only the source name is needed by the reference factory.
pub struct TokenSource<'a> {
    pub source_name: &'a str,
}

pub trait TokenFactory {
    type Tok: crate::token::Token;

    #[allow(clippy::too_many_arguments)]
    fn create(
        &self,
        source: &TokenSource<'_>,
        token_type: isize,
        text: Option<String>,
        channel: isize,
        start: usize,
        stop: usize,
        line: isize,
        column: isize,
        token_index: isize,
    ) -> Self::Tok;
}

#[derive(Default)]
pub struct CommonTokenFactory;

impl TokenFactory for CommonTokenFactory {
    type Tok = CommonToken;

    fn create(
        &self,
        source: &TokenSource<'_>,
        token_type: isize,
        text: Option<String>,
        channel: isize,
        start: usize,
        stop: usize,
        line: isize,
        column: isize,
        token_index: isize,
    ) -> CommonToken {
        CommonToken {
            token_type,
            channel,
            start,
            stop,
            line,
            column,
            token_index,
            text,
            source_name: Rc::from(source.source_name),
        }
    }
}
