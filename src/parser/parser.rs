//! The Parser struct: a one-token-lookahead cursor over a [`TokenSource`].
//!
//! Parsing proper lives in `expr` (expressions) and `item` (top-level
//! units); this module only owns token consumption, expectation errors, and
//! resynchronization after a failed unit.

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::source::TokenSource,
    lexer::tokens::{Token, TokenKind},
    Position,
};

pub struct Parser {
    source: Box<dyn TokenSource>,
    /// The lookahead token. Always valid; `Eof` once the source runs dry.
    cur: Token,
}

impl Parser {
    /// Creates a parser and primes the lookahead, which may pull the first
    /// line from an interactive source.
    pub fn new(mut source: Box<dyn TokenSource>) -> Result<Self, Error> {
        let cur = source.next_token()?;
        Ok(Parser { source, cur })
    }

    pub fn current_token(&self) -> &Token {
        &self.cur
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.cur.kind
    }

    /// True when the lookahead is an `Operator` token with exactly `op`.
    pub fn current_is_operator(&self, op: char) -> bool {
        self.cur.kind == TokenKind::Operator && self.cur.operator_char() == op
    }

    /// Moves to the next token and returns the one just consumed. Fallible:
    /// a streaming source surfaces lexer errors here.
    pub fn advance(&mut self) -> Result<Token, Error> {
        let next = self.source.next_token()?;
        Ok(std::mem::replace(&mut self.cur, next))
    }

    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.cur.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: self.cur.value.clone(),
                    },
                    self.cur.span.start.clone(),
                )),
            }
        } else {
            self.advance()
        }
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Position of the lookahead token, for diagnostics.
    pub fn get_position(&self) -> Position {
        self.cur.span.start.clone()
    }

    /// After a failed unit: skip tokens until the next plausible top-level
    /// boundary. A `;` is consumed; `def`/`extern`/`Eof` are left in place.
    /// Errors while skipping are swallowed — this is already the error path.
    pub fn synchronize(&mut self) {
        loop {
            match self.cur.kind {
                TokenKind::Def | TokenKind::Extern | TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    let _ = self.advance();
                    break;
                }
                _ => {
                    if self.advance().is_err() {
                        break;
                    }
                }
            }
        }
    }
}
