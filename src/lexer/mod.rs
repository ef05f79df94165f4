//! Lexical analysis.
//!
//! `tokens` defines the token set, `lexer` the regex-driven tokenizer, and
//! `source` the two ways tokens reach the parser: a buffered whole-file
//! source and a line-at-a-time interactive source.

pub mod lexer;
pub mod source;
pub mod tokens;
