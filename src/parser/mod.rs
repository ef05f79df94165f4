//! Recursive-descent parser with precedence climbing for expressions.
//!
//! The binary-operator grammar is not fixed: precedences come from the live
//! table in [`crate::session::session::Session`], which user `def binary<op>`
//! definitions extend at code-generation time.

pub mod expr;
pub mod item;
pub mod parser;
