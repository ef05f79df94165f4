//! Error types for every stage of the pipeline.
//!
//! Parse failures report as `SyntaxError`; the code generator failures keep
//! their specific names so callers can tell an unbound variable from a bad
//! assignment target.

pub mod errors;

#[cfg(test)]
mod tests;
