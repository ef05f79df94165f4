//! Process-wide compilation state and the drivers built on top of it.
//!
//! `session` holds the operator-precedence table and the function-prototype
//! cache; `driver` runs top-level units through the parser and code
//! generator, either JIT-executing them or accumulating an object module.

pub mod driver;
pub mod session;
