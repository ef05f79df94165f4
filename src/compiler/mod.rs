//! LLVM code generation.
//!
//! Every value in the language is an `f64`, so the generated IR deals in one
//! type only. Mutable variables live in entry-block allocas and the
//! mem2reg pass turns them back into SSA registers; `if` is the only
//! construct that builds a phi by hand.

pub mod compiler;
pub mod expr;
pub mod intrinsics;
pub mod item;
pub mod scope;

#[cfg(test)]
mod tests;
