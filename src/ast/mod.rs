//! The syntax tree: a closed set of expression variants plus the top-level
//! items (function definitions and extern declarations).

pub mod ast;
