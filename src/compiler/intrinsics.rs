//! Runtime functions callable from generated code.
//!
//! These are plain `extern "C"` Rust functions; the session wires their
//! addresses into the execution engine whenever a module declares one of
//! them without a body. They write to stderr so evaluation results on
//! stdout stay machine-readable.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::io::Write;

/// Prints the character for a float's integer value. Always returns 0.0.
pub extern "C" fn putchard(x: f64) -> f64 {
    eprint!("{}", x as u8 as char);
    let _ = std::io::stderr().flush();
    0.0
}

/// Prints a float followed by a newline. Always returns 0.0.
pub extern "C" fn printd(x: f64) -> f64 {
    eprintln!("{:.6}", x);
    0.0
}

lazy_static! {
    /// Name to address, for [`ExecutionEngine::add_global_mapping`].
    ///
    /// [`ExecutionEngine::add_global_mapping`]:
    /// inkwell::execution_engine::ExecutionEngine::add_global_mapping
    pub static ref INTRINSICS: HashMap<&'static str, usize> = {
        let mut map = HashMap::new();
        map.insert("putchard", putchard as usize);
        map.insert("printd", printd as usize);
        map
    };
}
