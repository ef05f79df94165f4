use std::collections::{HashMap, HashSet};

use crate::ast::ast::Prototype;

/// State that outlives any single compilation unit: the live
/// operator-precedence table and the function-prototype cache.
///
/// The parser reads the table; only the code generator writes it, and only
/// while finalizing a `binary<op>` definition. Keeping both tables behind one
/// context object (instead of globals) is what makes the install/rollback
/// protocol testable on its own.
pub struct Session {
    op_precedence: HashMap<char, i32>,
    protos: HashMap<String, Prototype>,
    /// Names whose defining body was already generated this session. MCJIT
    /// resolves a symbol against the module that first defined it, so a
    /// second body for the same name would be silently ignored at existing
    /// call sites; it is rejected up front instead.
    defined: HashSet<String>,
    anon_counter: u32,
}

impl Session {
    pub fn new() -> Self {
        let mut op_precedence = HashMap::new();
        // 1 is lowest precedence.
        op_precedence.insert('=', 2);
        op_precedence.insert('<', 10);
        op_precedence.insert('+', 20);
        op_precedence.insert('-', 20);
        op_precedence.insert('*', 40);

        Session {
            op_precedence,
            protos: HashMap::new(),
            defined: HashSet::new(),
            anon_counter: 0,
        }
    }

    /// Binding strength of `op`, or -1 when the operator is undefined. -1
    /// compares lower than every real precedence, so an undefined operator
    /// terminates precedence climbing.
    pub fn precedence_of(&self, op: char) -> i32 {
        self.op_precedence.get(&op).copied().unwrap_or(-1)
    }

    /// Installs `op`, returning the precedence it displaced so a failed
    /// definition can hand it back to [`Session::restore_operator`].
    pub fn install_operator(&mut self, op: char, precedence: i32) -> Option<i32> {
        self.op_precedence.insert(op, precedence)
    }

    /// Rollback half of the protocol: called when the unit defining `op`
    /// failed to generate. `previous` is whatever `install_operator`
    /// displaced; the table ends up exactly as it was before the unit, so
    /// a failed redefinition of an existing operator does not erase it.
    pub fn restore_operator(&mut self, op: char, previous: Option<i32>) {
        match previous {
            Some(precedence) => self.op_precedence.insert(op, precedence),
            None => self.op_precedence.remove(&op),
        };
    }

    /// Marks `name` as carrying a body somewhere in this session.
    pub fn mark_defined(&mut self, name: &str) {
        self.defined.insert(name.to_string());
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// Records the latest prototype seen for `name`, overwriting any stale
    /// declaration-only entry. Consulted when a call site needs a declaration
    /// that the currently-open unit has not emitted.
    pub fn register_proto(&mut self, proto: Prototype) {
        self.protos.insert(proto.name.clone(), proto);
    }

    pub fn lookup_proto(&self, name: &str) -> Option<&Prototype> {
        self.protos.get(name)
    }

    /// A fresh name for the next anonymous top-level expression.
    pub fn next_anon_name(&mut self) -> String {
        let name = format!("__anon_expr{}", self.anon_counter);
        self.anon_counter += 1;
        name
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}
