use std::collections::HashMap;

/// Name-to-slot table with shadowing.
///
/// `define` records what the name was bound to before, so a later
/// `restore_to` can unwind a whole scope in one call. `mark` takes a
/// checkpoint before a scope opens; `restore_to` rebinds (or unbinds) every
/// name defined since, in reverse order, which is what makes nested
/// same-name shadowing come back out correctly.
pub struct ScopeTable<V: Copy> {
    slots: HashMap<String, V>,
    shadows: Vec<(String, Option<V>)>,
}

impl<V: Copy> ScopeTable<V> {
    pub fn new() -> Self {
        ScopeTable {
            slots: HashMap::new(),
            shadows: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<V> {
        self.slots.get(name).copied()
    }

    /// Binds `name`, remembering the previous binding on the shadow stack.
    pub fn define(&mut self, name: &str, value: V) {
        let previous = self.slots.insert(name.to_string(), value);
        self.shadows.push((name.to_string(), previous));
    }

    /// Checkpoint for the current scope depth.
    pub fn mark(&self) -> usize {
        self.shadows.len()
    }

    /// Unwinds every binding made since `checkpoint`.
    pub fn restore_to(&mut self, checkpoint: usize) {
        while self.shadows.len() > checkpoint {
            let (name, previous) = self.shadows.pop().unwrap();
            match previous {
                Some(value) => {
                    self.slots.insert(name, value);
                }
                None => {
                    self.slots.remove(&name);
                }
            }
        }
    }

    /// Drops everything. Used at function entry, where no outer bindings
    /// exist to restore.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.shadows.clear();
    }
}

impl<V: Copy> Default for ScopeTable<V> {
    fn default() -> Self {
        ScopeTable::new()
    }
}
