//! Classical variable storage.
//!
//! Classical variables are keyed `"name[index]"` and grow lazily on first
//! measurement, mirroring `DDSimulationState`'s `variables` map in the
//! original implementation (spec §3, "Lifecycle").

use serde::{Deserialize, Serialize};
use std::fmt;

use rustc_hash::FxHashMap;

/// The value kind of a classical variable. Only booleans exist today; the
/// shape leaves room for future widening without breaking callers (spec §6,
/// `Variable { name, type ∈ {Bool}, value }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassicalKind {
    Bool,
}

/// A single classical variable snapshot, as returned across the external
/// interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalVariable {
    pub name: String,
    pub kind: ClassicalKind,
    pub value: bool,
}

impl fmt::Display for ClassicalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Storage for all classical variables observed so far.
///
/// Insertion order is preserved so `getClassicalVariableName(index)` (spec
/// §2 external interface) is well defined.
#[derive(Debug, Clone, Default)]
pub struct ClassicalVariables {
    order: Vec<String>,
    values: FxHashMap<String, bool>,
}

impl ClassicalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a classical bit, initialized to `false`, if not already
    /// present (spec §4.B step 5: `creg` materializes `name[i]` variables).
    pub fn declare(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.values.insert(key.clone(), false);
            self.order.push(key);
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    pub fn variable_at(&self, index: usize) -> Option<ClassicalVariable> {
        let name = self.name_at(index)?;
        let value = self.values[name];
        Some(ClassicalVariable {
            name: name.to_string(),
            kind: ClassicalKind::Bool,
            value,
        })
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_idempotent_and_ordered() {
        let mut vars = ClassicalVariables::new();
        vars.declare("c[0]");
        vars.declare("c[1]");
        vars.declare("c[0]");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.name_at(0), Some("c[0]"));
        assert_eq!(vars.name_at(1), Some("c[1]"));
    }

    #[test]
    fn set_then_get() {
        let mut vars = ClassicalVariables::new();
        vars.declare("c[0]");
        vars.set("c[0]", true);
        assert_eq!(vars.get("c[0]"), Some(true));
    }
}
