//! Variable bindings for the evaluation session.

use std::collections::HashMap;

/// Storage for variable bindings: identifier → last-assigned value.
///
/// Values are stored as strings (possibly already-simplified expressions);
/// the store does not validate either side. Bindings are not persisted
/// directly; the engine rebuilds them by replaying the history at startup.
#[derive(Default, Debug, Clone)]
pub struct VariableStore {
    bindings: HashMap<String, String>,
}

impl VariableStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a binding (overwrites existing).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Get a binding by name. Absent lookups are a normal, silent case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(|v| v.as_str())
    }

    /// Check if a binding exists.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Remove all bindings. The store is always cleared as a unit.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// List all bindings, sorted by name for deterministic output.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut items: Vec<_> = self
            .bindings
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        items.sort_by_key(|(name, _)| *name);
        items
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_overwrite() {
        let mut vars = VariableStore::new();
        vars.set("a", "5");
        assert_eq!(vars.get("a"), Some("5"));

        vars.set("a", "7");
        assert_eq!(vars.get("a"), Some("7"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_absent_lookup_is_silent() {
        let vars = VariableStore::new();
        assert_eq!(vars.get("missing"), None);
        assert!(!vars.contains("missing"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut vars = VariableStore::new();
        vars.set("a", "1");
        vars.set("b", "2");
        vars.clear();
        assert!(vars.is_empty());
        assert_eq!(vars.get("a"), None);
    }

    #[test]
    fn test_list_is_name_sorted() {
        let mut vars = VariableStore::new();
        vars.set("b", "2");
        vars.set("a", "1");
        vars.set("c", "3");
        let names: Vec<&str> = vars.list().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
