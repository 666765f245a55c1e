//! Name-to-value bindings supplied per evaluation.

use indexmap::IndexMap;
use permit_core::{Receiver, Value};

/// Values for the names a rule refers to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    values: IndexMap<String, Value>,
}

impl Binding {
    /// Create an empty binding
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Bind a value
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind a capability-bearing object
    #[must_use]
    pub fn with_object<R: Receiver + 'static>(self, name: impl Into<String>, receiver: R) -> Self {
        self.with(name, Value::object(receiver))
    }

    /// Bind a name to the absent placeholder
    #[must_use]
    pub fn with_absent(self, name: impl Into<String>) -> Self {
        self.with(name, Value::Absent)
    }

    /// Bind a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Look up a name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether a name is bound, even to the absent placeholder
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bound names
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Binding {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut binding = Self::new();
        for (name, value) in iter {
            binding.insert(name, value);
        }
        binding
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Binding {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_core::OperationTable;

    #[test]
    fn test_builder() {
        let binding = Binding::new()
            .with("limit", 5i64)
            .with_absent("page")
            .with_object("user", OperationTable::new("user"));
        assert_eq!(binding.len(), 3);
        assert_eq!(binding.get("limit"), Some(&Value::Int(5)));
        assert!(binding.contains("page"));
        assert_eq!(binding.get("page"), Some(&Value::Absent));
        assert!(binding.get("user").and_then(Value::as_receiver).is_some());
        assert!(binding.get("missing").is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut binding = Binding::new().with("a", true);
        let previous = binding.insert("a", false);
        assert_eq!(previous, Some(Value::Bool(true)));
        assert_eq!(binding.get("a"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_from_iterator_keeps_order() {
        let binding: Binding = vec![("b", "x"), ("a", "y")].into_iter().collect();
        assert_eq!(binding.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_extend() {
        let mut binding = Binding::new();
        binding.extend([("a", 1i64), ("b", 2i64)]);
        assert_eq!(binding.len(), 2);
        assert!(!binding.is_empty());
    }
}
