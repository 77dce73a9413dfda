//! Per-class record of declared property and method names.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Declarations found in one class body.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ClassDeclarations {
    pub properties: BTreeSet<String>,
    pub methods: BTreeSet<String>,
}

/// Index of declared members per fully qualified class name.
///
/// Built fresh from a single source-text scan and discarded after use;
/// there is deliberately no cross-run cache, so regeneration stays
/// idempotent even when files change between runs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DeclarationIndex {
    classes: BTreeMap<String, ClassDeclarations>,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, creating an empty declaration set for it.
    pub fn declare_class(&mut self, class: &str) {
        self.classes.entry(class.to_string()).or_default();
    }

    pub fn has_property(&self, class: &str, property: &str) -> bool {
        self.classes
            .get(class)
            .is_some_and(|decls| decls.properties.contains(property))
    }

    pub fn has_method(&self, class: &str, method: &str) -> bool {
        self.classes
            .get(class)
            .is_some_and(|decls| decls.methods.contains(method))
    }

    /// Record a property discovered during scanning.
    pub fn record_property(&mut self, class: &str, property: &str) {
        self.classes
            .entry(class.to_string())
            .or_default()
            .properties
            .insert(property.to_string());
    }

    /// Record a method, either discovered during scanning or synthesized
    /// during the current run (duplicate suppression).
    pub fn record_method(&mut self, class: &str, method: &str) {
        self.classes
            .entry(class.to_string())
            .or_default()
            .methods
            .insert(method.to_string());
    }

    pub fn get(&self, class: &str) -> Option<&ClassDeclarations> {
        self.classes.get(class)
    }

    /// Iterate classes in name order.
    pub fn classes(&self) -> impl Iterator<Item = (&String, &ClassDeclarations)> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Fold another index into this one (used when inspecting many files).
    pub fn merge(&mut self, other: DeclarationIndex) {
        for (class, decls) in other.classes {
            let entry = self.classes.entry(class).or_default();
            entry.properties.extend(decls.properties);
            entry.methods.extend(decls.methods);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_checks() {
        let mut index = DeclarationIndex::default();
        index.record_property("App\\Order", "id");
        index.record_method("App\\Order", "getId");

        assert!(index.has_property("App\\Order", "id"));
        assert!(index.has_method("App\\Order", "getId"));
        assert!(!index.has_method("App\\Order", "setId"));
        assert!(!index.has_method("App\\Other", "getId"));
    }

    #[test]
    fn test_merge() {
        let mut a = DeclarationIndex::default();
        a.record_method("App\\Order", "getId");

        let mut b = DeclarationIndex::default();
        b.record_method("App\\Order", "setId");
        b.record_property("App\\Tag", "name");

        a.merge(b);
        assert!(a.has_method("App\\Order", "getId"));
        assert!(a.has_method("App\\Order", "setId"));
        assert!(a.has_property("App\\Tag", "name"));
        assert_eq!(a.len(), 2);
    }
}
