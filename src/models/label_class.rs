// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label class registry.
//!
//! Classes are kept in insertion order. The index of a class doubles as its
//! palette slot, so colors stay stable across sessions.

use crate::error::{AppError, Result};
use crate::util::color::{class_color, Color};

/// A named, colored category assignable to shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelClass {
    pub name: String,
    pub index: usize,
    pub color: Color,
}

/// Ordered, duplicate-free set of label classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelClassRegistry {
    classes: Vec<LabelClass>,
}

impl LabelClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from stored names, skipping duplicates and blanks.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            if let Err(e) = registry.add_class(name.as_ref()) {
                log::warn!("Skipping stored label class: {}", e);
            }
        }
        registry
    }

    /// Register a new class and return its index.
    pub fn add_class(&mut self, name: &str) -> Result<usize> {
        if name.is_empty() {
            return Err(AppError::EmptyClassName);
        }
        if self.contains(name) {
            return Err(AppError::DuplicateClass {
                name: name.to_string(),
            });
        }

        let index = self.classes.len();
        self.classes.push(LabelClass {
            name: name.to_string(),
            index,
            color: class_color(index),
        });
        Ok(index)
    }

    /// All classes as `(name, color)` in insertion order.
    pub fn list_classes(&self) -> Vec<(&str, Color)> {
        self.classes
            .iter()
            .map(|c| (c.name.as_str(), c.color))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelClass> {
        self.classes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, index: usize) -> Option<&LabelClass> {
        self.classes.get(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    /// Color of the named class, or the unlabeled color for unknown names.
    pub fn color_of(&self, name: &str) -> Color {
        self.index_of(name)
            .map(|i| self.classes[i].color)
            .unwrap_or(Color::UNLABELED)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_class_assigns_insertion_index() {
        let mut registry = LabelClassRegistry::new();
        assert_eq!(registry.add_class("tumor").unwrap(), 0);
        assert_eq!(registry.add_class("stroma").unwrap(), 1);
        assert_eq!(registry.get(1).unwrap().name, "stroma");
        assert_eq!(registry.color_of("stroma"), class_color(1));
    }

    #[test]
    fn test_duplicate_name_leaves_registry_unchanged() {
        let mut registry = LabelClassRegistry::new();
        registry.add_class("tumor").unwrap();
        let before = registry.clone();

        let err = registry.add_class("tumor").unwrap_err();
        assert!(matches!(err, AppError::DuplicateClass { ref name } if name == "tumor"));
        assert_eq!(err.to_string(), "'tumor' already exists");
        assert_eq!(registry, before);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = LabelClassRegistry::new();
        assert!(matches!(registry.add_class(""), Err(AppError::EmptyClassName)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = LabelClassRegistry::new();
        registry.add_class("Cell").unwrap();
        assert!(registry.add_class("cell").is_ok());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_names_skips_duplicates() {
        let registry = LabelClassRegistry::from_names(["a", "b", "a", ""]);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.list_classes()[1], ("b", class_color(1)));
    }

    #[test]
    fn test_unknown_class_color() {
        let registry = LabelClassRegistry::new();
        assert_eq!(registry.color_of("missing"), Color::UNLABELED);
    }
}
