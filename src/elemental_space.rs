// Copyright 2025 Cowboy AI, LLC.

//! Elemental spaces: named element sets defining local coordinates

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{TaskError, TaskResult};
use crate::spec::{ElementalSpaceSpec, SpecPath};

/// Named, ordered set of chemical elements.
///
/// Element order fixes the local coordinate positions that design-space basis
/// vectors are written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementalSpace {
    name: String,
    elements: Vec<String>,
    database_ref: Option<String>,
}

impl ElementalSpace {
    /// Create an elemental space, rejecting empty or repeated element lists.
    pub fn new(
        name: impl Into<String>,
        elements: Vec<String>,
        database_ref: Option<String>,
    ) -> TaskResult<Self> {
        let name = name.into();
        if elements.is_empty() {
            return Err(TaskError::configuration(format!(
                "elemental space '{name}' has no elements"
            )));
        }
        for (pos, element) in elements.iter().enumerate() {
            if elements[..pos].contains(element) {
                return Err(TaskError::configuration(format!(
                    "elemental space '{name}' repeats element '{element}'"
                )));
            }
        }
        Ok(Self {
            name,
            elements,
            database_ref,
        })
    }

    /// Space name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Elements in declaration order
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Number of local coordinates
    pub fn dimension(&self) -> usize {
        self.elements.len()
    }

    /// Thermodynamic database reference, when declared
    pub fn database_ref(&self) -> Option<&str> {
        self.database_ref.as_deref()
    }

    /// Local position of an element
    pub fn position(&self, element: &str) -> Option<usize> {
        self.elements.iter().position(|e| e == element)
    }
}

/// Elemental spaces keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementalSpaceRegistry {
    spaces: IndexMap<String, ElementalSpace>,
}

impl ElementalSpaceRegistry {
    /// Register every declared elemental space.
    pub fn register(entries: &[ElementalSpaceSpec]) -> TaskResult<Self> {
        let root = SpecPath::root().key("elementalSpaces");
        let mut spaces = IndexMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if spaces.contains_key(&entry.name) {
                return Err(TaskError::schema(
                    root.index(i).key("name"),
                    format!("duplicate elemental space name '{}'", entry.name),
                ));
            }
            let space = ElementalSpace::new(
                entry.name.clone(),
                entry.elements.clone(),
                entry.database_ref.clone(),
            )
            .map_err(|err| TaskError::schema(root.index(i).key("elements"), err.to_string()))?;
            spaces.insert(entry.name.clone(), space);
        }
        Ok(Self { spaces })
    }

    /// Look up a space by name
    pub fn get(&self, name: &str) -> Option<&ElementalSpace> {
        self.spaces.get(name)
    }

    /// Iterate spaces in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ElementalSpace> {
        self.spaces.values()
    }

    /// Number of registered spaces
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}
