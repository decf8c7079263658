// Copyright 2025 Cowboy AI, LLC.

//! Master coordinate system shared by every design space of a task.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::elemental_space::ElementalSpaceRegistry;

/// Sorted, deduplicated union of all elements referenced by a task.
///
/// The position of an element in this set is its column in every expanded
/// basis and every Cartesian composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MasterElementSet {
    elements: Vec<String>,
    index: HashMap<String, usize>,
}

impl MasterElementSet {
    /// Build the master set from every registered elemental space.
    pub fn build(registry: &ElementalSpaceRegistry) -> Self {
        Self::from_elements(
            registry
                .iter()
                .flat_map(|space| space.elements().iter().cloned()),
        )
    }

    /// Build a master set from arbitrary element symbols.
    pub fn from_elements(elements: impl IntoIterator<Item = String>) -> Self {
        let elements: Vec<String> = elements
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = elements
            .iter()
            .enumerate()
            .map(|(pos, element)| (element.clone(), pos))
            .collect();
        Self { elements, index }
    }

    /// Column of an element, if it belongs to the set.
    pub fn idx(&self, element: &str) -> Option<usize> {
        self.index.get(element).copied()
    }

    /// True when the element belongs to the set.
    pub fn contains(&self, element: &str) -> bool {
        self.index.contains_key(element)
    }

    /// Elements in column order.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Iterate elements in column order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when no element is registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl From<Vec<String>> for MasterElementSet {
    fn from(elements: Vec<String>) -> Self {
        Self::from_elements(elements)
    }
}

impl From<MasterElementSet> for Vec<String> {
    fn from(set: MasterElementSet) -> Self {
        set.elements
    }
}

impl Display for MasterElementSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.elements.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ElementalSpaceSpec;

    fn registry(spaces: &[(&str, &[&str])]) -> ElementalSpaceRegistry {
        let specs: Vec<_> = spaces
            .iter()
            .map(|(name, elements)| ElementalSpaceSpec {
                name: name.to_string(),
                elements: elements.iter().map(|e| e.to_string()).collect(),
                database_ref: None,
            })
            .collect();
        ElementalSpaceRegistry::register(&specs).unwrap()
    }

    #[test]
    fn union_is_sorted_and_deduplicated() {
        let master =
            MasterElementSet::build(&registry(&[("AB", &["A", "B"]), ("BC", &["C", "B"])]));
        assert_eq!(master.elements(), &["A", "B", "C"]);
        assert_eq!(master.idx("C"), Some(2));
        assert_eq!(master.idx("D"), None);
    }

    #[test]
    fn build_is_independent_of_declaration_order() {
        let a =
            MasterElementSet::build(&registry(&[("NiCr", &["Ni", "Cr"]), ("FeV", &["V", "Fe"])]));
        let b =
            MasterElementSet::build(&registry(&[("FeV", &["V", "Fe"]), ("NiCr", &["Ni", "Cr"])]));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "[Cr, Fe, Ni, V]");
    }

    #[test]
    fn serializes_as_plain_list() {
        let master = MasterElementSet::from_elements(vec!["B".to_string(), "A".to_string()]);
        let json = serde_json::to_string(&master).unwrap();
        assert_eq!(json, r#"["A","B"]"#);
        let back: MasterElementSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.idx("B"), Some(1));
    }
}
