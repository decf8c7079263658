// Copyright 2025 Cowboy AI, LLC.

//! Design spaces and their expansion into master coordinates.
//!
//! A design space is a linear reparameterization of an elemental space: each
//! basis vector is a mixture of the elemental space's elements, written in
//! that space's local coordinates. Expansion scatters every basis vector into
//! the task-wide [`MasterElementSet`] columns so all design spaces share one
//! coordinate system.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::elemental_space::{ElementalSpace, ElementalSpaceRegistry};
use crate::errors::{TaskError, TaskResult};
use crate::master::MasterElementSet;
use crate::spec::{DesignSpaceSpec, SpecPath};

/// Named basis over an elemental space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpace {
    name: String,
    elemental_space: String,
    elements: Vec<String>,
    basis: Vec<Vec<f64>>,
    identity: bool,
}

impl DesignSpace {
    /// Resolve a declared design space against the registry.
    ///
    /// A missing or empty basis becomes the identity basis of the elemental
    /// space. Each explicit row is normalized to unit sum; negative entries
    /// and all-zero rows are rejected.
    pub fn from_spec(
        spec: &DesignSpaceSpec,
        registry: &ElementalSpaceRegistry,
    ) -> TaskResult<Self> {
        let reference = spec.elemental_space_ref();
        let space = registry.get(reference).ok_or_else(|| {
            TaskError::schema(
                SpecPath::root().key("designSpaces"),
                format!(
                    "design space '{}' references unknown elemental space '{reference}'",
                    spec.name
                ),
            )
        })?;

        match spec.components.as_deref() {
            None | Some([]) => Ok(Self::identity(&spec.name, space)),
            Some(rows) => Self::with_basis(&spec.name, space, rows.to_vec()),
        }
    }

    /// Design space whose basis is the pure elements of `space`.
    pub fn identity(name: impl Into<String>, space: &ElementalSpace) -> Self {
        let dim = space.dimension();
        let basis = (0..dim)
            .map(|row| (0..dim).map(|col| if row == col { 1.0 } else { 0.0 }).collect())
            .collect();
        Self {
            name: name.into(),
            elemental_space: space.name().to_string(),
            elements: space.elements().to_vec(),
            basis,
            identity: true,
        }
    }

    /// Design space with an explicit basis in local coordinates.
    pub fn with_basis(
        name: impl Into<String>,
        space: &ElementalSpace,
        rows: Vec<Vec<f64>>,
    ) -> TaskResult<Self> {
        let name = name.into();
        if rows.is_empty() {
            return Err(TaskError::configuration(format!(
                "design space '{name}' has an empty basis"
            )));
        }
        let mut basis = Vec::with_capacity(rows.len());
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != space.dimension() {
                return Err(TaskError::configuration(format!(
                    "design space '{name}' basis vector {r} has {} entries, elemental space '{}' has {}",
                    row.len(),
                    space.name(),
                    space.dimension()
                )));
            }
            if row.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(TaskError::configuration(format!(
                    "design space '{name}' basis vector {r} must be finite and non-negative"
                )));
            }
            let total: f64 = row.iter().sum();
            if total <= 0.0 {
                return Err(TaskError::configuration(format!(
                    "design space '{name}' basis vector {r} sums to zero"
                )));
            }
            basis.push(row.into_iter().map(|v| v / total).collect());
        }
        Ok(Self {
            name,
            elemental_space: space.name().to_string(),
            elements: space.elements().to_vec(),
            basis,
            identity: false,
        })
    }

    /// Design space name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the underlying elemental space
    pub fn elemental_space(&self) -> &str {
        &self.elemental_space
    }

    /// Local elements of the underlying elemental space
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Normalized basis rows in local coordinates
    pub fn basis(&self) -> &[Vec<f64>] {
        &self.basis
    }

    /// Number of basis vectors, i.e. the simplex dimension
    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    /// True when the basis was defaulted to the pure elements
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Local elements carrying weight in at least one basis vector.
    pub fn active_elements(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(k, _)| self.basis.iter().any(|row| row[*k] != 0.0))
            .map(|(_, element)| element.as_str())
    }

    /// Scatter every basis vector into master coordinates.
    pub fn expand(&self, master: &MasterElementSet) -> TaskResult<ExpandedBasis> {
        let columns = self
            .elements
            .iter()
            .map(|element| {
                master.idx(element).ok_or_else(|| {
                    TaskError::configuration(format!(
                        "element '{element}' of design space '{}' is missing from the master set",
                        self.name
                    ))
                })
            })
            .collect::<TaskResult<Vec<usize>>>()?;

        let rows = self
            .basis
            .iter()
            .map(|local| {
                let mut expanded = vec![0.0; master.len()];
                for (k, value) in local.iter().enumerate() {
                    expanded[columns[k]] = *value;
                }
                expanded
            })
            .collect();
        Ok(ExpandedBasis {
            rows,
            columns: master.len(),
        })
    }
}

/// Sorted union of the active elements of several design spaces.
pub fn design_space_elements<'a>(spaces: impl IntoIterator<Item = &'a DesignSpace>) -> Vec<String> {
    spaces
        .into_iter()
        .flat_map(|space| space.active_elements().map(str::to_string).collect::<Vec<_>>())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Local elements a declared design space gives weight to, read from its
/// declaration so that a design space whose basis fails to build still
/// counts. Unknown elemental spaces contribute nothing.
pub fn declared_active_elements<'a>(
    spec: &DesignSpaceSpec,
    registry: &'a ElementalSpaceRegistry,
) -> Vec<&'a str> {
    let Some(space) = registry.get(spec.elemental_space_ref()) else {
        return Vec::new();
    };
    let rows = spec.components.as_deref().unwrap_or_default();
    space
        .elements()
        .iter()
        .enumerate()
        .filter(|(k, _)| {
            rows.is_empty() || rows.iter().any(|row| row.get(*k).is_some_and(|v| *v != 0.0))
        })
        .map(|(_, element)| element.as_str())
        .collect()
}

/// Basis matrix in master coordinates: one row per basis vector, one column
/// per master element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedBasis {
    rows: Vec<Vec<f64>>,
    columns: usize,
}

impl ExpandedBasis {
    /// Build from explicit rows, which must all have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> TaskResult<Self> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(r) = rows.iter().position(|row| row.len() != columns) {
            return Err(TaskError::configuration(format!(
                "basis row {r} has {} columns, expected {columns}",
                rows[r].len()
            )));
        }
        Ok(Self { rows, columns })
    }

    /// Basis rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// One row
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of basis vectors
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    /// Number of master columns
    pub fn column_count(&self) -> usize {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ElementalSpaceSpec;
    use pretty_assertions::assert_eq;

    fn space(name: &str, elements: &[&str]) -> ElementalSpace {
        ElementalSpace::new(name, elements.iter().map(|e| e.to_string()).collect(), None).unwrap()
    }

    fn master(elements: &[&str]) -> MasterElementSet {
        MasterElementSet::from_elements(elements.iter().map(|e| e.to_string()))
    }

    #[test]
    fn identity_expands_to_one_hot_master_columns() {
        let bc = space("BC", &["B", "C"]);
        let design = DesignSpace::identity("BC", &bc);
        let expanded = design.expand(&master(&["A", "B", "C"])).unwrap();
        assert_eq!(expanded.rows(), &[vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]);
        assert_eq!(expanded.column_count(), 3);
        assert_eq!(expanded.dimension(), 2);
    }

    #[test]
    fn explicit_basis_is_normalized_and_scattered() {
        let space = space("NiFeCr", &["Ni", "Fe", "Cr"]);
        let design =
            DesignSpace::with_basis("SS", &space, vec![vec![1.0, 3.0, 0.0], vec![0.0, 0.0, 2.0]])
                .unwrap();
        assert!(!design.is_identity());
        let expanded = design.expand(&master(&["Cr", "Fe", "Ni"])).unwrap();
        assert_eq!(
            expanded.rows(),
            &[vec![0.0, 0.75, 0.25], vec![1.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn negative_or_zero_rows_rejected() {
        let space = space("AB", &["A", "B"]);
        let err = DesignSpace::with_basis("neg", &space, vec![vec![1.0, -0.5]]).unwrap_err();
        assert!(matches!(err, TaskError::Configuration(_)));
        let err = DesignSpace::with_basis("zero", &space, vec![vec![0.0, 0.0]]).unwrap_err();
        assert!(err.to_string().contains("sums to zero"));
    }

    #[test]
    fn active_elements_skip_unused_columns() {
        let space = space("FeNiCr", &["Fe", "Ni", "Cr"]);
        let design =
            DesignSpace::with_basis("FeNi", &space, vec![vec![0.5, 0.5, 0.0], vec![1.0, 0.0, 0.0]])
                .unwrap();
        let active: Vec<_> = design.active_elements().collect();
        assert_eq!(active, vec!["Fe", "Ni"]);

        let other = DesignSpace::identity("Cr", &self::space("Cr", &["Cr"]));
        assert_eq!(design_space_elements([&design, &other]), vec!["Cr", "Fe", "Ni"]);
    }

    #[test]
    fn declared_elements_ignore_basis_validity() {
        let registry = ElementalSpaceRegistry::register(&[ElementalSpaceSpec {
            name: "FeNiCr".to_string(),
            elements: vec!["Fe".to_string(), "Ni".to_string(), "Cr".to_string()],
            database_ref: None,
        }])
        .unwrap();
        let declared = |components: Option<Vec<Vec<f64>>>| DesignSpaceSpec {
            name: "ds".to_string(),
            elemental_space: Some("FeNiCr".to_string()),
            components,
        };

        assert_eq!(
            declared_active_elements(&declared(None), &registry),
            vec!["Fe", "Ni", "Cr"]
        );
        let broken = declared(Some(vec![vec![0.0, -1.0, 0.0], vec![0.0, 0.0, 0.0]]));
        assert!(DesignSpace::from_spec(&broken, &registry).is_err());
        assert_eq!(declared_active_elements(&broken, &registry), vec!["Ni"]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = ExpandedBasis::from_rows(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("basis row 1"));
    }
}
