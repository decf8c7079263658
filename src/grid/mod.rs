// Copyright 2025 Cowboy AI, LLC.

//! Simplex lattice capability.
//!
//! Graph assembly never enumerates lattices itself; it asks a [`GridLibrary`]
//! for the lattice points, their neighbour lists, the Cartesian projection of
//! a basis and the pure-component corners. [`SimplexGrid`] is the bundled
//! implementation; any other backend can be swapped in behind the trait.

mod simplex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::TaskError;

pub use simplex::SimplexGrid;

/// Failures reported by a grid backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Node count does not fit the platform or the configured limit
    #[error("simplex lattice of dimension {dimension} with {divisions} divisions has too many nodes (limit {limit})")]
    LatticeTooLarge {
        /// Simplex dimension
        dimension: usize,
        /// Division count
        divisions: u32,
        /// Configured node limit
        limit: usize,
    },

    /// Basis rows of different lengths
    #[error("basis rows must share one length")]
    RaggedBasis,

    /// Backend-specific failure
    #[error("grid backend failure: {0}")]
    Backend(String),
}

impl From<GridError> for TaskError {
    fn from(err: GridError) -> Self {
        TaskError::Internal(err.to_string())
    }
}

/// Lattice points of a discretized simplex and their adjacency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplexLattice {
    /// Barycentric coordinates, each summing to the division count
    pub points: Vec<Vec<u32>>,
    /// Neighbour indices for each point
    pub neighbors: Vec<Vec<usize>>,
}

impl SimplexLattice {
    /// Number of lattice points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the lattice has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Lattice enumeration, adjacency and projection for an N-dimensional simplex.
///
/// Implementations must be pure (same inputs, same outputs and ordering) and
/// safe to call from several threads at once. All three operations must agree
/// on point ordering for a given `(dimension, divisions)`.
#[cfg_attr(test, mockall::automock)]
pub trait GridLibrary: Send + Sync {
    /// Every integer composition of `divisions` into `dimension` parts, with
    /// the neighbour list of each.
    fn enumerate_simplex_lattice(
        &self,
        dimension: usize,
        divisions: u32,
    ) -> Result<SimplexLattice, GridError>;

    /// Cartesian composition of each lattice point: the point divided by
    /// `divisions`, weighted over `basis` rows.
    fn project_lattice(
        &self,
        basis: &[Vec<f64>],
        divisions: u32,
    ) -> Result<Vec<Vec<f64>>, GridError>;

    /// Index of the lattice point at 100% of each basis dimension.
    fn pure_component_indices(
        &self,
        dimension: usize,
        divisions: u32,
    ) -> Result<Vec<usize>, GridError>;
}
