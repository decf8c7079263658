// Copyright 2025 Cowboy AI, LLC.

//! Bundled simplex lattice backend.
//!
//! Ordering: points are listed in descending lexicographic order of their
//! barycentric tuple, so the first point is `(n, 0, …, 0)` and the last is
//! `(0, …, 0, n)`.
//!
//! Adjacency: two points are neighbours when one becomes the other by moving
//! a single unit from one coordinate to another.

use std::collections::HashMap;

use tracing::debug;

use super::{GridError, GridLibrary, SimplexLattice};

/// Simplex lattice backend with a node-count guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplexGrid {
    max_nodes: usize,
}

impl Default for SimplexGrid {
    fn default() -> Self {
        Self {
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }
}

impl SimplexGrid {
    /// Node limit used by [`SimplexGrid::default`].
    pub const DEFAULT_MAX_NODES: usize = 2_000_000;

    /// Backend refusing lattices larger than `max_nodes`.
    pub fn with_max_nodes(max_nodes: usize) -> Self {
        Self { max_nodes }
    }

    /// Configured node limit
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Number of lattice points, `C(divisions + dimension - 1, dimension - 1)`,
    /// checked against overflow and the node limit.
    pub fn node_count(&self, dimension: usize, divisions: u32) -> Result<usize, GridError> {
        if dimension == 0 {
            return Err(GridError::Backend("simplex dimension must be at least 1".to_string()));
        }
        let too_large = GridError::LatticeTooLarge {
            dimension,
            divisions,
            limit: self.max_nodes,
        };
        let count = binomial(u64::from(divisions) + dimension as u64 - 1, dimension as u64 - 1)
            .ok_or_else(|| too_large.clone())?;
        match usize::try_from(count) {
            Ok(count) if count <= self.max_nodes => Ok(count),
            _ => Err(too_large),
        }
    }

    fn points(&self, dimension: usize, divisions: u32) -> Result<Vec<Vec<u32>>, GridError> {
        let count = self.node_count(dimension, divisions)?;
        let mut points = Vec::with_capacity(count);
        let mut current = vec![0u32; dimension];
        fill(&mut current, 0, divisions, &mut points);
        Ok(points)
    }
}

impl GridLibrary for SimplexGrid {
    fn enumerate_simplex_lattice(
        &self,
        dimension: usize,
        divisions: u32,
    ) -> Result<SimplexLattice, GridError> {
        let points = self.points(dimension, divisions)?;
        let rank: HashMap<&[u32], usize> = points
            .iter()
            .enumerate()
            .map(|(i, point)| (point.as_slice(), i))
            .collect();

        let mut neighbors = Vec::with_capacity(points.len());
        let mut scratch = vec![0u32; dimension];
        for point in &points {
            let mut adjacent = Vec::new();
            for from in (0..dimension).filter(|&from| point[from] > 0) {
                for to in (0..dimension).filter(|&to| to != from) {
                    scratch.copy_from_slice(point);
                    scratch[from] -= 1;
                    scratch[to] += 1;
                    if let Some(&j) = rank.get(scratch.as_slice()) {
                        adjacent.push(j);
                    }
                }
            }
            adjacent.sort_unstable();
            neighbors.push(adjacent);
        }

        debug!(dimension, divisions, nodes = points.len(), "enumerated simplex lattice");
        Ok(SimplexLattice { points, neighbors })
    }

    fn project_lattice(
        &self,
        basis: &[Vec<f64>],
        divisions: u32,
    ) -> Result<Vec<Vec<f64>>, GridError> {
        let columns = basis.first().map(Vec::len).unwrap_or(0);
        if basis.iter().any(|row| row.len() != columns) {
            return Err(GridError::RaggedBasis);
        }
        let scale = f64::from(divisions);
        let points = self.points(basis.len(), divisions)?;
        Ok(points
            .iter()
            .map(|point| {
                let mut composition = vec![0.0; columns];
                for (weight, row) in point.iter().zip(basis) {
                    if *weight == 0 {
                        continue;
                    }
                    let fraction = f64::from(*weight) / scale;
                    for (slot, value) in composition.iter_mut().zip(row) {
                        *slot += fraction * value;
                    }
                }
                composition
            })
            .collect())
    }

    fn pure_component_indices(
        &self,
        dimension: usize,
        divisions: u32,
    ) -> Result<Vec<usize>, GridError> {
        let total = self.node_count(dimension, divisions)?;
        // Points preceding corner k are exactly those with a non-zero
        // coordinate before position k.
        (0..dimension)
            .map(|k| {
                let tail = dimension - k;
                binomial(u64::from(divisions) + tail as u64 - 1, tail as u64 - 1)
                    .and_then(|tail_count| usize::try_from(tail_count).ok())
                    .map(|tail_count| total - tail_count)
                    .ok_or(GridError::LatticeTooLarge {
                        dimension,
                        divisions,
                        limit: self.max_nodes,
                    })
            })
            .collect()
    }
}

fn fill(current: &mut [u32], pos: usize, remaining: u32, out: &mut Vec<Vec<u32>>) {
    if pos + 1 == current.len() {
        current[pos] = remaining;
        out.push(current.to_vec());
        return;
    }
    for value in (0..=remaining).rev() {
        current[pos] = value;
        fill(current, pos + 1, remaining - value, out);
    }
}

/// `C(n, k)` with overflow detection.
fn binomial(n: u64, k: u64) -> Option<u128> {
    let k = k.min(n.saturating_sub(k));
    let mut result: u128 = 1;
    for i in 1..=u128::from(k) {
        result = result.checked_mul(u128::from(n - k) + i)? / i;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_dimensional_lattice_order_and_adjacency() {
        let lattice = SimplexGrid::default().enumerate_simplex_lattice(2, 2).unwrap();
        assert_eq!(lattice.points, vec![vec![2, 0], vec![1, 1], vec![0, 2]]);
        assert_eq!(lattice.neighbors, vec![vec![1], vec![0, 2], vec![1]]);
    }

    #[test]
    fn three_dimensional_lattice_is_triangular() {
        let lattice = SimplexGrid::default().enumerate_simplex_lattice(3, 2).unwrap();
        assert_eq!(
            lattice.points,
            vec![
                vec![2, 0, 0],
                vec![1, 1, 0],
                vec![1, 0, 1],
                vec![0, 2, 0],
                vec![0, 1, 1],
                vec![0, 0, 2],
            ]
        );
        // interior edge points touch four others, corners touch two
        assert_eq!(lattice.neighbors[0], vec![1, 2]);
        assert_eq!(lattice.neighbors[1], vec![0, 2, 3, 4]);
        assert_eq!(lattice.neighbors[5], vec![2, 4]);
    }

    #[test]
    fn node_count_matches_enumeration() {
        let grid = SimplexGrid::default();
        for dimension in 1..=5 {
            for divisions in 1..=6 {
                let lattice = grid.enumerate_simplex_lattice(dimension, divisions).unwrap();
                assert_eq!(lattice.len(), grid.node_count(dimension, divisions).unwrap());
            }
        }
        assert_eq!(grid.node_count(4, 12).unwrap(), 455);
    }

    #[test]
    fn pure_indices_point_at_corners() {
        let grid = SimplexGrid::default();
        let lattice = grid.enumerate_simplex_lattice(4, 3).unwrap();
        let corners = grid.pure_component_indices(4, 3).unwrap();
        assert_eq!(corners.len(), 4);
        for (k, index) in corners.into_iter().enumerate() {
            let point = &lattice.points[index];
            assert_eq!(point[k], 3);
            assert_eq!(point.iter().sum::<u32>(), 3);
        }
    }

    #[test]
    fn projection_weights_basis_rows() {
        let basis = vec![vec![0.5, 0.5, 0.0], vec![0.0, 0.0, 1.0]];
        let compositions = SimplexGrid::default().project_lattice(&basis, 2).unwrap();
        assert_eq!(
            compositions,
            vec![
                vec![0.5, 0.5, 0.0],
                vec![0.25, 0.25, 0.5],
                vec![0.0, 0.0, 1.0],
            ]
        );
    }

    #[test]
    fn oversized_lattice_rejected() {
        let grid = SimplexGrid::with_max_nodes(10);
        let err = grid.enumerate_simplex_lattice(3, 4).unwrap_err();
        assert!(matches!(err, GridError::LatticeTooLarge { limit: 10, .. }));
        let err = SimplexGrid::default().enumerate_simplex_lattice(60, 200).unwrap_err();
        assert!(matches!(err, GridError::LatticeTooLarge { .. }));
    }

    #[test]
    fn ragged_basis_rejected() {
        let err = SimplexGrid::default()
            .project_lattice(&[vec![1.0, 0.0], vec![1.0]], 2)
            .unwrap_err();
        assert_eq!(err, GridError::RaggedBasis);
    }

    #[test]
    fn zero_dimension_is_a_backend_error() {
        let err = SimplexGrid::default().enumerate_simplex_lattice(0, 2).unwrap_err();
        assert!(matches!(err, GridError::Backend(_)));
    }
}
