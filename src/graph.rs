// Copyright 2025 Cowboy AI, LLC.

//! Compositional graphs: discretized design-space simplices in master
//! coordinates.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BuildOptions;
use crate::design_space::ExpandedBasis;
use crate::errors::{TaskError, TaskResult};
use crate::grid::GridLibrary;

/// One lattice node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Barycentric lattice coordinate, summing to the division count
    pub lattice: Vec<u32>,
    /// Composition over the master element set
    pub composition: Vec<f64>,
}

/// Discretized simplex graph of one design space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionalGraph {
    design_space: String,
    divisions: u32,
    nodes: Vec<GraphNode>,
    neighbors: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
    components_master: ExpandedBasis,
    pure_component_indices: Vec<usize>,
}

impl CompositionalGraph {
    /// Assemble the graph of `basis` at `divisions` using `grid`.
    ///
    /// Grid failures and inconsistent grid output surface as
    /// [`TaskError::Internal`]; a zero dimension or division count is a
    /// [`TaskError::Configuration`].
    pub fn build(
        grid: &dyn GridLibrary,
        design_space: impl Into<String>,
        basis: ExpandedBasis,
        divisions: u32,
        options: &BuildOptions,
    ) -> TaskResult<Self> {
        let design_space = design_space.into();
        let dimension = basis.dimension();
        if dimension < 1 {
            return Err(TaskError::configuration(format!(
                "design space '{design_space}' has a zero-dimensional basis"
            )));
        }
        if divisions < 1 {
            return Err(TaskError::configuration(format!(
                "design space '{design_space}' needs at least one division, got {divisions}"
            )));
        }

        let lattice = grid.enumerate_simplex_lattice(dimension, divisions)?;
        let compositions = grid.project_lattice(basis.rows(), divisions)?;
        let pure_component_indices = grid.pure_component_indices(dimension, divisions)?;

        if lattice.neighbors.len() != lattice.len() || compositions.len() != lattice.len() {
            return Err(TaskError::internal(format!(
                "grid returned {} points, {} neighbour lists and {} compositions",
                lattice.len(),
                lattice.neighbors.len(),
                compositions.len()
            )));
        }
        if pure_component_indices.len() != dimension
            || pure_component_indices.iter().any(|&i| i >= lattice.len())
        {
            return Err(TaskError::internal(format!(
                "grid returned invalid pure component indices {pure_component_indices:?}"
            )));
        }

        let mut edges = BTreeSet::new();
        for (i, adjacent) in lattice.neighbors.iter().enumerate() {
            for &j in adjacent {
                if j >= lattice.len() {
                    return Err(TaskError::internal(format!(
                        "grid neighbour {j} of node {i} is out of range"
                    )));
                }
                if i != j {
                    edges.insert((i.min(j), i.max(j)));
                }
            }
        }

        let mut nodes = Vec::with_capacity(lattice.len());
        for (index, (point, composition)) in
            lattice.points.into_iter().zip(compositions).enumerate()
        {
            check_composition(index, &composition, options.tolerance)?;
            nodes.push(GraphNode {
                lattice: point,
                composition,
            });
        }

        debug!(
            design_space = %design_space,
            dimension,
            divisions,
            nodes = nodes.len(),
            edges = edges.len(),
            "assembled compositional graph"
        );
        Ok(Self {
            design_space,
            divisions,
            nodes,
            neighbors: lattice.neighbors,
            edges: edges.into_iter().collect(),
            components_master: basis,
            pure_component_indices,
        })
    }

    /// Owning design space
    pub fn design_space(&self) -> &str {
        &self.design_space
    }

    /// Division count the lattice was built with
    pub fn divisions(&self) -> u32 {
        self.divisions
    }

    /// Simplex dimension (number of basis vectors)
    pub fn dimension(&self) -> usize {
        self.components_master.dimension()
    }

    /// Nodes in lattice order
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Undirected edges, each stored once as `(low, high)`, sorted
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Neighbour lists as reported by the grid
    pub fn neighbor_lists(&self) -> &[Vec<usize>] {
        &self.neighbors
    }

    /// Neighbours of one node
    pub fn neighbors(&self, node: usize) -> Option<&[usize]> {
        self.neighbors.get(node).map(Vec::as_slice)
    }

    /// Cartesian compositions in node order
    pub fn compositions(&self) -> impl Iterator<Item = &[f64]> {
        self.nodes.iter().map(|node| node.composition.as_slice())
    }

    /// Expanded basis the compositions were projected through
    pub fn components_master(&self) -> &ExpandedBasis {
        &self.components_master
    }

    /// Lattice index of each basis corner
    pub fn pure_component_indices(&self) -> &[usize] {
        &self.pure_component_indices
    }

    /// Node closest to a waypoint.
    ///
    /// A waypoint with one entry per basis vector is read as basis fractions
    /// and compared against normalized lattice coordinates; one with an entry
    /// per master element is compared against Cartesian compositions. Ties
    /// resolve to the lowest index. Non-finite entries are rejected.
    pub fn nearest_node(&self, waypoint: &[f64]) -> TaskResult<usize> {
        if let Some(value) = waypoint.iter().find(|v| !v.is_finite()) {
            return Err(TaskError::configuration(format!(
                "waypoint entry {value} in design space '{}' is not finite",
                self.design_space
            )));
        }
        let by_basis = if waypoint.len() == self.dimension() {
            true
        } else if waypoint.len() == self.components_master.column_count() {
            false
        } else {
            return Err(TaskError::configuration(format!(
                "waypoint has {} entries; design space '{}' expects {} basis fractions or {} element fractions",
                waypoint.len(),
                self.design_space,
                self.dimension(),
                self.components_master.column_count()
            )));
        };
        let scale = f64::from(self.divisions);
        let distance = |node: &GraphNode| -> f64 {
            if by_basis {
                node.lattice
                    .iter()
                    .zip(waypoint)
                    .map(|(&x, w)| (f64::from(x) / scale - w).powi(2))
                    .sum()
            } else {
                node.composition
                    .iter()
                    .zip(waypoint)
                    .map(|(c, w)| (c - w).powi(2))
                    .sum()
            }
        };

        self.nodes
            .iter()
            .map(distance)
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((i, d)),
            })
            .map(|(i, _)| i)
            .ok_or_else(|| {
                TaskError::internal(format!("graph '{}' has no nodes", self.design_space))
            })
    }

    /// Shortest path from `from` to `to` through nodes accepted by `allowed`.
    ///
    /// Both endpoints must be allowed. Returns `None` when no such path exists.
    pub fn shortest_path(
        &self,
        from: usize,
        to: usize,
        allowed: impl Fn(usize) -> bool,
    ) -> Option<Vec<usize>> {
        if from >= self.len() || to >= self.len() || !allowed(from) || !allowed(to) {
            return None;
        }
        let mut previous: Vec<Option<usize>> = vec![None; self.len()];
        let mut visited = vec![false; self.len()];
        let mut queue = VecDeque::from([from]);
        visited[from] = true;

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(prev) = previous[cursor] {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for &next in &self.neighbors[current] {
                if !visited[next] && allowed(next) {
                    visited[next] = true;
                    previous[next] = Some(current);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

fn check_composition(index: usize, composition: &[f64], tolerance: f64) -> TaskResult<()> {
    if let Some(value) = composition.iter().find(|v| **v < -tolerance || !v.is_finite()) {
        return Err(TaskError::internal(format!("node {index} has invalid fraction {value}")));
    }
    let total: f64 = composition.iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(TaskError::internal(format!("node {index} composition sums to {total}")));
    }
    Ok(())
}
