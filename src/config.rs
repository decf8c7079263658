// Copyright 2025 Cowboy AI, LLC.

//! Build configuration for task construction

use serde::{Deserialize, Serialize};

use crate::grid::SimplexGrid;

/// Options controlling how a task builds its compositional graphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    /// Build design spaces on the rayon thread pool
    pub parallel: bool,
    /// Largest lattice the bundled grid backend will enumerate
    pub max_lattice_nodes: usize,
    /// Tolerance for composition sums and negativity checks
    pub tolerance: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            max_lattice_nodes: SimplexGrid::DEFAULT_MAX_NODES,
            tolerance: 1e-6,
        }
    }
}

impl BuildOptions {
    /// Enable or disable parallel design-space builds
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the lattice node limit
    pub fn with_max_lattice_nodes(mut self, max_lattice_nodes: usize) -> Self {
        self.max_lattice_nodes = max_lattice_nodes;
        self
    }

    /// Set the floating tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Grid backend honouring these options
    pub fn grid(&self) -> SimplexGrid {
        SimplexGrid::with_max_nodes(self.max_lattice_nodes)
    }
}
