// Copyright 2025 Cowboy AI, LLC.

//! # AMMap Domain
//!
//! Composition-space algebra for alloy design tasks.
//!
//! A task document declares elemental spaces (sets of chemical elements),
//! design spaces (simplices spanned by basis vectors over an elemental space)
//! and a division count. Loading it produces:
//! - **Master elements**: the sorted union of every declared element, the one
//!   coordinate system all compositions share
//! - **Expanded bases**: each design space's basis rewritten in master
//!   coordinates
//! - **Compositional graphs**: the simplex lattice of each design space, with
//!   node compositions, unit-transfer adjacency and pure-component corners
//! - **Queries**: hover formulas, corner labels, plotting coordinates, path
//!   planning and thermodynamic feasibility
//!
//! ## Design Principles
//!
//! 1. **Validate first**: malformed documents fail before anything is built,
//!    with the path of the offending field
//! 2. **Isolation**: one design space failing to build never affects another
//! 3. **Immutability**: a built [`Task`] is read-only and shareable across threads
//! 4. **Replaceable seams**: lattice enumeration and thermodynamics sit behind
//!    [`GridLibrary`] and [`ThermoEngine`]
//!
//! ```
//! use ammap_domain::Task;
//!
//! let task = Task::from_yaml_str(r#"
//! name: binary
//! nDivisionsPerDimension: 2
//! elementalSpaces:
//!   - name: AB
//!     elements: [A, B]
//! designSpaces:
//!   - name: ABspace
//!     elementalSpace: AB
//! "#).unwrap();
//!
//! assert_eq!(
//!     task.hover_formulas(None).unwrap(),
//!     vec!["(  0) A100.0", "(  1) A50.0 B50.0", "(  2) B100.0"]
//! );
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod design_space;
pub mod elemental_space;
mod errors;
pub mod graph;
pub mod grid;
pub mod master;
pub mod query;
pub mod spec;
mod task;
pub mod thermo;

pub use config::BuildOptions;
pub use design_space::{
    declared_active_elements, design_space_elements, DesignSpace, ExpandedBasis,
};
pub use elemental_space::{ElementalSpace, ElementalSpaceRegistry};
pub use errors::{TaskError, TaskResult};
pub use graph::{CompositionalGraph, GraphNode};
pub use grid::{GridError, GridLibrary, SimplexGrid, SimplexLattice};
pub use master::MasterElementSet;
pub use spec::{
    task_spec_schema, ConstraintSpec, DesignSpaceSpec, ElementalSpaceSpec, PathPlanStep,
    SpecPath, SpecValidator, TaskSpec,
};
pub use task::{Task, TaskBuilder};
pub use thermo::{evaluate_feasibility, PhaseAssemblage, ThermoEngine};
