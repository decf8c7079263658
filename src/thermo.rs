// Copyright 2025 Cowboy AI, LLC.

//! Thermodynamic evaluation seam.
//!
//! Equilibrium solving lives outside this crate. A [`ThermoEngine`] is handed
//! one node composition and one constraint at a time and reports the phases it
//! finds; this module only decides feasibility from those answers.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::TaskResult;
use crate::graph::CompositionalGraph;
use crate::master::MasterElementSet;
use crate::spec::{ConstraintSpec, EquilibriumConstraint};

/// Phases present in an evaluated composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseAssemblage {
    /// Names of phases with non-zero amount
    pub phases: Vec<String>,
}

impl PhaseAssemblage {
    /// Assemblage from phase names
    pub fn new<I, S>(phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
        }
    }

    /// True when every phase is listed in `feasible`
    pub fn within(&self, feasible: &[String]) -> bool {
        let allowed: HashSet<&str> = feasible.iter().map(String::as_str).collect();
        self.phases.iter().all(|phase| allowed.contains(phase.as_str()))
    }
}

/// External equilibrium / Scheil solver.
pub trait ThermoEngine: Send + Sync {
    /// Evaluate a composition under one constraint.
    ///
    /// `elements` and `fractions` are parallel slices in master order.
    fn evaluate(
        &self,
        elements: &[String],
        fractions: &[f64],
        constraint: &ConstraintSpec,
    ) -> TaskResult<PhaseAssemblage>;
}

/// Feasibility flag for every node of `graph`, in node order.
///
/// A node is feasible when, for every equilibrium constraint, the engine's
/// phases all belong to that constraint's feasible phases. An engine failure
/// makes the node infeasible. Other constraint kinds are not judged here.
pub fn evaluate_feasibility(
    graph: &CompositionalGraph,
    master: &MasterElementSet,
    engine: &dyn ThermoEngine,
    constraints: &[ConstraintSpec],
) -> Vec<bool> {
    let equilibrium: Vec<(&ConstraintSpec, &EquilibriumConstraint)> = constraints
        .iter()
        .filter_map(|constraint| match constraint {
            ConstraintSpec::Equilibrium(eq) => Some((constraint, eq)),
            _ => None,
        })
        .collect();

    let flags: Vec<bool> = graph
        .nodes()
        .par_iter()
        .enumerate()
        .map(|(index, node)| {
            equilibrium.iter().all(|(constraint, eq)| {
                match engine.evaluate(master.elements(), &node.composition, constraint) {
                    Ok(assemblage) => assemblage.within(&eq.feasible_phases),
                    Err(err) => {
                        debug!(node = index, error = %err, "thermo evaluation failed");
                        false
                    }
                }
            })
        })
        .collect();

    debug!(
        design_space = graph.design_space(),
        feasible = flags.iter().filter(|f| **f).count(),
        total = flags.len(),
        "evaluated feasibility"
    );
    flags
}
