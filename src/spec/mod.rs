// Copyright 2025 Cowboy AI, LLC.

//! Typed model of the declarative task specification.
//!
//! A task document is YAML with camelCase keys:
//!
//! ```yaml
//! name: FeNiCr
//! nDivisionsPerDimension: 6
//! elementalSpaces:
//!   - name: FeNiCr
//!     elements: [Fe, Ni, Cr]
//!     tdb: steels.tdb
//! designSpaces:
//!   - name: FeNiCr
//! ```
//!
//! Documents are checked by [`SpecValidator`] before they are deserialized
//! into [`TaskSpec`], so every record here is known to be structurally sound.

pub mod path;
pub mod validator;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::errors::{TaskError, TaskResult};

pub use path::{SpecPath, SpecPathSegment};
pub use validator::SpecValidator;

/// Root of a task specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Task name
    pub name: String,
    /// Lattice division count shared by every design space
    pub n_divisions_per_dimension: u32,
    /// Named element sets
    pub elemental_spaces: Vec<ElementalSpaceSpec>,
    /// Named bases over elemental spaces
    pub design_spaces: Vec<DesignSpaceSpec>,
    /// Thermodynamic feasibility constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintSpec>,
    /// Waypoints for path planning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_plan: Vec<PathPlanStep>,
}

/// Declared elemental space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ElementalSpaceSpec {
    /// Unique name
    pub name: String,
    /// Element symbols; order fixes local coordinate positions
    pub elements: Vec<String>,
    /// Thermodynamic database reference
    #[serde(rename = "tdb", default, skip_serializing_if = "Option::is_none")]
    pub database_ref: Option<String>,
}

/// Declared design space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignSpaceSpec {
    /// Unique name
    pub name: String,
    /// Elemental space the basis is expressed in; defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elemental_space: Option<String>,
    /// Basis vectors in local element coordinates; defaults to identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Vec<f64>>>,
}

impl DesignSpaceSpec {
    /// Name of the elemental space this design space is defined over.
    pub fn elemental_space_ref(&self) -> &str {
        self.elemental_space.as_deref().unwrap_or(&self.name)
    }
}

/// Feasibility constraint, tagged by its lowercase `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintSpec {
    /// Phase assemblage at equilibrium must stay within feasible phases
    Equilibrium(EquilibriumConstraint),
    /// Scheil solidification settings
    Scheil(ScheilConstraint),
    /// Hot-cracking criteria
    Cracking(CrackingConstraint),
    /// Constraint type this crate does not interpret
    #[serde(other)]
    Other,
}

/// Equilibrium constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumConstraint {
    /// Single temperature or a `[maxT, step, minT]` sweep
    pub temperature: TemperatureSpec,
    /// Pressure
    pub pressure: f64,
    /// Phases allowed at equilibrium
    pub feasible_phases: Vec<String>,
}

/// Temperature as a fixed value or a descending sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TemperatureSpec {
    /// One temperature
    Fixed(f64),
    /// `[maxT, step, minT]`
    Sweep(f64, f64, f64),
}

impl TemperatureSpec {
    /// Largest number of temperatures a sweep may expand to.
    pub const MAX_SWEEP_POINTS: usize = 100_000;

    /// Temperatures to evaluate, hottest first.
    ///
    /// A sweep includes `minT` when the step lands on it. Non-finite values,
    /// a non-positive step, `maxT < minT` or more than
    /// [`TemperatureSpec::MAX_SWEEP_POINTS`] points are a
    /// [`TaskError::Configuration`].
    pub fn temperatures(&self) -> TaskResult<Vec<f64>> {
        match *self {
            TemperatureSpec::Fixed(t) if t.is_finite() => Ok(vec![t]),
            TemperatureSpec::Fixed(t) => {
                Err(TaskError::configuration(format!("temperature {t} is not finite")))
            }
            TemperatureSpec::Sweep(max, step, min) => {
                if ![max, step, min].iter().all(|v| v.is_finite()) || step <= 0.0 || max < min {
                    return Err(TaskError::configuration(format!(
                        "temperature sweep [{max}, {step}, {min}] must be finite with a positive step and maxT >= minT"
                    )));
                }
                let steps = ((max - min) / step + 1e-9).floor();
                if steps >= Self::MAX_SWEEP_POINTS as f64 {
                    return Err(TaskError::configuration(format!(
                        "temperature sweep [{max}, {step}, {min}] exceeds {} points",
                        Self::MAX_SWEEP_POINTS
                    )));
                }
                let steps = steps as usize;
                Ok((0..=steps).map(|k| max - step * k as f64).collect())
            }
        }
    }
}

/// Scheil constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheilConstraint {
    /// Temperature the simulation starts from
    pub start_temperature: f64,
    /// Name of the liquid phase
    pub liquid_phase: String,
}

/// Cracking constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CrackingConstraint {
    /// Criteria passed through to the evaluator
    pub criteria: Vec<serde_json::Value>,
}

/// One waypoint of a path plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathPlanStep {
    /// Design space the waypoint lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_space: Option<String>,
    /// Waypoint composition, in basis fractions or master element fractions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<Vec<f64>>,
}

impl TaskSpec {
    /// Validate a parsed document and convert it into typed records.
    pub fn from_value(value: &Value) -> TaskResult<Self> {
        SpecValidator::validate(value)?;
        let mut normalized = value.clone();
        lowercase_constraint_types(&mut normalized);
        serde_yaml::from_value(normalized)
            .map_err(|err| TaskError::schema(SpecPath::root(), err.to_string()))
    }

    /// Parse, validate and convert a YAML document.
    pub fn from_yaml_str(source: &str) -> TaskResult<Self> {
        let value: Value = serde_yaml::from_str(source)?;
        Self::from_value(&value)
    }

    /// Look up a declared elemental space.
    pub fn elemental_space(&self, name: &str) -> Option<&ElementalSpaceSpec> {
        self.elemental_spaces.iter().find(|space| space.name == name)
    }

    /// Equilibrium constraints, in declaration order.
    pub fn equilibrium_constraints(&self) -> impl Iterator<Item = &EquilibriumConstraint> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            ConstraintSpec::Equilibrium(eq) => Some(eq),
            _ => None,
        })
    }
}

/// JSON schema describing the task specification document.
pub fn task_spec_schema() -> TaskResult<serde_json::Value> {
    let schema = schemars::schema_for!(TaskSpec);
    Ok(serde_json::to_value(schema)?)
}

fn lowercase_constraint_types(document: &mut Value) {
    let Some(constraints) = document
        .get_mut("constraints")
        .and_then(Value::as_sequence_mut)
    else {
        return;
    };
    for constraint in constraints {
        if let Some(Value::String(kind)) = constraint.get_mut("type") {
            *kind = kind.to_lowercase();
        }
    }
}
