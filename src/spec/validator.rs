// Copyright 2025 Cowboy AI, LLC.

//! Structural validation of raw task documents.
//!
//! Checks run in document order and stop at the first violation. Every error
//! carries the [`SpecPath`] of the offending field.

use std::collections::HashSet;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::path::SpecPath;
use crate::errors::{TaskError, TaskResult};

const REQUIRED_TOP_LEVEL: [&str; 4] = [
    "name",
    "nDivisionsPerDimension",
    "elementalSpaces",
    "designSpaces",
];

/// Validator for raw task documents.
pub struct SpecValidator;

impl SpecValidator {
    /// Validate a parsed document, failing fast on the first violation.
    pub fn validate(document: &Value) -> TaskResult<()> {
        let root = SpecPath::root();
        let top = document
            .as_mapping()
            .ok_or_else(|| TaskError::schema(&root, "document must be a mapping"))?;

        for key in REQUIRED_TOP_LEVEL {
            if top.get(key).is_none() {
                return Err(TaskError::schema(root.key(key), "missing required key"));
            }
        }
        require_str(top, &root, "name")?;
        validate_divisions(top, &root)?;

        let elemental = validate_elemental_spaces(top, &root)?;
        let design = validate_design_spaces(top, &root, &elemental)?;

        if let Some(constraints) = top.get("constraints") {
            validate_constraints(constraints, &root.key("constraints"))?;
        }
        if let Some(plan) = top.get("pathPlan") {
            validate_path_plan(plan, &root.key("pathPlan"), &design)?;
        }

        debug!(
            elemental_spaces = elemental.len(),
            design_spaces = design.len(),
            "task specification validated"
        );
        Ok(())
    }
}

/// Name and element count of each validated elemental space, in order.
type ElementalIndex = Vec<(String, usize)>;

fn validate_divisions(top: &Mapping, root: &SpecPath) -> TaskResult<()> {
    let path = root.key("nDivisionsPerDimension");
    match top.get("nDivisionsPerDimension") {
        Some(Value::Number(n))
            if n.as_u64().and_then(|n| u32::try_from(n).ok()).is_some_and(|n| n > 0) =>
        {
            Ok(())
        }
        _ => Err(TaskError::schema(
            path,
            format!("must be a positive integer no larger than {}", u32::MAX),
        )),
    }
}

fn validate_elemental_spaces(top: &Mapping, root: &SpecPath) -> TaskResult<ElementalIndex> {
    let path = root.key("elementalSpaces");
    let spaces = non_empty_sequence(top.get("elementalSpaces"), &path)?;

    let mut index: ElementalIndex = Vec::with_capacity(spaces.len());
    for (i, space) in spaces.iter().enumerate() {
        let space_path = path.index(i);
        let entry = as_mapping(space, &space_path)?;
        let name = require_str(entry, &space_path, "name")?;
        if index.iter().any(|(existing, _)| existing == name) {
            return Err(TaskError::schema(
                space_path.key("name"),
                format!("duplicate elemental space name '{name}'"),
            ));
        }

        let elements_path = space_path.key("elements");
        let elements = match entry.get("elements") {
            None => return Err(TaskError::schema(elements_path, "missing required key")),
            Some(value) => non_empty_sequence(Some(value), &elements_path)?,
        };
        let mut seen = HashSet::new();
        for (j, element) in elements.iter().enumerate() {
            let symbol = element
                .as_str()
                .ok_or_else(|| TaskError::schema(elements_path.index(j), "must be a string"))?;
            if !seen.insert(symbol) {
                return Err(TaskError::schema(
                    elements_path.index(j),
                    format!("duplicate element '{symbol}'"),
                ));
            }
        }

        if let Some(tdb) = entry.get("tdb") {
            if !tdb.is_string() {
                return Err(TaskError::schema(space_path.key("tdb"), "must be a string"));
            }
        }
        index.push((name.to_string(), elements.len()));
    }
    Ok(index)
}

fn validate_design_spaces(
    top: &Mapping,
    root: &SpecPath,
    elemental: &ElementalIndex,
) -> TaskResult<HashSet<String>> {
    let path = root.key("designSpaces");
    let spaces = non_empty_sequence(top.get("designSpaces"), &path)?;
    let element_count = |name: &str| {
        elemental
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, count)| *count)
    };

    let mut names = HashSet::new();
    for (i, space) in spaces.iter().enumerate() {
        let space_path = path.index(i);
        let entry = as_mapping(space, &space_path)?;
        let name = require_str(entry, &space_path, "name")?;
        if !names.insert(name.to_string()) {
            return Err(TaskError::schema(
                space_path.key("name"),
                format!("duplicate design space name '{name}'"),
            ));
        }

        let expected = match entry.get("elementalSpace") {
            Some(reference) => {
                let ref_path = space_path.key("elementalSpace");
                let reference = reference
                    .as_str()
                    .ok_or_else(|| TaskError::schema(&ref_path, "must be a string"))?;
                element_count(reference).ok_or_else(|| {
                    TaskError::schema(
                        &ref_path,
                        format!("'{reference}' not found in elementalSpaces"),
                    )
                })?
            }
            None => element_count(name).ok_or_else(|| {
                TaskError::schema(
                    space_path.key("name"),
                    format!(
                        "'{name}' not found in elementalSpaces and no elementalSpace specified"
                    ),
                )
            })?,
        };

        if let Some(components) = entry.get("components") {
            validate_components(components, &space_path.key("components"), expected)?;
        }
    }
    Ok(names)
}

fn validate_components(components: &Value, path: &SpecPath, expected: usize) -> TaskResult<()> {
    let vectors = components
        .as_sequence()
        .ok_or_else(|| TaskError::schema(path, "must be a list"))?;
    for (j, vector) in vectors.iter().enumerate() {
        let vector_path = path.index(j);
        let entries = vector
            .as_sequence()
            .ok_or_else(|| TaskError::schema(&vector_path, "must be a list"))?;
        if entries.len() != expected {
            return Err(TaskError::schema(
                &vector_path,
                format!(
                    "must have {expected} entries to match elemental space, found {}",
                    entries.len()
                ),
            ));
        }
        for (k, entry) in entries.iter().enumerate() {
            if !entry.is_number() {
                return Err(TaskError::schema(vector_path.index(k), "must be a number"));
            }
        }
    }
    Ok(())
}

fn validate_constraints(constraints: &Value, path: &SpecPath) -> TaskResult<()> {
    let entries = constraints
        .as_sequence()
        .ok_or_else(|| TaskError::schema(path, "must be a list"))?;
    for (i, constraint) in entries.iter().enumerate() {
        let entry_path = path.index(i);
        let entry = as_mapping(constraint, &entry_path)?;
        let kind = require_str(entry, &entry_path, "type")?.to_lowercase();
        match kind.as_str() {
            "equilibrium" => {
                for key in ["temperature", "pressure", "feasiblePhases"] {
                    require(entry, &entry_path, key)?;
                }
                validate_temperature(
                    require(entry, &entry_path, "temperature")?,
                    &entry_path.key("temperature"),
                )?;
                if !require(entry, &entry_path, "pressure")?.is_number() {
                    return Err(TaskError::schema(entry_path.key("pressure"), "must be a number"));
                }
                let phases_path = entry_path.key("feasiblePhases");
                let phases = require(entry, &entry_path, "feasiblePhases")?
                    .as_sequence()
                    .ok_or_else(|| TaskError::schema(&phases_path, "must be a list"))?;
                for (j, phase) in phases.iter().enumerate() {
                    if !phase.is_string() {
                        return Err(TaskError::schema(phases_path.index(j), "must be a string"));
                    }
                }
            }
            "scheil" => {
                for key in ["startTemperature", "liquidPhase"] {
                    require(entry, &entry_path, key)?;
                }
                if !require(entry, &entry_path, "startTemperature")?.is_number() {
                    return Err(TaskError::schema(
                        entry_path.key("startTemperature"),
                        "must be a number",
                    ));
                }
                require_str(entry, &entry_path, "liquidPhase")?;
            }
            "cracking" => {
                if !require(entry, &entry_path, "criteria")?.is_sequence() {
                    return Err(TaskError::schema(entry_path.key("criteria"), "must be a list"));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_path_plan(
    plan: &Value,
    path: &SpecPath,
    design_spaces: &HashSet<String>,
) -> TaskResult<()> {
    let steps = plan
        .as_sequence()
        .ok_or_else(|| TaskError::schema(path, "must be a list"))?;
    for (i, step) in steps.iter().enumerate() {
        let step_path = path.index(i);
        let entry = as_mapping(step, &step_path)?;
        if entry.get("designSpace").is_some() {
            let name = require_str(entry, &step_path, "designSpace")?;
            if !design_spaces.contains(name) {
                return Err(TaskError::schema(
                    step_path.key("designSpace"),
                    format!("'{name}' not found in designSpaces"),
                ));
            }
        }
        if let Some(composition) = entry.get("composition") {
            let composition_path = step_path.key("composition");
            let values = composition
                .as_sequence()
                .ok_or_else(|| TaskError::schema(&composition_path, "must be a list"))?;
            for (j, value) in values.iter().enumerate() {
                if finite_number(value).is_none() {
                    return Err(TaskError::schema(
                        composition_path.index(j),
                        "must be a finite number",
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_temperature(temperature: &Value, path: &SpecPath) -> TaskResult<()> {
    if temperature.is_number() {
        return match finite_number(temperature) {
            Some(_) => Ok(()),
            None => Err(TaskError::schema(path, "must be a finite number")),
        };
    }
    let sweep: Option<Vec<f64>> = temperature
        .as_sequence()
        .filter(|seq| seq.len() == 3)
        .and_then(|seq| seq.iter().map(finite_number).collect());
    match sweep.as_deref() {
        Some(&[max, step, min]) if step > 0.0 && max >= min => Ok(()),
        Some(_) => Err(TaskError::schema(path, "sweep needs a positive step and maxT >= minT")),
        None => Err(TaskError::schema(path, "must be a number or [maxT, step, minT] list")),
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn as_mapping<'a>(value: &'a Value, path: &SpecPath) -> TaskResult<&'a Mapping> {
    value
        .as_mapping()
        .ok_or_else(|| TaskError::schema(path, "must be a mapping"))
}

fn non_empty_sequence<'a>(value: Option<&'a Value>, path: &SpecPath) -> TaskResult<&'a Vec<Value>> {
    match value.and_then(Value::as_sequence) {
        Some(seq) if !seq.is_empty() => Ok(seq),
        _ => Err(TaskError::schema(path, "must be a non-empty list")),
    }
}

fn require<'a>(entry: &'a Mapping, parent: &SpecPath, key: &str) -> TaskResult<&'a Value> {
    entry
        .get(key)
        .ok_or_else(|| TaskError::schema(parent.key(key), "missing required key"))
}

fn require_str<'a>(entry: &'a Mapping, parent: &SpecPath, key: &str) -> TaskResult<&'a str> {
    require(entry, parent, key)?
        .as_str()
        .ok_or_else(|| TaskError::schema(parent.key(key), "must be a string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> TaskResult<()> {
        let document: Value = serde_yaml::from_str(source).unwrap();
        SpecValidator::validate(&document)
    }

    #[test]
    fn accepts_minimal_document() {
        let result = check(
            "name: t\nnDivisionsPerDimension: 2\nelementalSpaces:\n  - {name: AB, elements: [A, B]}\ndesignSpaces:\n  - {name: AB}\n",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn missing_key_reported_in_order() {
        let err = check("name: t\nelementalSpaces: []\n").unwrap_err();
        assert_eq!(err.path(), Some("nDivisionsPerDimension"));
    }

    #[test]
    fn boolean_is_not_numeric() {
        let err = check(
            "name: t\nnDivisionsPerDimension: 2\nelementalSpaces:\n  - {name: AB, elements: [A, B]}\ndesignSpaces:\n  - {name: AB, components: [[1, true]]}\n",
        )
        .unwrap_err();
        assert_eq!(err.path(), Some("designSpaces[0].components[0][1]"));
    }

    #[test]
    fn non_mapping_document_rejected() {
        let err = check("- just\n- a list\n").unwrap_err();
        assert_eq!(err.path(), Some("<root>"));
    }
}
