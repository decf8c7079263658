// Copyright 2025 Cowboy AI, LLC.

//! Read-only presentation views over a compositional graph

use crate::design_space::DesignSpace;
use crate::errors::{TaskError, TaskResult};
use crate::graph::CompositionalGraph;
use crate::master::MasterElementSet;

/// Hover text for every node: `"(  i) El12.5 Fe87.5"`.
///
/// Only elements with a strictly positive fraction are listed, in master
/// order, as percentages with one decimal.
pub fn hover_formulas(graph: &CompositionalGraph, master: &MasterElementSet) -> Vec<String> {
    graph
        .compositions()
        .enumerate()
        .map(|(index, composition)| {
            let mut formula = format!("({index:>3})");
            for (element, fraction) in master.iter().zip(composition) {
                if *fraction > 0.0 {
                    formula.push_str(&format!(" {element}{:.1}", 100.0 * fraction));
                }
            }
            formula
        })
        .collect()
}

/// Label for every node: the basis corner's name at pure-component nodes,
/// empty elsewhere.
///
/// A one-hot basis vector is named by its local element. A mixed basis vector
/// has no single element name, so it is labelled with its local formula
/// instead, e.g. `"Fe50.0 Ni50.0"`.
pub fn pure_component_labels(
    graph: &CompositionalGraph,
    design_space: &DesignSpace,
) -> Vec<String> {
    let mut labels = vec![String::new(); graph.len()];
    for (row, &index) in graph.pure_component_indices().iter().enumerate() {
        if let Some(basis) = design_space.basis().get(row) {
            labels[index] = basis_label(design_space.elements(), basis);
        }
    }
    labels
}

fn basis_label(elements: &[String], row: &[f64]) -> String {
    let weighted: Vec<(&String, f64)> = elements
        .iter()
        .zip(row.iter().copied())
        .filter(|(_, value)| *value > 0.0)
        .collect();
    match weighted.as_slice() {
        [(element, _)] => element.to_string(),
        _ => weighted
            .iter()
            .map(|(element, value)| format!("{element}{:.1}", 100.0 * value))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Plotting coordinates `[x, y, z]` for every node.
///
/// Lattice fractions are mapped onto a regular simplex: a unit segment for two
/// basis vectors, an equilateral triangle for three, a regular tetrahedron for
/// four. Unused axes are zero.
pub fn cartesian_projection(graph: &CompositionalGraph) -> TaskResult<Vec<[f64; 3]>> {
    let vertices = simplex_vertices(graph.dimension())?;
    let scale = f64::from(graph.divisions());
    Ok(graph
        .nodes()
        .iter()
        .map(|node| {
            let mut point = [0.0; 3];
            for (weight, vertex) in node.lattice.iter().zip(&vertices) {
                let fraction = f64::from(*weight) / scale;
                for axis in 0..3 {
                    point[axis] += fraction * vertex[axis];
                }
            }
            point
        })
        .collect())
}

fn simplex_vertices(dimension: usize) -> TaskResult<Vec<[f64; 3]>> {
    let all = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.5, 3f64.sqrt() / 2.0, 0.0],
        [0.5, 3f64.sqrt() / 6.0, (2.0f64 / 3.0).sqrt()],
    ];
    if dimension == 0 || dimension > all.len() {
        return Err(TaskError::configuration(format!(
            "cannot project a {dimension}-component simplex into three dimensions"
        )));
    }
    Ok(all[..dimension].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::elemental_space::ElementalSpace;
    use crate::grid::SimplexGrid;

    fn fixture(
        elements: &[&str],
        basis: Option<Vec<Vec<f64>>>,
        divisions: u32,
    ) -> (DesignSpace, MasterElementSet, CompositionalGraph) {
        let space = ElementalSpace::new(
            "space",
            elements.iter().map(|e| e.to_string()).collect(),
            None,
        )
        .unwrap();
        let design = match basis {
            Some(rows) => DesignSpace::with_basis("ds", &space, rows).unwrap(),
            None => DesignSpace::identity("ds", &space),
        };
        let master = MasterElementSet::from_elements(space.elements().iter().cloned());
        let graph = CompositionalGraph::build(
            &SimplexGrid::default(),
            "ds",
            design.expand(&master).unwrap(),
            divisions,
            &BuildOptions::default(),
        )
        .unwrap();
        (design, master, graph)
    }

    #[test]
    fn hover_lists_positive_fractions() {
        let (_, master, graph) = fixture(&["A", "B"], None, 2);
        assert_eq!(
            hover_formulas(&graph, &master),
            vec!["(  0) A100.0", "(  1) A50.0 B50.0", "(  2) B100.0"]
        );
    }

    #[test]
    fn hover_uses_master_order() {
        let (_, master, graph) = fixture(&["Ni", "Cr"], None, 4);
        assert_eq!(hover_formulas(&graph, &master)[1], "(  1) Cr25.0 Ni75.0");
    }

    #[test]
    fn pure_labels_name_local_elements() {
        let (design, _, graph) = fixture(&["Fe", "Ni", "Cr"], None, 3);
        let labels = pure_component_labels(&graph, &design);
        let named: Vec<(usize, &str)> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| !label.is_empty())
            .map(|(i, label)| (i, label.as_str()))
            .collect();
        assert_eq!(named, vec![(0, "Fe"), (6, "Ni"), (9, "Cr")]);
    }

    #[test]
    fn pure_labels_render_mixed_rows() {
        let (design, _, graph) = fixture(
            &["Fe", "Ni", "Cr"],
            Some(vec![vec![0.5, 0.5, 0.0], vec![0.0, 0.0, 1.0]]),
            2,
        );
        let labels = pure_component_labels(&graph, &design);
        assert_eq!(labels, vec!["Fe50.0 Ni50.0", "", "Cr"]);
    }

    #[test]
    fn projection_places_corners_on_triangle() {
        let (_, _, graph) = fixture(&["A", "B", "C"], None, 2);
        let points = cartesian_projection(&graph).unwrap();
        assert_eq!(points.len(), graph.len());
        assert_eq!(points[0], [0.0, 0.0, 0.0]);
        assert_eq!(points[3], [1.0, 0.0, 0.0]);
        assert!((points[5][1] - 3f64.sqrt() / 2.0).abs() < 1e-12);
        assert!((points[1][0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn projection_rejects_high_dimensions() {
        let (_, _, graph) = fixture(&["A", "B", "C", "D", "E"], None, 1);
        assert!(matches!(
            cartesian_projection(&graph),
            Err(TaskError::Configuration(_))
        ));
    }
}
