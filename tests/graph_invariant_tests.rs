// Copyright 2025 Cowboy AI, LLC.

//! Structural invariants of compositional graphs over random bases

use std::collections::HashSet;

use ammap_domain::{
    BuildOptions, CompositionalGraph, ExpandedBasis, GridLibrary, SimplexGrid,
};
use proptest::prelude::*;

fn basis_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..5, 2usize..6).prop_flat_map(|(dimension, columns)| {
        proptest::collection::vec(
            proptest::collection::vec(0.0f64..10.0, columns).prop_filter(
                "row needs weight",
                |row| row.iter().sum::<f64>() > 1e-3,
            ),
            dimension,
        )
    })
}

fn normalize(rows: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    rows.into_iter()
        .map(|row| {
            let total: f64 = row.iter().sum();
            row.into_iter().map(|v| v / total).collect()
        })
        .collect()
}

fn build(rows: Vec<Vec<f64>>, divisions: u32) -> CompositionalGraph {
    let basis = ExpandedBasis::from_rows(normalize(rows)).unwrap();
    CompositionalGraph::build(
        &SimplexGrid::default(),
        "random",
        basis,
        divisions,
        &BuildOptions::default(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn compositions_stay_on_the_simplex(rows in basis_strategy(), divisions in 1u32..7) {
        let graph = build(rows, divisions);
        for composition in graph.compositions() {
            let total: f64 = composition.iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
            prop_assert!(composition.iter().all(|v| *v >= -1e-12));
        }
    }

    #[test]
    fn edges_are_unique_and_irreflexive(rows in basis_strategy(), divisions in 1u32..7) {
        let graph = build(rows, divisions);
        let mut seen = HashSet::new();
        for &(a, b) in graph.edges() {
            prop_assert!(a < b);
            prop_assert!(b < graph.len());
            prop_assert!(seen.insert((a, b)));
        }
        for (i, adjacent) in graph.neighbor_lists().iter().enumerate() {
            for &j in adjacent {
                prop_assert!(graph.neighbors(j).unwrap().contains(&i));
            }
        }
    }

    #[test]
    fn pure_corners_reproduce_basis_rows(rows in basis_strategy(), divisions in 1u32..7) {
        let graph = build(rows, divisions);
        for (row, &index) in graph.pure_component_indices().iter().enumerate() {
            let expected = graph.components_master().row(row).unwrap();
            let actual = &graph.nodes()[index].composition;
            for (a, e) in actual.iter().zip(expected) {
                prop_assert!((a - e).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn node_count_matches_binomial(dimension in 1usize..6, divisions in 1u32..9) {
        let grid = SimplexGrid::default();
        let lattice = grid.enumerate_simplex_lattice(dimension, divisions).unwrap();
        prop_assert_eq!(lattice.len(), grid.node_count(dimension, divisions).unwrap());
        let n = divisions as usize;
        let mut expected = 1usize;
        for k in 1..dimension {
            expected = expected * (n + k) / k;
        }
        prop_assert_eq!(lattice.len(), expected);
    }

    #[test]
    fn shortest_path_steps_along_edges(divisions in 2u32..7) {
        let identity = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let graph = build(identity, divisions);
        let corners = graph.pure_component_indices().to_vec();
        let path = graph.shortest_path(corners[0], corners[2], |_| true).unwrap();
        prop_assert_eq!(path.len(), divisions as usize + 1);
        for pair in path.windows(2) {
            prop_assert!(graph.neighbors(pair[0]).unwrap().contains(&pair[1]));
        }
    }
}
