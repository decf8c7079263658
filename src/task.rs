// Copyright 2025 Cowboy AI, LLC.

//! Task construction: the single entry point owning every built entity.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::config::BuildOptions;
use crate::design_space::{declared_active_elements, DesignSpace};
use crate::elemental_space::ElementalSpaceRegistry;
use crate::errors::{TaskError, TaskResult};
use crate::graph::CompositionalGraph;
use crate::grid::GridLibrary;
use crate::master::MasterElementSet;
use crate::query;
use crate::spec::{DesignSpaceSpec, SpecValidator, TaskSpec};
use crate::thermo::{self, ThermoEngine};

/// A loaded task: validated specification, master coordinates, and one
/// compositional graph per design space that built successfully.
///
/// Design spaces that failed to build are kept in [`Task::failures`] with the
/// reason; they never prevent their siblings from building. A constructed task
/// is immutable and safe to share across threads.
#[derive(Debug)]
pub struct Task {
    spec: TaskSpec,
    options: BuildOptions,
    registry: ElementalSpaceRegistry,
    master: MasterElementSet,
    design_spaces: IndexMap<String, DesignSpace>,
    graphs: IndexMap<String, CompositionalGraph>,
    failures: IndexMap<String, TaskError>,
}

/// Configures how a [`Task`] is built.
#[derive(Default)]
pub struct TaskBuilder {
    options: BuildOptions,
    grid: Option<Arc<dyn GridLibrary>>,
}

impl TaskBuilder {
    /// Use the given build options
    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a grid backend other than the bundled [`crate::SimplexGrid`]
    pub fn grid(mut self, grid: Arc<dyn GridLibrary>) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Load a YAML task file
    pub fn load_path(self, path: impl AsRef<Path>) -> TaskResult<Task> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading task specification");
        let source = std::fs::read_to_string(path)?;
        self.load_str(&source)
    }

    /// Load a YAML task document
    pub fn load_str(self, source: &str) -> TaskResult<Task> {
        let document: Value = serde_yaml::from_str(source)?;
        self.load_value(&document)
    }

    /// Load an already parsed document
    pub fn load_value(self, document: &Value) -> TaskResult<Task> {
        let spec = TaskSpec::from_value(document)?;
        self.assemble(spec)
    }

    /// Build from typed records, validating them like a parsed document
    pub fn build(self, spec: TaskSpec) -> TaskResult<Task> {
        let document = serde_yaml::to_value(&spec)?;
        SpecValidator::validate(&document)?;
        self.assemble(spec)
    }

    fn assemble(self, spec: TaskSpec) -> TaskResult<Task> {
        let options = self.options;
        let grid: Arc<dyn GridLibrary> = match self.grid {
            Some(grid) => grid,
            None => Arc::new(options.grid()),
        };

        let registry = ElementalSpaceRegistry::register(&spec.elemental_spaces)?;
        let master = MasterElementSet::build(&registry);
        let divisions = spec.n_divisions_per_dimension;
        info!(
            task = %spec.name,
            master = %master,
            design_spaces = spec.design_spaces.len(),
            divisions,
            parallel = options.parallel,
            "building task"
        );

        let build_one =
            |declared: &DesignSpaceSpec| -> TaskResult<(DesignSpace, CompositionalGraph)> {
                let design = DesignSpace::from_spec(declared, &registry)?;
                let basis = design.expand(&master)?;
                let graph = CompositionalGraph::build(
                    grid.as_ref(),
                    design.name(),
                    basis,
                    divisions,
                    &options,
                )?;
                Ok((design, graph))
            };
        let results: Vec<TaskResult<(DesignSpace, CompositionalGraph)>> = if options.parallel {
            spec.design_spaces.par_iter().map(&build_one).collect()
        } else {
            spec.design_spaces.iter().map(&build_one).collect()
        };

        let mut design_spaces = IndexMap::new();
        let mut graphs = IndexMap::new();
        let mut failures = IndexMap::new();
        for (declared, result) in spec.design_spaces.iter().zip(results) {
            match result {
                Ok((design, graph)) => {
                    debug!(
                        design_space = %declared.name,
                        nodes = graph.len(),
                        "design space built"
                    );
                    design_spaces.insert(declared.name.clone(), design);
                    graphs.insert(declared.name.clone(), graph);
                }
                Err(err) => {
                    warn!(
                        design_space = %declared.name,
                        error = %err,
                        "design space failed to build"
                    );
                    failures.insert(declared.name.clone(), err);
                }
            }
        }

        Ok(Task {
            spec,
            options,
            registry,
            master,
            design_spaces,
            graphs,
            failures,
        })
    }
}

impl Task {
    /// Builder for non-default options or grid backends
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }

    /// Load a YAML task file with default options
    pub fn from_path(path: impl AsRef<Path>) -> TaskResult<Self> {
        Self::builder().load_path(path)
    }

    /// Load a YAML task document with default options
    pub fn from_yaml_str(source: &str) -> TaskResult<Self> {
        Self::builder().load_str(source)
    }

    /// Load a parsed document with default options
    pub fn from_value(document: &Value) -> TaskResult<Self> {
        Self::builder().load_value(document)
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Lattice division count
    pub fn divisions(&self) -> u32 {
        self.spec.n_divisions_per_dimension
    }

    /// Validated specification
    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    /// Options the task was built with
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Registered elemental spaces
    pub fn elemental_spaces(&self) -> &ElementalSpaceRegistry {
        &self.registry
    }

    /// Master coordinate system
    pub fn master_elements(&self) -> &MasterElementSet {
        &self.master
    }

    /// Declared design-space names, in specification order
    pub fn design_space_names(&self) -> impl Iterator<Item = &str> {
        self.spec.design_spaces.iter().map(|ds| ds.name.as_str())
    }

    /// Successfully built design spaces
    pub fn design_spaces(&self) -> impl Iterator<Item = &DesignSpace> {
        self.design_spaces.values()
    }

    /// Sorted elements carrying weight in any declared design space,
    /// including those that failed to build
    pub fn design_space_elements(&self) -> Vec<String> {
        self.spec
            .design_spaces
            .iter()
            .flat_map(|declared| declared_active_elements(declared, &self.registry))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Design spaces that failed to build, with the reason
    pub fn failures(&self) -> &IndexMap<String, TaskError> {
        &self.failures
    }

    /// True when every declared design space built
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// One design space; `None` selects the first declared
    pub fn design_space(&self, name: Option<&str>) -> TaskResult<&DesignSpace> {
        let name = self.resolve(name)?;
        self.design_spaces
            .get(name)
            .ok_or_else(|| self.missing(name))
    }

    /// Graph of one design space; `None` selects the first declared
    pub fn compositional_graph(&self, name: Option<&str>) -> TaskResult<&CompositionalGraph> {
        let name = self.resolve(name)?;
        self.graphs.get(name).ok_or_else(|| self.missing(name))
    }

    /// Built graphs keyed by design-space name, in specification order
    pub fn graphs(&self) -> &IndexMap<String, CompositionalGraph> {
        &self.graphs
    }

    /// Hover text for every node of a design space
    pub fn hover_formulas(&self, name: Option<&str>) -> TaskResult<Vec<String>> {
        let graph = self.compositional_graph(name)?;
        Ok(query::hover_formulas(graph, &self.master))
    }

    /// Pure-component labels for every node of a design space
    pub fn pure_component_labels(&self, name: Option<&str>) -> TaskResult<Vec<String>> {
        let graph = self.compositional_graph(name)?;
        let design = self.design_space(name)?;
        Ok(query::pure_component_labels(graph, design))
    }

    /// Plotting coordinates for every node of a design space
    pub fn projected_grid(&self, name: Option<&str>) -> TaskResult<Vec<[f64; 3]>> {
        query::cartesian_projection(self.compositional_graph(name)?)
    }

    /// Feasibility of every node under the task's constraints
    pub fn feasibility(
        &self,
        name: Option<&str>,
        engine: &dyn ThermoEngine,
    ) -> TaskResult<Vec<bool>> {
        let graph = self.compositional_graph(name)?;
        Ok(thermo::evaluate_feasibility(graph, &self.master, engine, &self.spec.constraints))
    }

    /// Walk the design space's `pathPlan` waypoints in order, joining them with
    /// shortest lattice paths through nodes accepted by `allowed`.
    pub fn plan_path(
        &self,
        name: Option<&str>,
        allowed: impl Fn(usize) -> bool,
    ) -> TaskResult<Vec<usize>> {
        let name = self.resolve(name)?;
        let graph = self.compositional_graph(Some(name))?;
        let waypoints = self
            .spec
            .path_plan
            .iter()
            .filter(|step| step.design_space.as_deref() == Some(name))
            .filter_map(|step| step.composition.as_deref())
            .map(|composition| graph.nearest_node(composition))
            .collect::<TaskResult<Vec<usize>>>()?;

        let Some((&first, rest)) = waypoints.split_first() else {
            return Err(TaskError::configuration(format!(
                "pathPlan has no waypoints for design space '{name}'"
            )));
        };
        if !allowed(first) {
            return Err(TaskError::configuration(format!(
                "pathPlan start node {first} in '{name}' is not allowed"
            )));
        }
        let mut path = vec![first];
        let mut current = first;
        for (leg, &next) in rest.iter().enumerate() {
            let segment = graph.shortest_path(current, next, &allowed).ok_or_else(|| {
                TaskError::configuration(format!(
                    "pathPlan leg {leg} in '{name}' from node {current} to node {next} is unreachable"
                ))
            })?;
            path.extend_from_slice(&segment[1..]);
            current = next;
        }
        debug!(
            design_space = %name,
            waypoints = waypoints.len(),
            length = path.len(),
            "planned path"
        );
        Ok(path)
    }

    fn resolve<'a>(&'a self, name: Option<&'a str>) -> TaskResult<&'a str> {
        match name {
            Some(name) => Ok(name),
            None => self
                .spec
                .design_spaces
                .first()
                .map(|ds| ds.name.as_str())
                .ok_or_else(|| TaskError::UnknownDesignSpace("<first>".to_string())),
        }
    }

    fn missing(&self, name: &str) -> TaskError {
        self.failures
            .get(name)
            .cloned()
            .unwrap_or_else(|| TaskError::UnknownDesignSpace(name.to_string()))
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Task Information:")?;
        writeln!(f, "  - Name: {}", self.spec.name)?;
        writeln!(f, "  - Number of elemental spaces: {}", self.registry.len())?;
        writeln!(f, "  - Number of design spaces: {}", self.spec.design_spaces.len())?;
        writeln!(f, "  - Master elements: {}", self.master)?;
        write!(
            f,
            "  - Design space master elements: [{}]",
            self.design_space_elements().join(", ")
        )?;
        for (name, err) in &self.failures {
            write!(f, "\n  - Failed design space {name}: {err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridError, MockGridLibrary, SimplexGrid};

    const TWO_SPACES: &str = r#"
name: pair
nDivisionsPerDimension: 3
elementalSpaces:
  - name: AB
    elements: [A, B]
  - name: BCD
    elements: [B, C, D]
designSpaces:
  - name: AB
  - name: BCD
"#;

    #[test]
    fn builds_every_design_space() {
        let task = Task::from_yaml_str(TWO_SPACES).unwrap();
        assert!(task.is_complete());
        assert_eq!(task.master_elements().elements(), &["A", "B", "C", "D"]);
        assert_eq!(task.compositional_graph(Some("AB")).unwrap().len(), 4);
        assert_eq!(task.compositional_graph(Some("BCD")).unwrap().len(), 10);
        assert_eq!(task.compositional_graph(None).unwrap().design_space(), "AB");
    }

    #[test]
    fn grid_failure_is_isolated_to_its_design_space() {
        let real = SimplexGrid::default();
        let mut grid = MockGridLibrary::new();
        grid.expect_enumerate_simplex_lattice()
            .returning(move |dimension, divisions| {
                if dimension == 3 {
                    Err(GridError::Backend("resource exhausted".to_string()))
                } else {
                    real.enumerate_simplex_lattice(dimension, divisions)
                }
            });
        grid.expect_project_lattice()
            .returning(move |basis, divisions| real.project_lattice(basis, divisions));
        grid.expect_pure_component_indices()
            .returning(move |dimension, divisions| {
                real.pure_component_indices(dimension, divisions)
            });

        let task = Task::builder()
            .grid(Arc::new(grid))
            .load_str(TWO_SPACES)
            .unwrap();
        assert!(!task.is_complete());
        assert!(task.compositional_graph(Some("AB")).is_ok());
        let err = task.compositional_graph(Some("BCD")).unwrap_err();
        assert_eq!(
            err,
            TaskError::Internal("grid backend failure: resource exhausted".to_string())
        );
        assert_eq!(task.failures().len(), 1);
        assert!(task.to_string().contains("Failed design space BCD"));
    }

    #[test]
    fn unknown_design_space_reported() {
        let task = Task::from_yaml_str(TWO_SPACES).unwrap();
        let err = task.hover_formulas(Some("Nope")).unwrap_err();
        assert_eq!(err, TaskError::UnknownDesignSpace("Nope".to_string()));
    }

    #[test]
    fn summary_lists_master_elements() {
        let task = Task::from_yaml_str(TWO_SPACES).unwrap();
        let summary = task.to_string();
        assert!(summary.contains("Number of elemental spaces: 2"));
        assert!(summary.contains("Master elements: [A, B, C, D]"));
        assert!(summary.contains("Design space master elements: [A, B, C, D]"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn task_is_shareable_across_threads() {
        assert_send_sync::<Task>();
        let task = Arc::new(Task::from_yaml_str(TWO_SPACES).unwrap());
        let counts: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = ["AB", "BCD"]
                .into_iter()
                .map(|name| {
                    let task = Arc::clone(&task);
                    scope.spawn(move || task.hover_formulas(Some(name)).unwrap().len())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(counts, vec![4, 10]);
    }

    #[test]
    fn typed_spec_is_validated() {
        let mut spec = TaskSpec::from_yaml_str(TWO_SPACES).unwrap();
        spec.n_divisions_per_dimension = 0;
        let err = Task::builder().build(spec).unwrap_err();
        assert_eq!(err.path(), Some("nDivisionsPerDimension"));
    }
}
