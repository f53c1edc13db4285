// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! A directed acyclic graph (DAG) of every task of one experiment run.
//!
//! The graph mirrors the workflow submitted to the orchestrator: the
//! configurations are computed first, then every dataset is generated once
//! and shared by the databases importing a prefix of it. Finally the logs of
//! all benchmark tasks are aggregated and plotted.

extern crate daggy;
use daggy::petgraph::algo::toposort;
use daggy::{Dag, NodeIndex, Walker};

use crate::configs::{ContainerImages, ExperimentEnv, ResourceLimits};
use crate::configuration::Configuration;
use crate::error::{QuadbenchError, Result};
use crate::expansion::ExpansionResult;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

type DagEdge = ();
type TaskGraph = Dag<TaskNode, DagEdge>;

/// A store benchmarked against a database configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Blazegraph triple store.
    Blazegraph,
    /// Jena Fuseki (TDB2) triple store.
    Jena,
    /// Postgres quad store, condensed layout.
    ConvergCondensed,
    /// Postgres quad store, flat layout.
    ConvergFlat,
}

impl Backend {
    /// The backends benchmarked when none are requested explicitly.
    pub const DEFAULT: [Backend; 3] = [
        Backend::Blazegraph,
        Backend::ConvergCondensed,
        Backend::ConvergFlat,
    ];

    /// The task name prefix of the backend.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Blazegraph => "blazegraph",
            Backend::Jena => "jena",
            Backend::ConvergCondensed => "converg-condensed",
            Backend::ConvergFlat => "converg-flat",
        }
    }

    /// The image of the store.
    pub fn image<'a>(&self, images: &'a ContainerImages) -> &'a str {
        match self {
            Backend::Blazegraph => &images.blazegraph,
            Backend::Jena => &images.jena,
            Backend::ConvergCondensed | Backend::ConvergFlat => &images.postgres,
        }
    }
}

impl Backend {
    /// Images of the importer and querier services started next to the
    /// store. The triple stores import and answer queries themselves.
    pub fn services(&self, images: &ContainerImages) -> Vec<String> {
        match self {
            Backend::Blazegraph | Backend::Jena => vec![],
            Backend::ConvergCondensed | Backend::ConvergFlat => {
                vec![images.quader.clone(), images.quaque.clone()]
            }
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = QuadbenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blazegraph" => Ok(Backend::Blazegraph),
            "jena" => Ok(Backend::Jena),
            "converg-condensed" | "condensed" => Ok(Backend::ConvergCondensed),
            "converg-flat" | "flat" => Ok(Backend::ConvergFlat),
            _ => Err(QuadbenchError::InvalidInput(format!(
                "unknown backend: {}",
                s
            ))),
        }
    }
}

/// What a task of the experiment does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Expands the parameter lists.
    ComputeConfigurations,
    /// Computes name and size of a shared dataset volume.
    DatasetPvc,
    /// Creates the shared dataset volume.
    DatasetVolume,
    /// Generates the triples of every version.
    GenerateDataset,
    /// Derives relational quads from the triples.
    RelationalTransformer,
    /// Derives theoretical quads from the triples.
    TheoreticalTransformer,
    /// Computes the parameters of a database.
    PrepareDatabase,
    /// Creates the volume of a database.
    DatabaseVolume,
    /// Imports and queries one store.
    Backend(Backend),
    /// Logs the journal size of a blazegraph store.
    BlazegraphSpace,
    /// Removes the services of a database.
    RemoveServices,
    /// Fetches and merges the logs of the run.
    AggregateLogs,
    /// Plots the timing logs.
    TimePlots,
    /// Plots the storage logs.
    SpacePlots,
}

impl TaskKind {
    /// The task name prefix.
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::ComputeConfigurations => "compute-configurations",
            TaskKind::DatasetPvc => "dataset-pvc",
            TaskKind::DatasetVolume => "dataset-volume",
            TaskKind::GenerateDataset => "generate-dataset",
            TaskKind::RelationalTransformer => "relational-transformer",
            TaskKind::TheoreticalTransformer => "theoretical-transformer",
            TaskKind::PrepareDatabase => "prepare-database",
            TaskKind::DatabaseVolume => "database-volume",
            TaskKind::Backend(backend) => backend.name(),
            TaskKind::BlazegraphSpace => "blazegraph-space",
            TaskKind::RemoveServices => "remove-services",
            TaskKind::AggregateLogs => "aggregate-logs",
            TaskKind::TimePlots => "time-plots",
            TaskKind::SpacePlots => "space-plots",
        }
    }

    /// The container image running the task. Volume and service tasks are
    /// plain resource actions without an image.
    pub fn image(&self, images: &ContainerImages) -> Option<String> {
        let image: &str = match self {
            TaskKind::ComputeConfigurations | TaskKind::DatasetPvc | TaskKind::PrepareDatabase => {
                &images.quadbench
            }
            TaskKind::DatasetVolume | TaskKind::DatabaseVolume | TaskKind::RemoveServices => {
                return None
            }
            TaskKind::GenerateDataset => &images.bsbm,
            TaskKind::RelationalTransformer | TaskKind::TheoreticalTransformer => {
                &images.quads_transformer
            }
            TaskKind::Backend(backend) => backend.image(images),
            TaskKind::BlazegraphSpace => &images.python_requests,
            TaskKind::AggregateLogs => &images.get_workflow_logs,
            TaskKind::TimePlots => &images.log_to_plots,
            TaskKind::SpacePlots => &images.space_logs_to_plots,
        };
        Some(image.to_string())
    }
}

/// A task of the experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    /// Unique task name.
    pub name:     String,
    /// What the task does.
    pub kind:     TaskKind,
    /// Container image, if the task runs one.
    pub image:    Option<String>,
    /// The configuration the task works on, if any.
    pub config:   Option<Configuration>,
    /// Images of the services a store task starts next to its store.
    pub services: Vec<String>,
    /// Resources of a store task.
    pub limits:   Option<ResourceLimits>,
    /// Label selecting the services removed by a cleanup task.
    pub selector: Option<String>,
}

impl TaskNode {
    fn new(kind: TaskKind, config: Option<Configuration>, env: &ExperimentEnv) -> Self {
        let name = match config {
            Some(c) => format!("{}-{}", kind.name(), c.label()),
            None => kind.name().to_string(),
        };
        let (services, limits) = match kind {
            TaskKind::Backend(backend) => {
                (backend.services(&env.images), Some(env.limits.clone()))
            }
            _ => (vec![], None),
        };
        let selector = match kind {
            TaskKind::RemoveServices => config.map(|c| c.cleanup_label()),
            _ => None,
        };
        TaskNode {
            name,
            kind,
            image: kind.image(&env.images),
            config,
            services,
            limits,
            selector,
        }
    }
}

/// A serializable view of one task and its direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    /// Unique task name.
    pub name:       String,
    /// What the task does.
    pub kind:       TaskKind,
    /// Container image, if the task runs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image:      Option<String>,
    /// The configuration the task works on, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config:     Option<Configuration>,
    /// Importer and querier images of a store task.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services:   Vec<String>,
    /// Resources of a store task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits:     Option<ResourceLimits>,
    /// Service selector of a cleanup task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector:   Option<String>,
    /// Names of the tasks that must complete first.
    pub depends_on: Vec<String>,
}

/// The task graph of an experiment. It can be traversed in topological
/// order, and the dependencies of any task can be queried.
#[derive(Debug)]
pub struct ExperimentDag {
    dag:   TaskGraph,
    names: HashMap<String, NodeIndex>,
    root:  NodeIndex,
}

impl Deref for ExperimentDag {
    type Target = TaskGraph;

    fn deref(&self) -> &Self::Target {
        &self.dag
    }
}

impl ExperimentDag {
    /// Composes the task graph of `expansion`, benchmarking every database
    /// configuration against each of `backends`.
    pub fn build(
        expansion: &ExpansionResult,
        backends: &[Backend],
        env: &ExperimentEnv,
    ) -> Result<Self> {
        if backends.is_empty() {
            return Err(QuadbenchError::InvalidInput(
                "at least one backend is required".to_string(),
            ));
        }
        if backends.iter().collect::<HashSet<_>>().len() != backends.len() {
            return Err(QuadbenchError::InvalidInput(format!(
                "backends are listed more than once: {:?}",
                backends
            )));
        }

        let mut dag = TaskGraph::new();
        let root = dag.add_node(TaskNode::new(TaskKind::ComputeConfigurations, None, env));
        let mut graph = ExperimentDag {
            dag,
            names: HashMap::new(),
            root,
        };
        graph.register(root)?;

        let mut leaves = Vec::new();
        for group in expansion {
            let ds = Some(*group.ds_config);
            let pvc = graph.add_child(root, TaskNode::new(TaskKind::DatasetPvc, ds, env))?;
            let volume =
                graph.add_child(pvc, TaskNode::new(TaskKind::DatasetVolume, ds, env))?;
            let generate =
                graph.add_child(volume, TaskNode::new(TaskKind::GenerateDataset, ds, env))?;
            let relational = graph.add_child(
                generate,
                TaskNode::new(TaskKind::RelationalTransformer, ds, env),
            )?;
            let theoretical = graph.add_child(
                generate,
                TaskNode::new(TaskKind::TheoreticalTransformer, ds, env),
            )?;

            if group.dbs_config.is_empty() {
                leaves.push(relational);
                leaves.push(theoretical);
                continue;
            }

            for db in &group.dbs_config {
                let db = Some(db.configuration());
                let prepare = graph.add_child(
                    relational,
                    TaskNode::new(TaskKind::PrepareDatabase, db, env),
                )?;
                graph.add_edge(theoretical, prepare)?;
                let db_volume = graph.add_child(
                    prepare,
                    TaskNode::new(TaskKind::DatabaseVolume, db, env),
                )?;
                let cleanup = graph.add_node(TaskNode::new(TaskKind::RemoveServices, db, env))?;

                for backend in backends {
                    let store = graph.add_child(
                        db_volume,
                        TaskNode::new(TaskKind::Backend(*backend), db, env),
                    )?;
                    graph.add_edge(store, cleanup)?;
                    if *backend == Backend::Blazegraph {
                        let space = graph.add_child(
                            store,
                            TaskNode::new(TaskKind::BlazegraphSpace, db, env),
                        )?;
                        leaves.push(space);
                    }
                }
                leaves.push(cleanup);
            }
        }

        let aggregate = graph.add_node(TaskNode::new(TaskKind::AggregateLogs, None, env))?;
        if leaves.is_empty() {
            graph.add_edge(root, aggregate)?;
        }
        for leaf in leaves {
            graph.add_edge(leaf, aggregate)?;
        }
        graph.add_child(aggregate, TaskNode::new(TaskKind::TimePlots, None, env))?;
        graph.add_child(aggregate, TaskNode::new(TaskKind::SpacePlots, None, env))?;

        debug!(
            "Composed an experiment DAG of {} tasks and {} dependencies",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn register(&mut self, node: NodeIndex) -> Result<()> {
        let name = self.task(node)?.name.clone();
        if self.names.insert(name.clone(), node).is_some() {
            return Err(QuadbenchError::Dag(format!("duplicate task: {}", name)));
        }
        Ok(())
    }

    fn add_node(&mut self, node: TaskNode) -> Result<NodeIndex> {
        let n = self.dag.add_node(node);
        self.register(n)?;
        Ok(n)
    }

    /// Adds `node` as a child of `parent`.
    ///
    /// parent -> edge -> node
    fn add_child(&mut self, parent: NodeIndex, node: TaskNode) -> Result<NodeIndex> {
        let (_, n) = self.dag.add_child(parent, (), node);
        self.register(n)?;
        Ok(n)
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Result<()> {
        self.dag.add_edge(from, to, ()).map_err(|_| {
            QuadbenchError::Dag(format!(
                "a dependency from {:?} to {:?} would create a cycle",
                from, to
            ))
        })?;
        Ok(())
    }

    /// The task computing the configurations, on which everything depends.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Returns the task at `node`.
    pub fn task(&self, node: NodeIndex) -> Result<&TaskNode> {
        self.dag
            .node_weight(node)
            .ok_or_else(|| QuadbenchError::Dag(format!("no task at {:?}", node)))
    }

    /// Finds a task by name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.names.get(name).copied()
    }

    /// Returns the direct dependencies of `node`.
    pub fn parents(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut parents: Vec<_> = self
            .dag
            .parents(node)
            .iter(&self.dag)
            .map(|(_, n)| n)
            .collect();
        parents.sort_unstable();
        parents
    }

    /// Returns every task `node` transitively depends on.
    pub fn dependencies(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<_> = self.parents(node).into();
        while let Some(n) = queue.pop_front() {
            if seen.insert(n) {
                queue.extend(self.parents(n));
            }
        }
        let mut deps: Vec<_> = seen.into_iter().collect();
        deps.sort_unstable();
        deps
    }

    /// Return the depth of `node`: the length of the longest dependency
    /// chain from the root.
    pub fn depth(&self, node: NodeIndex) -> Result<usize> {
        let mut depths: HashMap<NodeIndex, usize> = HashMap::new();
        for n in self.topological_order()? {
            let depth = self
                .parents(n)
                .iter()
                .filter_map(|p| depths.get(p))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depths.insert(n, depth);
            if n == node {
                return Ok(depth);
            }
        }
        Err(QuadbenchError::Dag(format!("no task at {:?}", node)))
    }

    /// Returns every task in an order where each task comes after its
    /// dependencies.
    pub fn topological_order(&self) -> Result<Vec<NodeIndex>> {
        toposort(self.dag.graph(), None).map_err(|cycle| {
            QuadbenchError::Dag(format!("cycle through {:?}", cycle.node_id()))
        })
    }

    /// Lists every task with the names of its direct dependencies, in
    /// topological order.
    pub fn summary(&self) -> Result<Vec<TaskSummary>> {
        self.topological_order()?
            .into_iter()
            .map(|n| {
                let task = self.task(n)?;
                let depends_on = self
                    .parents(n)
                    .into_iter()
                    .map(|p| self.task(p).map(|t| t.name.clone()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TaskSummary {
                    name: task.name.clone(),
                    kind: task.kind,
                    image: task.image.clone(),
                    config: task.config,
                    services: task.services.clone(),
                    limits: task.limits.clone(),
                    selector: task.selector.clone(),
                    depends_on,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::{expand, fixed_configurations};

    fn env() -> ExperimentEnv {
        ExperimentEnv::from_lookup(|_| None).unwrap()
    }

    fn names(dag: &ExperimentDag, nodes: Vec<NodeIndex>) -> Vec<String> {
        nodes
            .into_iter()
            .map(|n| dag.task(n).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn single_database() -> Result<()> {
        let expansion = expand(&[1], &[1], &[0])?;
        let dag = ExperimentDag::build(&expansion, &Backend::DEFAULT, &env())?;

        // root, 5 dataset tasks, prepare, volume, 3 stores, space, cleanup,
        // aggregate and two plots
        assert_eq!(16, dag.node_count());

        let prepare = dag.find("prepare-database-ve1-pr1-st0").unwrap();
        assert_eq!(
            vec![
                "relational-transformer-ve1-pr1-st0".to_string(),
                "theoretical-transformer-ve1-pr1-st0".to_string()
            ],
            names(&dag, dag.parents(prepare))
        );

        let cleanup = dag.find("remove-services-ve1-pr1-st0").unwrap();
        assert_eq!(
            vec![
                "blazegraph-ve1-pr1-st0".to_string(),
                "converg-condensed-ve1-pr1-st0".to_string(),
                "converg-flat-ve1-pr1-st0".to_string()
            ],
            names(&dag, dag.parents(cleanup))
        );

        let space = dag.find("blazegraph-space-ve1-pr1-st0").unwrap();
        assert_eq!(TaskKind::BlazegraphSpace, dag.task(space)?.kind);
        assert_eq!(
            Some(env().images.python_requests),
            dag.task(space)?.image.clone()
        );

        let plots = dag.find("time-plots").unwrap();
        assert_eq!(dag.node_count() - 2, dag.dependencies(plots).len());
        Ok(())
    }

    #[test]
    fn datasets_are_shared() -> Result<()> {
        let expansion = expand(&[1, 10, 100], &[1], &[0, 10, 20])?;
        let dag = ExperimentDag::build(&expansion, &[Backend::Blazegraph], &env())?;

        // one generation per (product, step), one prepare per database
        let count = |kind: TaskKind| {
            dag.raw_nodes()
                .iter()
                .filter(|n| n.weight.kind == kind)
                .count()
        };
        assert_eq!(3, count(TaskKind::GenerateDataset));
        assert_eq!(9, count(TaskKind::PrepareDatabase));
        assert_eq!(9, count(TaskKind::Backend(Backend::Blazegraph)));
        assert_eq!(0, count(TaskKind::Backend(Backend::ConvergFlat)));

        let generate = dag.find("generate-dataset-ve100-pr1-st10").unwrap();
        for version in [1, 10, 100] {
            let store = dag
                .find(&format!("blazegraph-ve{}-pr1-st10", version))
                .unwrap();
            assert!(dag.dependencies(store).contains(&generate));
        }
        let other = dag.find("blazegraph-ve10-pr1-st20").unwrap();
        assert!(!dag.dependencies(other).contains(&generate));
        Ok(())
    }

    #[test]
    fn topological_order_and_depth() -> Result<()> {
        let dag = ExperimentDag::build(&fixed_configurations(), &Backend::DEFAULT, &env())?;
        let order = dag.topological_order()?;
        assert_eq!(dag.node_count(), order.len());
        assert_eq!(dag.root(), order[0]);

        let position: HashMap<_, _> = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        for n in &order {
            for p in dag.parents(*n) {
                assert!(position[&p] < position[n]);
            }
        }

        assert_eq!(0, dag.depth(dag.root())?);
        assert_eq!(
            3,
            dag.depth(dag.find("generate-dataset-ve100-pr20-st20").unwrap())?
        );
        // ... -> transformer -> prepare -> volume -> store -> cleanup -> aggregate
        assert_eq!(9, dag.depth(dag.find("aggregate-logs").unwrap())?);
        Ok(())
    }

    #[test]
    fn summary_lists_dependencies() -> Result<()> {
        let expansion = expand(&[2], &[1], &[0])?;
        let dag = ExperimentDag::build(&expansion, &[Backend::Jena], &env())?;
        let summary = dag.summary()?;
        assert_eq!(dag.node_count(), summary.len());
        assert_eq!("compute-configurations", summary[0].name);
        assert!(summary[0].depends_on.is_empty());

        let jena = summary.iter().find(|t| t.name == "jena-ve2-pr1-st0").unwrap();
        assert_eq!(vec!["database-volume-ve2-pr1-st0".to_string()], jena.depends_on);
        assert_eq!(Some("stain/jena-fuseki:5.1.0".to_string()), jena.image);

        let json = serde_json::to_string(&summary)?;
        assert!(json.contains(r#""kind":{"backend":"jena"}"#));
        assert!(json.contains(r#""kind":"remove-services""#));
        Ok(())
    }

    #[test]
    fn invalid_backends() -> Result<()> {
        let expansion = expand(&[1], &[1], &[0])?;
        assert!(ExperimentDag::build(&expansion, &[], &env()).is_err());
        assert!(
            ExperimentDag::build(&expansion, &[Backend::Jena, Backend::Jena], &env()).is_err()
        );
        assert_eq!(Backend::ConvergFlat, "flat".parse::<Backend>()?);
        assert!("oracle".parse::<Backend>().is_err());
        Ok(())
    }

    #[test]
    fn store_tasks_carry_services_and_limits() -> Result<()> {
        let expansion = expand(&[3], &[1], &[0])?;
        let env = env();
        let dag = ExperimentDag::build(
            &expansion,
            &[Backend::Blazegraph, Backend::ConvergFlat],
            &env,
        )?;

        let flat = dag.task(dag.find("converg-flat-ve3-pr1-st0").unwrap())?;
        assert_eq!(
            vec![env.images.quader.clone(), env.images.quaque.clone()],
            flat.services
        );
        assert_eq!(Some(env.limits.clone()), flat.limits);
        assert_eq!(None, flat.selector);

        let blazegraph = dag.task(dag.find("blazegraph-ve3-pr1-st0").unwrap())?;
        assert!(blazegraph.services.is_empty());
        assert_eq!(Some(200), blazegraph.limits.as_ref().map(|l| l.repeat));

        let cleanup = dag.task(dag.find("remove-services-ve3-pr1-st0").unwrap())?;
        assert_eq!(Some("v-3-p-1-s-0".to_string()), cleanup.selector);
        assert_eq!(None, cleanup.limits);

        let json = serde_json::to_string(&dag.summary()?)?;
        assert!(json.contains(r#""selector":"v-3-p-1-s-0""#));
        assert!(json.contains(r#""memory_limit":8"#));
        Ok(())
    }

    #[test]
    fn duplicate_databases_never_reach_the_graph() {
        let json = concat!(
            r#"[{"ds_config": {"version": 10, "product": 1, "step": 0}, "dbs_config": ["#,
            r#"{"version": 1, "product": 1, "step": 0}, {"version": 1, "product": 1, "step": 0}]}]"#
        );
        assert!(matches!(
            ExpansionResult::from_json(json),
            Err(QuadbenchError::InconsistentGrouping(_))
        ));
    }
}
