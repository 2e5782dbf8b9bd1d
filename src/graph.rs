//! Target graph
//!
//! Targets live in a petgraph `DiGraph` with a name index on the side.
//! Edges run from a target to each declared dependency that names another
//! target; the raw dependency names are kept on the target itself so their
//! declaration order survives.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;

/// A named build unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub name: String,
    /// Dependency names in declaration order, unresolved
    pub dependencies: Vec<String>,
    /// Raw command lines in file order
    pub commands: Vec<String>,
    /// 1-based line of the target header
    #[serde(skip)]
    pub line: usize,
}

impl Target {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            dependencies,
            commands: Vec::new(),
            line,
        }
    }
}

/// The target dependency graph
#[derive(Debug, Default)]
pub struct Graph {
    graph: DiGraph<Target, ()>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target. Returns the already declared target if the name is taken.
    pub(crate) fn insert(&mut self, target: Target) -> std::result::Result<NodeIndex, &Target> {
        if let Some(&idx) = self.name_to_index.get(&target.name) {
            return Err(&self.graph[idx]);
        }

        let name = target.name.clone();
        let idx = self.graph.add_node(target);
        self.name_to_index.insert(name, idx);
        Ok(idx)
    }

    pub(crate) fn push_command(&mut self, idx: NodeIndex, command: String) {
        self.graph[idx].commands.push(command);
    }

    /// Add an edge for every dependency that names a declared target.
    /// Called once the whole file has been read.
    pub(crate) fn link_dependencies(&mut self) {
        let mut edges = Vec::new();
        for idx in self.graph.node_indices() {
            for dep in &self.graph[idx].dependencies {
                if let Some(&dep_idx) = self.name_to_index.get(dep) {
                    edges.push((idx, dep_idx));
                }
            }
        }

        for (from, to) in edges {
            self.graph.update_edge(from, to, ());
        }
    }

    /// Check if a target exists
    pub fn has_target(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get a target by name
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.name_to_index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Targets in declaration order
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.graph.node_weights()
    }

    /// Target names in declaration order
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Dependencies of `name` that are not declared targets
    pub fn undeclared_dependencies<'a>(&'a self, name: &str) -> Vec<&'a str> {
        self.get(name)
            .map(|target| {
                target
                    .dependencies
                    .iter()
                    .filter(|dep| !self.has_target(dep))
                    .map(|dep| dep.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolved `(target, dependency)` pairs, in declaration order
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.targets()
            .flat_map(|target| {
                target
                    .dependencies
                    .iter()
                    .filter(|dep| self.has_target(dep))
                    .map(move |dep| (target.name.as_str(), dep.as_str()))
            })
            .collect()
    }

    /// Every target after all of its dependencies, or `None` if the graph
    /// has a cycle
    pub fn topological_order(&self) -> Option<Vec<&Target>> {
        let mut sorted = petgraph::algo::toposort(&self.graph, None).ok()?;
        // edges point at dependencies, so the sort lists dependents first
        sorted.reverse();
        Some(sorted.into_iter().map(|idx| &self.graph[idx]).collect())
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &DiGraph<Target, ()> {
        &self.graph
    }
}
