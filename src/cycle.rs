//! Cycle detection over the target graph
//!
//! Depth-first search that tracks fully explored targets and the targets on
//! the current path. Reaching a target that is still on the path closes a
//! cycle. Dependencies that name no declared target have no outgoing edges
//! and so never take part in one.

use std::collections::HashSet;

use crate::error::{MakeError, Result};
use crate::graph::Graph;

/// Fail with [`MakeError::CyclicDependency`] if any target depends on itself,
/// directly or transitively
pub fn detect_cycle(graph: &Graph) -> Result<()> {
    let mut search = Search {
        graph,
        visited: HashSet::new(),
        on_stack: HashSet::new(),
        path: Vec::new(),
    };

    for name in graph.target_names() {
        if !search.visited.contains(name) {
            search.visit(name)?;
        }
    }

    Ok(())
}

struct Search<'g> {
    graph: &'g Graph,
    visited: HashSet<&'g str>,
    on_stack: HashSet<&'g str>,
    path: Vec<&'g str>,
}

impl<'g> Search<'g> {
    fn visit(&mut self, name: &'g str) -> Result<()> {
        self.visited.insert(name);
        self.on_stack.insert(name);
        self.path.push(name);

        let graph = self.graph;
        if let Some(target) = graph.get(name) {
            for dep in &target.dependencies {
                let dep = dep.as_str();
                if self.on_stack.contains(dep) {
                    return Err(MakeError::CyclicDependency {
                        cycle: self.describe(dep),
                    });
                }
                if !self.visited.contains(dep) {
                    self.visit(dep)?;
                }
            }
        }

        self.path.pop();
        self.on_stack.remove(name);
        Ok(())
    }

    /// `a -> b -> a`, starting where the path first entered `closing`
    fn describe(&self, closing: &str) -> String {
        let start = self
            .path
            .iter()
            .position(|&n| n == closing)
            .unwrap_or_default();

        let mut names = self.path[start..].to_vec();
        names.push(closing);
        names.join(" -> ")
    }
}
