//! Graph validation
//!
//! Cheap per-target checks (commands present and runnable, dependencies
//! declared) run first, then cycle detection. Only a graph that passed all
//! of them becomes a [`ValidatedGraph`], which is what the executor accepts.

use std::ops::Deref;

use crate::cycle::detect_cycle;
use crate::error::{MakeError, Result};
use crate::graph::Graph;
use crate::runner::CommandLine;

/// Switches for the optional checks
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Reject dependencies on targets that are never declared
    pub strict: bool,
}

/// Every target must have at least one command
pub fn check_commands(graph: &Graph) -> Result<()> {
    match graph.targets().find(|t| t.commands.is_empty()) {
        Some(target) => Err(MakeError::MissingCommands {
            target: target.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Every dependency must name a declared target
pub fn check_dependencies(graph: &Graph) -> Result<()> {
    for target in graph.targets() {
        if let Some(dep) = graph.undeclared_dependencies(&target.name).first() {
            return Err(MakeError::UnknownDependency {
                target: target.name.clone(),
                dependency: dep.to_string(),
            });
        }
    }
    Ok(())
}

/// Every command line must have something to run once its quiet marker is
/// stripped, so a bare `@` fails here rather than halfway through a build
pub fn check_command_lines(graph: &Graph) -> Result<()> {
    for target in graph.targets() {
        for command in &target.commands {
            CommandLine::parse(command)?;
        }
    }
    Ok(())
}

/// A graph that passed validation and cycle detection
#[derive(Debug)]
pub struct ValidatedGraph {
    graph: Graph,
}

impl ValidatedGraph {
    pub fn new(graph: Graph, options: &ValidationOptions) -> Result<Self> {
        check_commands(&graph)?;
        check_command_lines(&graph)?;
        if options.strict {
            check_dependencies(&graph)?;
        }
        detect_cycle(&graph)?;

        Ok(Self { graph })
    }
}

impl Deref for ValidatedGraph {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn strict() -> ValidationOptions {
        ValidationOptions { strict: true }
    }

    #[test]
    fn test_all_targets_have_commands() {
        let graph = parse("build:\n\techo b\ntest: build\n\techo t\n").unwrap();
        assert!(check_commands(&graph).is_ok());
    }

    #[test]
    fn test_target_without_commands() {
        let graph = parse("build:\n\ntest: build\n\ntarget: test\n\techo ok\n").unwrap();
        match check_commands(&graph) {
            Err(MakeError::MissingCommands { target }) => assert_eq!(target, "build"),
            other => panic!("expected missing commands, got {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_dependency() {
        let graph = parse("build: fetch\n\techo b\n").unwrap();
        match check_dependencies(&graph) {
            Err(MakeError::UnknownDependency { target, dependency }) => {
                assert_eq!(target, "build");
                assert_eq!(dependency, "fetch");
            }
            other => panic!("expected unknown dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_by_default() {
        let graph = parse("build: fetch\n\techo b\n").unwrap();
        assert!(ValidatedGraph::new(graph, &ValidationOptions::default()).is_ok());
    }

    #[test]
    fn test_strict_rejects_undeclared() {
        let graph = parse("build: fetch\n\techo b\n").unwrap();
        assert!(matches!(
            ValidatedGraph::new(graph, &strict()),
            Err(MakeError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_commands_checked_before_cycles() {
        let graph = parse("a: b\nb: a\n\ttrue\n").unwrap();
        assert!(matches!(
            ValidatedGraph::new(graph, &ValidationOptions::default()),
            Err(MakeError::MissingCommands { .. })
        ));
    }

    #[test]
    fn test_bare_quiet_marker_rejected() {
        let graph = parse("a:\n\t@\n").unwrap();
        assert_eq!(graph.get("a").unwrap().commands, vec!["@"]);
        assert!(matches!(
            ValidatedGraph::new(graph, &ValidationOptions::default()),
            Err(MakeError::EmptyCommand { .. })
        ));
    }

    #[test]
    fn test_command_lines_checked_before_cycles() {
        let graph = parse("a: b\n\t@  \nb: a\n\ttrue\n").unwrap();
        assert!(matches!(
            check_command_lines(&graph),
            Err(MakeError::EmptyCommand { .. })
        ));
        assert!(matches!(
            ValidatedGraph::new(graph, &strict()),
            Err(MakeError::EmptyCommand { .. })
        ));
    }

    #[test]
    fn test_rejects_cycle() {
        let graph = parse("a: b\n\ttrue\nb: a\n\ttrue\n").unwrap();
        assert!(matches!(
            ValidatedGraph::new(graph, &strict()),
            Err(MakeError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_derefs_to_graph() {
        let graph = parse("a:\n\ttrue\n").unwrap();
        let validated = ValidatedGraph::new(graph, &strict()).unwrap();
        assert!(validated.has_target("a"));
        assert_eq!(validated.len(), 1);
    }
}
