//! Target execution engine
//!
//! Works out which targets a request needs, in order, and then feeds their
//! commands to a [`CommandRunner`] one by one, stopping at the first failure.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use console::style;
use tracing::{debug, info, warn};

use crate::error::{MakeError, Result};
use crate::graph::Target;
use crate::runner::{CommandLine, CommandRunner};
use crate::validate::ValidatedGraph;

/// Targets to build for one request, dependencies first
#[derive(Debug)]
pub struct ExecutionPlan<'g> {
    pub targets: Vec<&'g Target>,
}

impl<'g> ExecutionPlan<'g> {
    /// Depth-first walk from `name`: each dependency, left to right, is
    /// completed with its own dependencies before the next one starts, and
    /// the requested target comes last. A target reached along several
    /// paths is planned once.
    pub fn for_target(graph: &'g ValidatedGraph, name: &str) -> Result<Self> {
        Self::for_targets(graph, &[name])
    }

    /// Plan several requested targets in order. They share one walk, so a
    /// dependency common to two of them is still planned once.
    pub fn for_targets<S: AsRef<str>>(graph: &'g ValidatedGraph, names: &[S]) -> Result<Self> {
        let mut walk = Walk {
            graph,
            completed: HashSet::new(),
            targets: Vec::new(),
        };

        for name in names {
            let name = name.as_ref();
            let Some(root) = graph.get(name) else {
                return Err(MakeError::TargetNotFound {
                    name: name.to_string(),
                    available: graph.target_names().map(str::to_string).collect(),
                });
            };
            walk.visit(root);
        }

        Ok(Self {
            targets: walk.targets,
        })
    }

    /// Total number of commands across the plan
    pub fn command_count(&self) -> usize {
        self.targets.iter().map(|t| t.commands.len()).sum()
    }
}

struct Walk<'g> {
    graph: &'g ValidatedGraph,
    completed: HashSet<&'g str>,
    targets: Vec<&'g Target>,
}

impl<'g> Walk<'g> {
    // Recursion depth is bounded because the graph is known to be acyclic.
    fn visit(&mut self, target: &'g Target) {
        if self.completed.contains(target.name.as_str()) {
            return;
        }

        let graph = self.graph;
        for dep in graph.undeclared_dependencies(&target.name) {
            if self.completed.insert(dep) {
                warn!(name = %target.name, dependency = dep, "skipping undeclared dependency");
            }
        }
        for dep in &target.dependencies {
            if let Some(dep_target) = graph.get(dep) {
                self.visit(dep_target);
            }
        }

        self.completed.insert(target.name.as_str());
        self.targets.push(target);
    }
}

/// Result of building a single target
#[derive(Debug)]
pub struct TargetResult {
    pub name: String,
    pub commands: usize,
    pub duration: Duration,
}

/// What one `execute` or `execute_all` call built
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub targets: Vec<TargetResult>,
}

impl ExecutionReport {
    pub fn commands(&self) -> usize {
        self.targets.iter().map(|t| t.commands).sum()
    }

    pub fn duration(&self) -> Duration {
        self.targets.iter().map(|t| t.duration).sum()
    }
}

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Print commands without running them
    pub dry_run: bool,
    /// Never echo commands
    pub silent: bool,
    /// Working directory for commands
    pub cwd: PathBuf,
    /// Print a summary after the run
    pub verbose: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            silent: false,
            cwd: std::env::current_dir().unwrap_or_default(),
            verbose: false,
        }
    }
}

/// Target executor
pub struct Executor<R> {
    runner: R,
}

impl<R: CommandRunner> Executor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Build `target_name` and everything it depends on
    pub async fn execute(
        &mut self,
        graph: &ValidatedGraph,
        target_name: &str,
    ) -> Result<ExecutionReport> {
        self.execute_all(graph, &[target_name]).await
    }

    /// Build every target in `target_names`, in order. Each target runs at
    /// most once across the whole call.
    pub async fn execute_all<S: AsRef<str>>(
        &mut self,
        graph: &ValidatedGraph,
        target_names: &[S],
    ) -> Result<ExecutionReport> {
        let plan = ExecutionPlan::for_targets(graph, target_names)?;
        debug!(
            requested = target_names.len(),
            targets = plan.targets.len(),
            commands = plan.command_count(),
            "planned"
        );

        let mut report = ExecutionReport::default();
        for target in &plan.targets {
            report.targets.push(self.build(target).await?);
        }

        Ok(report)
    }

    async fn build(&mut self, target: &Target) -> Result<TargetResult> {
        let start = Instant::now();

        for raw in &target.commands {
            let command = CommandLine::parse(raw)?;
            self.runner.run(&command).await?;
        }

        let duration = start.elapsed();
        info!(name = %target.name, elapsed = ?duration, "built");

        Ok(TargetResult {
            name: target.name.clone(),
            commands: target.commands.len(),
            duration,
        })
    }
}

/// Print a per-target summary
pub fn print_summary(report: &ExecutionReport) {
    println!();

    for result in &report.targets {
        println!(
            "{} {} {}",
            style("✓").green(),
            style(&result.name).bold(),
            style(format!("{:.2}s", result.duration.as_secs_f64())).dim()
        );
    }

    println!(
        "{} {} targets, {} commands in {:.2}s",
        style("✓").green().bold(),
        report.targets.len(),
        report.commands(),
        report.duration().as_secs_f64()
    );
}
