//! minimake - a minimal make-like build tool
//!
//! Reads a Makefile-style file of targets, each with dependencies and
//! commands, and runs the commands a requested target needs, dependencies
//! first. No variables, pattern rules or timestamp checks: only ordering
//! and execution.
//!
//! # Example
//!
//! ```text
//! # Makefile
//!
//! build:
//! 	@echo building
//! 	cargo build
//!
//! test: build
//! 	cargo test
//! ```
//!
//! # Library Usage
//!
//! ```rust,ignore
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> minimake::Result<()> {
//!     minimake::execute("Makefile", "test").await?;
//!     Ok(())
//! }
//! ```

use std::path::Path;

pub mod config;
pub mod cycle;
pub mod error;
pub mod executor;
pub mod graph;
pub mod parser;
pub mod runner;
pub mod validate;

// Re-export main types
pub use config::{Config, GraphFormat, Mode, DEFAULT_MAKEFILE};
pub use cycle::detect_cycle;
pub use error::{MakeError, Result};
pub use executor::{ExecutionPlan, ExecutionReport, Executor, ExecutorConfig, TargetResult};
pub use graph::{Graph, Target};
pub use parser::{parse, parse_file};
pub use runner::{CommandLine, CommandRunner, DryRunRunner, ProcessRunner};
pub use validate::{ValidatedGraph, ValidationOptions};

/// Parse `file_path`, validate it, and build `target_name`
pub async fn execute(file_path: impl AsRef<Path>, target_name: &str) -> Result<ExecutionReport> {
    let config = Config::build(file_path.as_ref(), vec![target_name.to_string()])?;
    run(&config).await
}

/// Build every target in `config`, in order, stopping at the first failure.
/// A dependency shared by several requested targets runs once.
pub async fn run(config: &Config) -> Result<ExecutionReport> {
    if config.targets.is_empty() {
        return Err(MakeError::MissingTarget);
    }

    let graph = config.load()?;
    let exec = &config.executor;

    if exec.dry_run {
        build_all(DryRunRunner::new(), &graph, &config.targets).await
    } else {
        let runner = ProcessRunner::new(exec.cwd.clone(), exec.silent);
        build_all(runner, &graph, &config.targets).await
    }
}

async fn build_all<R: CommandRunner>(
    runner: R,
    graph: &ValidatedGraph,
    targets: &[String],
) -> Result<ExecutionReport> {
    Executor::new(runner).execute_all(graph, targets).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_MAKEFILE: &str = "build:
\t@echo 'executing build'
\t@true

test: build
\t@echo 'executing test'

publish: test
\t@echo 'executing publish'
";

    fn makefile(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_execute_valid_target() {
        let file = makefile(VALID_MAKEFILE);
        let report = execute(file.path(), "publish").await.unwrap();

        let names: Vec<_> = report.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["build", "test", "publish"]);
        assert_eq!(report.commands(), 4);
    }

    #[tokio::test]
    async fn test_execute_invalid_target() {
        let file = makefile(VALID_MAKEFILE);
        let result = execute(file.path(), "go").await;
        assert!(matches!(result, Err(MakeError::TargetNotFound { .. })));
    }

    #[tokio::test]
    async fn test_execute_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(dir.path().join("Makefile"), "build").await;
        assert!(matches!(result, Err(MakeError::ReadMakefile { .. })));
    }

    #[tokio::test]
    async fn test_execute_rejects_cycle_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let file = makefile(&format!(
            "a: b\n\t@touch {}\nb: a\n\t@touch {}\n",
            marker.display(),
            marker.display()
        ));

        let result = execute(file.path(), "a").await;

        assert!(matches!(result, Err(MakeError::CyclicDependency { .. })));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let file = makefile("build:\n\t@true\n\t@false\ntest: build\n\t@true\n");
        let result = execute(file.path(), "test").await;
        assert!(matches!(result, Err(MakeError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_dry_run_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let file = makefile(&format!("a:\n\t@touch {}\n", marker.display()));

        let mut config = Config::build(file.path(), vec!["a".into()]).unwrap();
        config.executor.dry_run = true;
        run(&config).await.unwrap();

        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_multiple_targets_in_order() {
        let file = makefile("a:\n\t@true\nb: a\n\t@true\nc:\n\t@true\n");
        let config = Config::build(file.path(), vec!["c".into(), "b".into()]).unwrap();

        let report = run(&config).await.unwrap();

        let names: Vec<_> = report.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_shared_dependency_runs_once_per_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log");
        let file = makefile(&format!(
            "build:\n\t@touch {log}\ntest: build\n\t@true\npublish: build\n\t@true\n",
            log = log.display()
        ));
        let config = Config::build(file.path(), vec!["test".into(), "publish".into()]).unwrap();

        let report = run(&config).await.unwrap();

        let names: Vec<_> = report.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["build", "test", "publish"]);
        assert_eq!(report.commands(), 3);
        assert!(log.exists());
    }
}
