//! CLI argument definitions
//!
//! Uses `clap` derive API for argument parsing.

use std::path::PathBuf;

use clap::Parser;

use minimake::config::{Config, GraphFormat, Mode, DEFAULT_MAKEFILE};
use minimake::error::Result;
use minimake::executor::ExecutorConfig;
use minimake::validate::ValidationOptions;

/// minimake - run Makefile targets, dependencies first
#[derive(Parser, Debug)]
#[command(name = "minimake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the makefile
    #[arg(short, long, env = "MINIMAKE_FILE", default_value = DEFAULT_MAKEFILE)]
    pub file: PathBuf,

    /// Target to build (repeatable)
    #[arg(short = 't', long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Targets to build (same as -t)
    #[arg(value_name = "TARGETS")]
    pub positional: Vec<String>,

    /// Print commands without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not echo commands before running them
    #[arg(short, long)]
    pub silent: bool,

    /// Reject dependencies on undeclared targets
    #[arg(long)]
    pub strict: bool,

    /// Change to DIR before doing anything
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Print a summary after building
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Parse and validate the makefile, then exit
    #[arg(long, conflicts_with_all = ["list", "graph"])]
    pub check: bool,

    /// List declared targets
    #[arg(long, conflicts_with = "graph")]
    pub list: bool,

    /// Print the dependency graph (`--graph=dot` picks a format)
    #[arg(
        long,
        value_enum,
        value_name = "FORMAT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "text"
    )]
    pub graph: Option<GraphFormat>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.list {
            Mode::List
        } else if let Some(format) = self.graph {
            Mode::Graph(format)
        } else {
            Mode::Build
        }
    }

    /// Turn the parsed arguments into a run configuration. Usage errors are
    /// reported before `--directory` changes the working directory.
    pub fn into_config(self) -> Result<Config> {
        let mode = self.mode();
        let mut targets = self.targets;
        targets.extend(self.positional);

        let mut config = Config::new(self.file, targets, mode)?;

        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        config.validation = ValidationOptions {
            strict: self.strict,
        };
        config.executor = ExecutorConfig {
            dry_run: self.dry_run,
            silent: self.silent,
            verbose: self.verbose,
            cwd: std::env::current_dir()?,
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimake::MakeError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("minimake").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["-t", "build"]);
        assert_eq!(cli.file, PathBuf::from(DEFAULT_MAKEFILE));
        assert_eq!(cli.mode(), Mode::Build);

        let config = cli.into_config().unwrap();
        assert_eq!(config.targets, vec!["build"]);
        assert!(!config.executor.dry_run);
    }

    #[test]
    fn test_file_and_positional_targets() {
        let cli = parse(&["-f", "build.mk", "-t", "a", "b", "c"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.file, PathBuf::from("build.mk"));
        assert_eq!(config.targets, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_target_is_usage_error() {
        let result = parse(&["-f", "Makefile"]).into_config();
        assert!(matches!(result, Err(MakeError::MissingTarget)));
    }

    #[test]
    fn test_graph_format() {
        assert_eq!(parse(&["--graph"]).mode(), Mode::Graph(GraphFormat::Text));
        assert_eq!(parse(&["--graph=dot"]).mode(), Mode::Graph(GraphFormat::Dot));
    }

    #[test]
    fn test_graph_does_not_swallow_target() {
        let cli = parse(&["--graph", "build"]);
        assert_eq!(cli.mode(), Mode::Graph(GraphFormat::Text));
        assert_eq!(cli.positional, vec!["build"]);
    }

    #[test]
    fn test_missing_target_reported_before_directory_change() {
        let before = std::env::current_dir().unwrap();
        let result = parse(&["-C", "/nonexistent/minimake-dir"]).into_config();

        assert!(matches!(result, Err(MakeError::MissingTarget)));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_inspection_modes_conflict() {
        let result = Cli::try_parse_from(["minimake", "--check", "--list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_runner_flags() {
        let config = parse(&["-n", "-s", "-v", "--strict", "-t", "x"])
            .into_config()
            .unwrap();
        assert!(config.executor.dry_run);
        assert!(config.executor.silent);
        assert!(config.executor.verbose);
        assert!(config.validation.strict);
    }
}
