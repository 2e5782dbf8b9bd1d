//! Run configuration
//!
//! Everything one invocation needs to know: which file, which targets, what
//! to do with them, and how strictly to check the graph first.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{MakeError, Result};
use crate::executor::ExecutorConfig;
use crate::graph::Graph;
use crate::parser::parse_file;
use crate::validate::{ValidatedGraph, ValidationOptions};

/// Makefile read when no path is given
pub const DEFAULT_MAKEFILE: &str = "Makefile";

/// Output formats for the dependency graph
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraphFormat {
    #[default]
    Text,
    Dot,
    Json,
}

/// What an invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Build the requested targets
    Build,
    /// Parse and validate only
    Check,
    /// List declared targets
    List,
    /// Print the dependency graph
    Graph(GraphFormat),
}

/// Configuration for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Makefile to read
    pub file: PathBuf,
    /// Targets to build, in order
    pub targets: Vec<String>,
    pub mode: Mode,
    pub validation: ValidationOptions,
    pub executor: ExecutorConfig,
}

impl Config {
    /// Build `targets` from `file` with default settings
    pub fn build(file: impl Into<PathBuf>, targets: Vec<String>) -> Result<Self> {
        Self::new(file, targets, Mode::Build)
    }

    /// Building needs at least one target; the inspection modes need none
    pub fn new(file: impl Into<PathBuf>, targets: Vec<String>, mode: Mode) -> Result<Self> {
        if mode == Mode::Build && targets.is_empty() {
            return Err(MakeError::MissingTarget);
        }

        Ok(Self {
            file: file.into(),
            targets,
            mode,
            validation: ValidationOptions::default(),
            executor: ExecutorConfig::default(),
        })
    }

    /// Parse the makefile without validating it
    pub fn parse(&self) -> Result<Graph> {
        parse_file(&self.file)
    }

    /// Parse and validate the makefile
    pub fn load(&self) -> Result<ValidatedGraph> {
        ValidatedGraph::new(self.parse()?, &self.validation)
    }
}
