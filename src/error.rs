//! Error types for minimake
//!
//! Uses `miette` for pretty error reporting with source spans and help text.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for minimake operations
#[derive(Error, Diagnostic, Debug)]
pub enum MakeError {
    #[error("No target given")]
    #[diagnostic(
        code(minimake::usage::missing_target),
        help("Pass a target with -t <TARGET>, e.g. `minimake -f Makefile -t build`")
    )]
    MissingTarget,

    #[error("Failed to read makefile {}", .path.display())]
    #[diagnostic(
        code(minimake::io::read),
        help("Check the path, or point at another file with -f")
    )]
    ReadMakefile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid target line {line}: expected exactly one ':' but found {separators}")]
    #[diagnostic(
        code(minimake::format::header),
        help("Target lines look like `name: dep1 dep2`; command lines start with a tab")
    )]
    MalformedHeader {
        line: usize,
        separators: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Target line {line} has an empty name")]
    #[diagnostic(code(minimake::format::empty_name))]
    MissingTargetName {
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("no name before ':'")]
        span: SourceSpan,
    },

    #[error("Invalid target name '{name}'")]
    #[diagnostic(
        code(minimake::format::invalid_name),
        help("Target names cannot contain whitespace")
    )]
    InvalidTargetName {
        name: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("Command on line {line} does not belong to any target")]
    #[diagnostic(
        code(minimake::format::orphan_command),
        help("Declare a target line (`name:`) above the first command")
    )]
    CommandOutsideTarget {
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("command before any target")]
        span: SourceSpan,
    },

    #[error("Target '{name}' is defined more than once (first defined on line {first_line})")]
    #[diagnostic(code(minimake::format::duplicate_target))]
    DuplicateTarget {
        name: String,
        first_line: usize,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("redefined here")]
        span: SourceSpan,
    },

    #[error("Target '{target}' has no commands")]
    #[diagnostic(
        code(minimake::validate::missing_commands),
        help("Add at least one tab-indented command below the target line")
    )]
    MissingCommands { target: String },

    #[error("Target '{target}' depends on undeclared target '{dependency}'")]
    #[diagnostic(
        code(minimake::validate::unknown_dependency),
        help("Declare '{dependency}' or drop --strict to treat it as an empty target")
    )]
    UnknownDependency { target: String, dependency: String },

    #[error("Circular dependency detected: {cycle}")]
    #[diagnostic(
        code(minimake::graph::cycle),
        help("Check the dependency lists of the targets in the cycle")
    )]
    CyclicDependency { cycle: String },

    #[error("Target '{name}' not found")]
    #[diagnostic(
        code(minimake::graph::target_not_found),
        help("Run `minimake --list` to see available targets")
    )]
    TargetNotFound { name: String, available: Vec<String> },

    #[error("Command is empty")]
    #[diagnostic(code(minimake::exec::empty_command))]
    EmptyCommand { command: String },

    #[error("Command not found: {program}")]
    #[diagnostic(
        code(minimake::exec::command_not_found),
        help("Ensure the command is installed and in your PATH")
    )]
    CommandNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to start command `{command}`")]
    #[diagnostic(code(minimake::exec::spawn))]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed with {}", exit_description(.code))]
    #[diagnostic(code(minimake::exec::failed))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to serialize output")]
    #[diagnostic(code(minimake::output))]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error")]
    #[diagnostic(code(minimake::io))]
    Io(#[from] std::io::Error),
}

impl MakeError {
    /// Whether this error comes from how the tool was invoked rather than
    /// from the makefile or the commands it runs
    pub fn is_usage(&self) -> bool {
        matches!(self, MakeError::MissingTarget)
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for minimake operations
pub type Result<T> = std::result::Result<T, MakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_target_is_usage() {
        assert!(MakeError::MissingTarget.is_usage());
        assert!(!MakeError::MissingCommands {
            target: "build".to_string()
        }
        .is_usage());
    }

    #[test]
    fn test_command_failed_message() {
        let err = MakeError::CommandFailed {
            command: "false".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "Command `false` failed with exit code 1");

        let err = MakeError::CommandFailed {
            command: "sleep 10".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
