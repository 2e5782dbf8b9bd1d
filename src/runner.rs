//! Running individual command lines
//!
//! A command line is split on whitespace into a program and its arguments;
//! there is no shell in between. A leading `@` keeps the line from being
//! echoed before it runs.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{MakeError, Result};

/// Suppresses the echo of a command line
pub const QUIET_MARKER: char = '@';

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    text: String,
    quiet: bool,
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim_start();
        let (quiet, text) = match trimmed.strip_prefix(QUIET_MARKER) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        // single quotes group nothing; they are dropped before splitting
        let unquoted = text.replace('\'', "");
        let mut words = unquoted.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| MakeError::EmptyCommand {
            command: raw.to_string(),
        })?;

        Ok(Self {
            text: text.to_string(),
            quiet,
            program,
            args: words.collect(),
        })
    }

    /// The line as echoed: marker stripped, quotes kept
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Something that can carry out command lines, one at a time
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&mut self, command: &CommandLine) -> Result<()>;
}

/// Spawns each command as a child process with inherited stdout and stderr
#[derive(Debug)]
pub struct ProcessRunner<W = std::io::Stdout> {
    out: W,
    cwd: PathBuf,
    silent: bool,
}

impl ProcessRunner {
    pub fn new(cwd: PathBuf, silent: bool) -> Self {
        Self::with_output(std::io::stdout(), cwd, silent)
    }
}

impl<W: Write> ProcessRunner<W> {
    /// Echo commands to `out` instead of stdout
    pub fn with_output(out: W, cwd: PathBuf, silent: bool) -> Self {
        Self { out, cwd, silent }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<W: Write> CommandRunner for ProcessRunner<W> {
    async fn run(&mut self, command: &CommandLine) -> Result<()> {
        if !command.is_quiet() && !self.silent {
            writeln!(self.out, "{}", command.text())?;
            self.out.flush()?;
        }

        let path = which::which_in(command.program(), std::env::var_os("PATH"), &self.cwd)
            .map_err(|e| MakeError::CommandNotFound {
                program: command.program().to_string(),
                source: e,
            })?;

        debug!(program = %path.display(), args = ?command.args(), "spawning");

        let status = Command::new(&path)
            .args(command.args())
            .current_dir(&self.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| MakeError::CommandSpawn {
                command: command.text().to_string(),
                source: e,
            })?;

        if !status.success() {
            return Err(MakeError::CommandFailed {
                command: command.text().to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// Prints every command, quiet or not, and runs nothing
#[derive(Debug)]
pub struct DryRunRunner<W = std::io::Stdout> {
    out: W,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::with_output(std::io::stdout())
    }
}

impl Default for DryRunRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DryRunRunner<W> {
    pub fn with_output(out: W) -> Self {
        Self { out }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<W: Write> CommandRunner for DryRunRunner<W> {
    async fn run(&mut self, command: &CommandLine) -> Result<()> {
        writeln!(self.out, "{}", command.text())?;
        Ok(())
    }
}
