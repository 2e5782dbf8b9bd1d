//! Makefile parsing
//!
//! A single pass over the file, line by line:
//!
//! ```text
//! # comment
//! build: fetch
//! 	@echo building
//! 	cargo build
//! ```
//!
//! Blank lines and comments are skipped without closing the current target.
//! A tab-indented line is a command of the most recent target. Anything else
//! must be a `name: deps...` header with exactly one `:`.

use std::path::Path;

use miette::{NamedSource, SourceSpan};
use tracing::debug;

use crate::error::{MakeError, Result};
use crate::graph::{Graph, Target};

/// Marks a command line
pub const COMMAND_PREFIX: char = '\t';
/// Separates a target name from its dependencies
pub const SEPARATOR: char = ':';
/// Starts a comment line
pub const COMMENT: char = '#';

/// Name used in diagnostics when the source has no file behind it
const ANONYMOUS_SOURCE: &str = "<makefile>";

/// Read and parse the makefile at `path`
pub fn parse_file(path: &Path) -> Result<Graph> {
    let source = std::fs::read_to_string(path).map_err(|e| MakeError::ReadMakefile {
        path: path.to_path_buf(),
        source: e,
    })?;

    Parser::new(&path.display().to_string(), &source).parse()
}

/// Parse makefile text
pub fn parse(source: &str) -> Result<Graph> {
    Parser::new(ANONYMOUS_SOURCE, source).parse()
}

struct Parser<'a> {
    name: &'a str,
    source: &'a str,
}

/// One physical line with its position in the source
struct Line<'a> {
    text: &'a str,
    number: usize,
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(name: &'a str, source: &'a str) -> Self {
        Self { name, source }
    }

    fn parse(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        let mut current = None;

        for line in self.lines() {
            let trimmed = line.text.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT) {
                continue;
            }

            if let Some(command) = line.text.strip_prefix(COMMAND_PREFIX) {
                let idx = current.ok_or_else(|| MakeError::CommandOutsideTarget {
                    line: line.number,
                    src: self.named_source(),
                    span: line.span(),
                })?;
                graph.push_command(idx, command.to_string());
                continue;
            }

            let target = self.parse_header(&line)?;
            debug!(name = %target.name, deps = ?target.dependencies, "declared target");

            match graph.insert(target) {
                Ok(idx) => current = Some(idx),
                Err(existing) => {
                    return Err(MakeError::DuplicateTarget {
                        name: existing.name.clone(),
                        first_line: existing.line,
                        line: line.number,
                        src: self.named_source(),
                        span: line.span(),
                    });
                }
            }
        }

        graph.link_dependencies();
        Ok(graph)
    }

    fn parse_header(&self, line: &Line<'_>) -> Result<Target> {
        let separators = line.text.matches(SEPARATOR).count();
        let Some((name, deps)) = line.text.split_once(SEPARATOR).filter(|_| separators == 1) else {
            return Err(MakeError::MalformedHeader {
                line: line.number,
                separators,
                src: self.named_source(),
                span: line.span(),
            });
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(MakeError::MissingTargetName {
                line: line.number,
                src: self.named_source(),
                span: line.span(),
            });
        }
        if name.contains(char::is_whitespace) {
            return Err(MakeError::InvalidTargetName {
                name: name.to_string(),
                line: line.number,
                src: self.named_source(),
                span: line.span(),
            });
        }

        let dependencies = deps.split_whitespace().map(str::to_string).collect();
        Ok(Target::new(name, dependencies, line.number))
    }

    fn lines(&self) -> impl Iterator<Item = Line<'a>> + 'a {
        let mut offset = 0;
        self.source
            .split_inclusive('\n')
            .enumerate()
            .map(move |(i, raw)| {
                let line = Line {
                    text: raw.trim_end_matches('\n').trim_end_matches('\r'),
                    number: i + 1,
                    offset,
                };
                offset += raw.len();
                line
            })
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name, self.source.to_string())
    }
}

impl Line<'_> {
    fn span(&self) -> SourceSpan {
        (self.offset, self.text.len()).into()
    }
}
