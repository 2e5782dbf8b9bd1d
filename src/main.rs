//! minimake - run Makefile targets, dependencies first
//!
//! Reads a Makefile, checks it for format errors, targets without commands
//! and dependency cycles, then runs the commands the requested targets need.

use std::process::ExitCode;

use clap::Parser;
use console::style;

mod cli;

use cli::Cli;
use minimake::config::{GraphFormat, Mode};
use minimake::error::Result;
use minimake::executor::print_summary;
use minimake::graph::Graph;

/// Exit status for invocation mistakes, as opposed to build failures
const USAGE_EXIT: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Set up panic handler for nice error messages
    miette::set_panic_hook();

    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = if e.is_usage() { USAGE_EXIT } else { 1 };
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;

    match config.mode {
        Mode::Build => {
            let report = minimake::run(&config).await?;
            if config.executor.verbose {
                print_summary(&report);
            }
            Ok(())
        }

        Mode::Check => {
            let graph = config.load()?;
            println!(
                "{} {} is valid ({} targets)",
                style("✓").green(),
                config.file.display(),
                graph.len()
            );
            Ok(())
        }

        Mode::List => {
            let graph = config.parse()?;
            print_target_list(&graph);
            Ok(())
        }

        Mode::Graph(format) => {
            let graph = config.parse()?;
            print_graph(&graph, format)
        }
    }
}

fn print_target_list(graph: &Graph) {
    println!("{}", style("Available targets:").bold());
    println!();

    let max_name_len = graph.target_names().map(str::len).max().unwrap_or(0);

    for target in graph.targets() {
        print!(
            "  {}{}",
            style(&target.name).cyan().bold(),
            " ".repeat(max_name_len - target.name.len()),
        );

        if !target.dependencies.is_empty() {
            print!(
                "  {}",
                style(format!("[deps: {}]", target.dependencies.join(", "))).yellow().dim()
            );
        }

        println!();
    }
}

fn print_graph(graph: &Graph, format: GraphFormat) -> Result<()> {
    let targets = graph
        .topological_order()
        .unwrap_or_else(|| graph.targets().collect());

    match format {
        GraphFormat::Text => {
            println!("{}", style("Target dependency graph:").bold());
            println!();

            for target in &targets {
                if target.dependencies.is_empty() {
                    println!("  {}", style(&target.name).cyan().bold());
                } else {
                    println!(
                        "  {} {} {}",
                        style(&target.name).cyan().bold(),
                        style("←").dim(),
                        target.dependencies.join(", ")
                    );
                }
            }
        }

        GraphFormat::Dot => {
            println!("digraph minimake {{");
            println!("  rankdir=LR;");
            println!("  node [shape=box];");

            for target in &targets {
                println!("  \"{}\";", target.name);
            }
            for (target, dep) in graph.edges() {
                println!("  \"{}\" -> \"{}\";", dep, target);
            }

            println!("}}");
        }

        GraphFormat::Json => {
            let edges: Vec<_> = graph
                .edges()
                .into_iter()
                .map(|(target, dep)| serde_json::json!({ "from": dep, "to": target }))
                .collect();

            let output = serde_json::json!({
                "targets": targets,
                "edges": edges,
            });

            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
