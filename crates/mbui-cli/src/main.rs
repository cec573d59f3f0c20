//! MBUI view checker.
//!
//! Usage:
//! - `mbui check <VIEW.xml> --bindings <FILE.json> [--config <FILE.json>] [--emit-graph]`
//! - `mbui parse <VIEW.xml>`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mbui_core::MbuiError;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "mbui")]
#[command(about = "Validate MBUI view descriptors against binding declarations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a view and report every diagnostic
    Check {
        /// Path to the MBUI XML view descriptor
        view: PathBuf,

        /// JSON array of binding declarations
        #[arg(long)]
        bindings: PathBuf,

        /// JSON resolver configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the resolved binding graph as JSON
        #[arg(long = "emit-graph")]
        emit_graph: bool,
    },

    /// Print the parsed descriptor tree
    Parse {
        /// Path to the MBUI XML view descriptor
        view: PathBuf,
    },
}

fn main() -> ExitCode {
    mbui_cli::init_logging();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Check {
            view,
            bindings,
            config,
            emit_graph,
        } => {
            let checked = mbui_cli::check(&view, &bindings, config.as_deref())?;
            let file = view.display().to_string();
            eprint!(
                "{}",
                mbui_cli::format_diagnostics(&file, &checked.tree, &checked.graph.diagnostics)
            );

            let graph = match checked.into_graph() {
                Ok(graph) => graph,
                Err(MbuiError::Validation(diagnostics)) => {
                    error!("{} diagnostics in {file}", diagnostics.len());
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err.into()),
            };

            info!("{file} is valid: {} tables, {} forms", graph.tables.len(), graph.forms.len());
            if emit_graph {
                let json = serde_json::to_string_pretty(&graph)
                    .context("Failed to serialize binding graph")?;
                println!("{json}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Parse { view } => {
            let tree = mbui_cli::load_view(&view)?;
            print!("{}", mbui_cli::outline(&tree));
            Ok(ExitCode::SUCCESS)
        }
    }
}
