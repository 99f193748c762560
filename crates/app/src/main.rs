//! Courier - Main Entry Point
//!
//! Parses the command line, installs logging, runs the script and prints
//! the summary. Exit status: 0 when every test passed, 1 when any failed,
//! 2 when the run could not happen at all.

mod cli;
mod report;

use std::process::ExitCode;

use clap::Parser;
use console::style;
use courier_infrastructure::{ScriptRunConfig, run_script_file_with};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, OutputFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::from(2)
        }
    }
}

/// `RUST_LOG` wins unless `-v` was given.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose > 0 {
        EnvFilter::new(cli.log_level())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing::info!(script = %cli.script.display(), "Courier v{}", env!("CARGO_PKG_VERSION"));

    let config = ScriptRunConfig {
        vars_file: cli.vars,
        overrides: cli.overrides.into_iter().collect(),
        base_dir: cli.base_dir,
    };
    let summary = run_script_file_with(&cli.script, config).await?;

    match cli.format {
        OutputFormat::Text => print!("{}", report::render_text(&summary)),
        OutputFormat::Json => println!("{}", report::render_json(&summary)?),
    }

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
