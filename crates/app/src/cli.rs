//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde_json::Value;

/// Run an HTTP request script and check the responses.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
pub struct Cli {
    /// Script file to run
    pub script: PathBuf,

    /// Seed variables file (a JSON object). Defaults to `variables.json`
    /// next to the script
    #[arg(long, env = "COURIER_VARS", value_name = "FILE")]
    pub vars: Option<PathBuf>,

    /// Set a variable, overriding the seed file. Repeatable
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub overrides: Vec<(String, Value)>,

    /// Directory multipart file paths are resolved against. Defaults to the
    /// script's directory
    #[arg(long, env = "COURIER_BASE_DIR", value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How the summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when stdout is a terminal
    Text,
    /// The summary as JSON
    Json,
}

impl Cli {
    /// Log filter for the requested verbosity.
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn parse_key_value(arg: &str) -> Result<(String, Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, found '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{arg}'"));
    }
    Ok((key.to_string(), Value::String(value.to_string())))
}
