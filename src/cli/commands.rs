//! CLI command definitions

use clap::Args;

/// Run a workflow
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to workflow YAML file
    #[arg(short, long)]
    pub file: String,

    /// Initial input as JSON (overrides the file's `input`)
    #[arg(long)]
    pub input: Option<String>,

    /// Variable overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub variable: Vec<(String, String)>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a workflow file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to workflow YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Drive the record store against a simulated source
#[derive(Debug, Args, Clone)]
pub struct CatalogCommand {
    /// Seed records (YAML or JSON list)
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Simulated latency per call, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,

    /// Probability that a call fails
    #[arg(long, default_value_t = 0.0)]
    pub failure_rate: f64,

    /// Record to add, as JSON fields
    #[arg(long)]
    pub add: Vec<String>,

    /// Update to apply (id=<json patch>)
    #[arg(long, value_parser = parse_key_value)]
    pub update: Vec<(String, String)>,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Split a `key=value` argument at the first `=`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Expected key=value, got: {}", s)),
    }
}
