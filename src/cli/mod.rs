//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CatalogCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Run sequential async workflows and drive the record store
#[derive(Debug, Parser, Clone)]
#[command(name = "stagecraft")]
#[command(version = "0.1.0")]
#[command(about = "Sequential async step pipelines and a request-lifecycle record store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a workflow
    Run(RunCommand),

    /// Validate a workflow file
    Validate(ValidateCommand),

    /// Fetch, add and update records through the store
    Catalog(CatalogCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
