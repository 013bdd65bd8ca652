//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::demo::DemoArgs;
use super::commands::diagnose::DiagnoseArgs;
use super::commands::init::InitArgs;
use super::commands::probe::ProbeArgs;
use super::commands::up::UpArgs;

#[derive(Parser, Debug)]
#[command(name = "runway")]
#[command(about = "Runway - bring the API service up and drive the demo against it", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Load the SQL seed data before starting (when no subcommand is given)
    #[arg(long)]
    pub load_data: bool,

    /// Configuration file, loaded over the built-in defaults
    #[arg(short, long, global = true, env = "RUNWAY_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

impl Cli {
    /// The command to run; no subcommand means the full demo
    pub fn resolved_command(self) -> Commands {
        match self.command {
            None => Commands::Demo(DemoArgs {
                load_data: self.load_data,
            }),
            Some(Commands::Demo(args)) => Commands::Demo(DemoArgs {
                load_data: args.load_data || self.load_data,
            }),
            Some(command) => command,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full demo: prerequisites, optional seed, startup, probes, client
    Demo(DemoArgs),

    /// Only make sure the service is running
    Up(UpArgs),

    /// Only run the endpoint probes against a running service
    Probe(ProbeArgs),

    /// Only check the installed prerequisites
    Doctor,

    /// Run the log diagnosis over existing log files
    Diagnose(DiagnoseArgs),

    /// Write a default configuration file
    Init(InitArgs),
}
