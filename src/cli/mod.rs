//! Command-line interface

pub mod commands;
pub mod demo;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{DemoCommand, ThreadsCommand};
use std::ffi::OsString;

/// Parallel step pipeline
#[derive(Debug, Parser, Clone)]
#[command(name = "ppipeline")]
#[command(version = "0.1.0")]
#[command(about = "Parallel data processing through a sequence of steps", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to engine configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the even/odd number demo pipeline
    Demo(DemoCommand),

    /// Resolve a thread-count setting for this host
    Threads(ThreadsCommand),
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
