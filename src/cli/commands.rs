//! CLI command definitions

use crate::execution::ThreadCount;
use clap::Args;

/// Run the even/odd number demo pipeline
#[derive(Debug, Args, Clone)]
pub struct DemoCommand {
    /// Seed value; numbers 0..seed are generated
    #[arg(long, default_value_t = 5)]
    pub seed: i64,

    /// Worker count: an integer, `auto`, or `x<N>` for N per CPU
    #[arg(short, long, value_parser = parse_thread_count)]
    pub threads: Option<ThreadCount>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Resolve a thread-count setting and print it
#[derive(Debug, Args, Clone)]
pub struct ThreadsCommand {
    /// Setting to resolve: an integer, `auto`, or `x<N>`
    pub value: String,
}

/// Parse a thread-count argument
pub fn parse_thread_count(s: &str) -> Result<ThreadCount, String> {
    ThreadCount::parse_setting(s).map_err(|e| e.to_string())
}
