//! Command-line interface definitions and parsing

use clap::Parser;

/// Terminal chat client over a sync substrate
///
/// All chat policy (window size, retry budget, freshness, name prefixes) is
/// fixed; the flags only affect diagnostics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
