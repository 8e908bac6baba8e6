//! statserve CLI - canned statistical tests over HTTP
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `tests` - List supported tests
//! - `run` - Run one test locally
//! - `info` - Show version info

use clap::Parser;
use statserve::cli::{entrypoint, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = entrypoint(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
