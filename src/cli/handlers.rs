//! Command-line arguments and per-command handlers

use std::io::Read;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{create_router, AppState},
    config::{CorsConfig, ServerConfig, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT},
    dispatch::{self, TestKind},
    error::{ConfigError, Result},
};

/// statserve - canned statistical tests over HTTP
#[derive(Debug, Parser)]
#[command(name = "statserve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter (`RUST_LOG` syntax), written to stderr
    #[arg(long, global = true, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log: String,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, env = "STATSERVE_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind to
        #[arg(short, long, env = "STATSERVE_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Allowed CORS origins: `*` or a comma-separated list
        #[arg(long, env = "STATSERVE_CORS_ORIGINS", default_value = "*")]
        cors_origins: CorsConfig,
    },
    /// Print the supported test identifiers as JSON
    Tests,
    /// Run one test locally and print the result envelope
    ///
    /// Examples:
    ///   statserve run ttest '{"group1": [1, 2, 3], "group2": [4, 5, 6]}'
    ///   echo '{"x": [1, 2, 3], "y": [2, 4, 7]}' | statserve run regression -
    Run {
        /// Test identifier (see `statserve tests`)
        #[arg(value_name = "TEST")]
        test: String,

        /// JSON payload, or `-` to read it from stdin
        #[arg(value_name = "JSON")]
        payload: String,
    },
    /// Show version info
    Info,
}

/// Install the global `tracing` subscriber
///
/// Only the first call installs; later calls still validate the filter.
/// Returns whether this call installed the subscriber.
pub fn init_tracing(filter: &str) -> Result<bool> {
    let env_filter = EnvFilter::try_new(filter).map_err(|e| ConfigError::InvalidLogFilter {
        filter: filter.to_string(),
        reason: e.to_string(),
    })?;

    match tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(()) => Ok(true),
        Err(err) => {
            debug!(error = %err, "tracing subscriber already installed, keeping it");
            Ok(false)
        },
    }
}

/// Start the server and block until Ctrl-C
pub async fn handle_serve(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let cors = config.cors.to_string();
    let app = create_router(AppState::new(config)?);

    println!("Starting statserve v{}...", crate::VERSION);
    println!("Server listening on http://{addr}");
    println!("CORS origins: {cors}");
    println!();
    println!("Endpoints:");
    for kind in TestKind::ALL {
        println!("  POST /api/{kind}");
    }
    println!("  GET  /api/tests");
    println!("  GET  /health");
    println!("  GET  /metrics");
    println!();
    println!("Example:");
    println!(
        "  curl -X POST http://{addr}/api/ttest -H 'content-type: application/json' \\\n    \
         -d '{{\"group1\": [12, 15, 9], \"group2\": [10, 11, 8]}}'"
    );
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; shutdown only by termination");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Supported tests as a JSON array
pub fn handle_tests() -> Result<String> {
    Ok(serde_json::to_string(&dispatch::list_tests())?)
}

/// Read the payload argument, or all of `reader` when it is `-`
pub fn read_payload(arg: &str, mut reader: impl Read) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(arg.to_string())
    }
}

/// Run one test and render the envelope as pretty JSON
pub fn handle_run(test: &str, payload: &str) -> Result<String> {
    let kind: TestKind = test.parse()?;
    let payload: Value = serde_json::from_str(payload)?;
    let result = dispatch::run(kind, payload)?;
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Version and capability summary
#[must_use]
pub fn handle_info() -> String {
    let tests = dispatch::list_tests().join(", ");
    format!(
        "statserve v{}\n\
         Canned statistical tests as JSON endpoints\n\
         \n\
         Tests: {tests}\n\
         Significance level: p < {}\n\
         Reported precision: {} decimal places\n",
        crate::VERSION,
        crate::stats::ALPHA,
        dispatch::DECIMALS,
    )
}
