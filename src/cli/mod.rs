//! CLI command implementations
//!
//! Business logic for the `statserve` binary, kept out of `main.rs` so it can
//! be tested without spawning a process.

// CLI glue code - relaxed lint requirements
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]

use std::io;

use crate::error::{Result, StatserveError};

pub mod handlers;
pub use handlers::{Cli, Commands};


/// Main CLI entrypoint - dispatches commands to handlers
pub async fn entrypoint(cli: Cli) -> Result<()> {
    handlers::init_tracing(&cli.log)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            cors_origins,
        } => {
            let config = crate::config::ServerConfig::new()
                .with_host(host)
                .with_port(port)
                .with_cors(cors_origins)
                .with_log_filter(cli.log);
            handlers::handle_serve(config).await
        },
        Commands::Tests => {
            println!("{}", handlers::handle_tests()?);
            Ok(())
        },
        Commands::Run { test, payload } => {
            let payload = handlers::read_payload(&payload, io::stdin().lock())?;
            match handlers::handle_run(&test, &payload) {
                Ok(output) => {
                    println!("{output}");
                    Ok(())
                },
                Err(StatserveError::Test(err)) => {
                    println!("{}", serde_json::to_string_pretty(&err)?);
                    Err(StatserveError::Test(err))
                },
                Err(err) => Err(err),
            }
        },
        Commands::Info => {
            print!("{}", handlers::handle_info());
            Ok(())
        },
    }
}
