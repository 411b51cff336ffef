//! Site migration redirector (v1)
//!
//! Answers every request on the old origin with `410 Gone` or a redirect to
//! the new origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                    REDIRECTOR                      │
//!                     │                                                    │
//!   Client Request    │  ┌─────────┐   ┌───────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│  request  │──▶│   routing    │   │
//!                     │  │ server  │   │    URL    │   │   resolver   │   │
//!                     │  └─────────┘   └───────────┘   └──────┬───────┘   │
//!                     │                                       │           │
//!   Client Response   │  ┌──────────────────────┐             │           │
//!   ◀─────────────────┼──│ response (410 / 3xx) │◀────────────┘           │
//!                     │  └──────────────────────┘                         │
//!                     │                                                    │
//!                     │  config · observability · lifecycle                │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use redirector::config::load_config;
use redirector::lifecycle::{signals, Shutdown};
use redirector::observability::{logging, metrics};
use redirector::HttpServer;

#[derive(Parser)]
#[command(name = "redirector")]
#[command(about = "Redirects an old site's URLs to a new origin", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "redirects.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Fail before logging is up if the config is unusable
    let config = load_config(&cli.config)?;

    logging::init(&config.observability.log_level);

    tracing::info!("redirector v{} starting", env!("CARGO_PKG_VERSION"));

    let server = HttpServer::new(config)?;
    let config = server.config();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        new_origin = %config.redirect.new_origin,
        permanent_code = config.redirect.permanent_code,
        lowercase = config.redirect.lowercase,
        trailing_slash = ?config.redirect.trailing_slash,
        exact_rules = config.redirect.exact.len(),
        gone_rules = config.redirect.gone.len(),
        pattern_rules = config.redirect.patterns.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
