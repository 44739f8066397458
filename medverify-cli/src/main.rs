//! MedVerify CLI Entry Point
//!
//! Configuration is loaded from environment variables (via .env file).
//! Command-line arguments override environment variables.
//!
//! Usage:
//!   medverify start     - Start the API server (seeds the registry)
//!   medverify seed      - Seed a persistent registry
//!   medverify verify    - Verify a batch code
//!   medverify health    - Check health of the API

use clap::Parser;
use medverify_cli::{handler, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The server always logs; client commands only when verbose
    if cli.verbose || cli.command.is_local() {
        init_logging();
    }

    if let Err(e) = handler::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "medverify_cli=info,medverify_api=info,medverify_engine=info,medverify_store=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
