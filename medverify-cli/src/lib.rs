//! MedVerify CLI - Command Line Interface
//!
//! Runs the verification service locally and talks to a running instance.
//!
//! # Usage
//!
//! ```text
//! medverify [OPTIONS] <COMMAND>
//!
//! Commands:
//!   start    Start the API server
//!   seed     Seed the batch registry with a synthetic catalogue
//!   verify   Verify a batch code
//!   login    Log in as admin and print a session token
//!   logs     Show recent verification events
//!   stats    Show dashboard statistics
//!   health   Check health of the API
//!
//! Options:
//!   -a, --api-url <URL>     API endpoint URL [default: http://localhost:8001]
//!       --data-dir <DIR>    Sled data directory
//!   -f, --format <FORMAT>   Output format (json, table, plain) [default: table]
//!   -v, --verbose           Enable verbose output
//! ```
//!
//! # Examples
//!
//! ## Serve with a persistent store
//! ```text
//! medverify --data-dir ./data start --port 8001
//! ```
//!
//! ## Verify a batch from a location
//! ```text
//! medverify verify MED597233X --lat 40.71 --lng -74.0
//! ```
//!
//! ## Dashboard
//! ```text
//! export MEDVERIFY_TOKEN=$(medverify -f plain login -p admin123)
//! medverify logs --status suspected --limit 20
//! medverify stats --days 7
//! ```

pub mod client;
pub mod commands;
pub mod error;
pub mod handler;
pub mod output;

pub use client::MedVerifyClient;
pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
