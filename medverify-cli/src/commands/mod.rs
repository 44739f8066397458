//! CLI Commands Module
//!
//! Command definitions for the MedVerify CLI.

pub mod admin;
pub mod serve;

use clap::{Parser, Subcommand};

/// MedVerify CLI
#[derive(Parser, Debug)]
#[command(name = "medverify")]
#[command(version)]
#[command(about = "Medicine batch verification service")]
#[command(long_about = "Serve, seed and query the medicine batch verification service.\n\n\
    `start` and `seed` work on a local store; every other command talks to a \
    running API.")]
pub struct Cli {
    /// API endpoint URL
    #[arg(short, long, env = "MEDVERIFY_API_URL", default_value = "http://localhost:8001")]
    pub api_url: String,

    /// Sled data directory; in-memory store when absent (env: MEDVERIFY_DATA_DIR)
    #[arg(long, env = "MEDVERIFY_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Output format (json, table, plain)
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table format (human-readable)
    #[default]
    Table,
    /// Plain text
    Plain,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Start(serve::StartArgs),

    /// Seed the batch registry with a synthetic catalogue
    Seed(serve::SeedArgs),

    /// Verify a batch code
    Verify {
        /// Batch code as printed on the packaging
        code: String,

        /// Scan latitude
        #[arg(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,

        /// Scan longitude
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
    },

    /// Log in as admin and print a session token
    Login(admin::LoginArgs),

    /// Show recent verification events
    Logs(admin::LogsArgs),

    /// Show dashboard statistics
    Stats(admin::StatsArgs),

    /// Check health of the API
    Health,
}

impl Commands {
    /// Whether the command runs the server in-process
    pub fn is_local(&self) -> bool {
        matches!(self, Commands::Start(_) | Commands::Seed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_help() {
        let result = Cli::try_parse_from(["medverify", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_parse_verify_with_location() {
        let cli = Cli::try_parse_from([
            "medverify",
            "verify",
            "MED597233X",
            "--lat",
            "-33.9",
            "--lng",
            "151.2",
        ])
        .unwrap();

        match cli.command {
            Commands::Verify { code, lat, lng } => {
                assert_eq!(code, "MED597233X");
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lng, Some(151.2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_half_location() {
        let result = Cli::try_parse_from(["medverify", "verify", "MED597233X", "--lat", "1.0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_json_format() {
        let cli = Cli::try_parse_from(["medverify", "--format", "json", "health"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.command.is_local());
    }
}
