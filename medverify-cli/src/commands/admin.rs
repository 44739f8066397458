//! Admin Commands
//!
//! Arguments for the authenticated dashboard commands.

use clap::Args;

/// Credentials for protected endpoints
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Session token from `login` (env: MEDVERIFY_TOKEN)
    #[arg(long, env = "MEDVERIFY_TOKEN")]
    pub token: Option<String>,

    /// API key (env: MEDVERIFY_API_KEY)
    #[arg(long, env = "MEDVERIFY_API_KEY")]
    pub api_key: Option<String>,
}

/// Arguments for `login`
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Admin username
    #[arg(short, long, env = "MEDVERIFY_ADMIN_USERNAME", default_value = "admin")]
    pub username: String,

    /// Admin password
    #[arg(short, long, env = "MEDVERIFY_ADMIN_PASSWORD")]
    pub password: String,
}

/// Arguments for `logs`
#[derive(Args, Debug, Clone)]
pub struct LogsArgs {
    /// Maximum entries to return
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only events with this status (valid, expired, suspected, fake)
    #[arg(short, long)]
    pub status: Option<String>,

    #[command(flatten)]
    pub auth: AuthArgs,
}

/// Arguments for `stats`
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Days of daily counts
    #[arg(short, long)]
    pub days: Option<u32>,

    #[command(flatten)]
    pub auth: AuthArgs,
}
