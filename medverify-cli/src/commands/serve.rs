//! Server Commands
//!
//! Arguments for running the service and seeding its registry.

use clap::Args;
use medverify_store::{DEFAULT_RNG_SEED, DEFAULT_SEED_COUNT};

/// Arguments for `start`
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Host to bind to (env: MEDVERIFY_API_HOST)
    #[arg(short = 'H', long, env = "MEDVERIFY_API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (env: MEDVERIFY_API_PORT)
    #[arg(short, long, env = "MEDVERIFY_API_PORT", default_value = "8001")]
    pub port: u16,

    /// Isolation forest artifact (env: MEDVERIFY_MODEL_PATH)
    #[arg(long, env = "MEDVERIFY_MODEL_PATH", default_value = defaults::MODEL_PATH)]
    pub model_path: String,

    /// Feature scaler artifact (env: MEDVERIFY_SCALER_PATH)
    #[arg(long, env = "MEDVERIFY_SCALER_PATH", default_value = defaults::SCALER_PATH)]
    pub scaler_path: String,

    /// Skip seeding the registry on startup
    #[arg(long)]
    pub no_seed: bool,
}

/// Arguments for `seed`
#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Number of random batches to generate
    #[arg(short, long, default_value_t = DEFAULT_SEED_COUNT)]
    pub count: usize,

    /// RNG seed
    #[arg(short, long, default_value_t = DEFAULT_RNG_SEED)]
    pub seed: u64,

    /// Leave out the fixed demo batches
    #[arg(long)]
    pub no_demo: bool,
}

/// Default artifact locations
pub mod defaults {
    /// Isolation forest artifact
    pub const MODEL_PATH: &str = "models/isolation_forest.json";
    /// Scaler artifact
    pub const SCALER_PATH: &str = "models/scaler.json";
}
