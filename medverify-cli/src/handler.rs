//! Command Handlers
//!
//! Handler functions for CLI commands.

use crate::client::MedVerifyClient;
use crate::commands::{
    admin::{LoginArgs, LogsArgs, StatsArgs},
    serve::{SeedArgs, StartArgs},
    Cli, Commands, OutputFormat,
};
use crate::error::{CliError, CliResult};
use crate::output;
use chrono::Utc;
use medverify_api::{
    init_metrics, ApiConfig, AppState, AuthConfig, LoginRequest, MetricsConfig, VerifyRequest,
};
use medverify_core::{AnomalyScorer, ModelScorer, UnavailableScorer};
use medverify_engine::{EngineConfig, VerificationEngine};
use medverify_store::{
    seed_registry, BatchRegistry, MemoryEventLog, MemoryRegistry, SeedConfig, SledStore,
    VerificationLog,
};
use std::sync::Arc;

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let format = cli.format;
    match cli.command {
        Commands::Start(args) => handle_start(cli.data_dir.as_deref(), args).await,
        Commands::Seed(args) => handle_seed(cli.data_dir.as_deref(), args, format).await,
        command => {
            let client = MedVerifyClient::new(&cli.api_url)?;
            match command {
                Commands::Health => handle_health(&client, format).await,
                Commands::Verify { code, lat, lng } => {
                    handle_verify(&client, code, lat, lng, format).await
                }
                Commands::Login(args) => handle_login(&client, args, format).await,
                Commands::Logs(args) => handle_logs(&client, args, format).await,
                Commands::Stats(args) => handle_stats(&client, args, format).await,
                Commands::Start(_) | Commands::Seed(_) => unreachable!(),
            }
        }
    }
}

/// Registry and log backing the engine
struct Storage {
    registry: Arc<dyn BatchRegistry>,
    log: Arc<dyn VerificationLog>,
    sled: Option<SledStore>,
}

impl Storage {
    /// Stores keep at least `location_history` recent scan locations per batch
    fn open(data_dir: Option<&str>, location_history: usize) -> CliResult<Self> {
        match data_dir {
            Some(dir) => {
                let store = SledStore::open(dir)?.with_location_history(location_history);
                tracing::info!(data_dir = %dir, location_history, "Opened sled store");
                Ok(Self {
                    registry: Arc::new(store.clone()),
                    log: Arc::new(store.clone()),
                    sled: Some(store),
                })
            }
            None => {
                tracing::info!("Using in-memory store");
                Ok(Self {
                    registry: Arc::new(
                        MemoryRegistry::new().with_location_history(location_history),
                    ),
                    log: Arc::new(MemoryEventLog::new()),
                    sled: None,
                })
            }
        }
    }
}

/// Load the model, or serve without one
fn load_scorer(args: &StartArgs) -> Arc<dyn AnomalyScorer> {
    match ModelScorer::load(&args.model_path, &args.scaler_path) {
        Ok(scorer) => Arc::new(scorer),
        Err(e) => {
            tracing::warn!(
                model_path = %args.model_path,
                scaler_path = %args.scaler_path,
                error = %e,
                "Anomaly model unavailable; registered batches cannot be scored"
            );
            output::print_warning(&format!("Anomaly model not loaded: {}", e));
            Arc::new(UnavailableScorer::new(e.to_string()))
        }
    }
}

/// Handle starting the API server
async fn handle_start(data_dir: Option<&str>, args: StartArgs) -> CliResult<()> {
    println!("Starting MedVerify API server...");
    println!("  Host: {}:{}", args.host, args.port);
    println!("  Store: {}", data_dir.unwrap_or("in-memory"));

    let engine_config = EngineConfig::from_env();
    let storage = Storage::open(data_dir, engine_config.features.recent_location_window)?;

    if !args.no_seed {
        let report =
            seed_registry(storage.registry.as_ref(), SeedConfig::default(), Utc::now().date_naive())
                .await?;
        println!(
            "  Registry: {} batches inserted, {} already present",
            report.inserted, report.skipped
        );
    }

    let scorer = load_scorer(&args);

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        tracing::warn!(error = %e, "Metrics exporter not started");
    }

    let api_config = ApiConfig {
        listen_addr: format!("{}:{}", args.host, args.port),
        ..ApiConfig::from_env()
    };

    let engine = VerificationEngine::new(
        storage.registry,
        storage.log,
        scorer,
        engine_config,
    );
    let state = AppState::with_config(api_config, engine).with_auth(AuthConfig::from_env());

    medverify_api::start_server(state)
        .await
        .map_err(|e| CliError::server(format!("Server error: {}", e)))?;

    if let Some(store) = storage.sled {
        store.flush().await?;
    }

    Ok(())
}

/// Handle seeding a persistent registry
async fn handle_seed(data_dir: Option<&str>, args: SeedArgs, format: OutputFormat) -> CliResult<()> {
    let dir = data_dir.ok_or_else(|| {
        CliError::config("seeding needs a persistent store; pass --data-dir or MEDVERIFY_DATA_DIR")
    })?;
    let store = SledStore::open(dir)?;

    let config = SeedConfig {
        count: args.count,
        rng_seed: args.seed,
        include_demo: !args.no_demo,
    };
    let report = seed_registry(&store, config, Utc::now().date_naive()).await?;
    store.flush().await?;

    output::print_seed_report(&report, format);
    Ok(())
}

/// Handle health check
async fn handle_health(client: &MedVerifyClient, format: OutputFormat) -> CliResult<()> {
    let health = client.health().await?;
    output::print_health(&health, format);
    Ok(())
}

/// Handle batch verification
async fn handle_verify(
    client: &MedVerifyClient,
    code: String,
    lat: Option<f64>,
    lng: Option<f64>,
    format: OutputFormat,
) -> CliResult<()> {
    if code.trim().is_empty() {
        return Err(CliError::invalid_arg("batch code must not be blank"));
    }

    let result = client
        .verify(VerifyRequest {
            code: Some(code),
            lat,
            lng,
        })
        .await?;
    output::print_verify_result(&result, format);
    Ok(())
}

/// Handle admin login
async fn handle_login(client: &MedVerifyClient, args: LoginArgs, format: OutputFormat) -> CliResult<()> {
    let result = client
        .login(LoginRequest {
            username: args.username,
            password: args.password,
        })
        .await?;

    if !result.success {
        return Err(CliError::login_failed(result.message));
    }

    output::print_login(&result, format);
    Ok(())
}

/// Handle log listing
async fn handle_logs(client: &MedVerifyClient, args: LogsArgs, format: OutputFormat) -> CliResult<()> {
    if args.limit == Some(0) {
        return Err(CliError::invalid_arg("--limit must be at least 1"));
    }

    let logs = client
        .logs(args.limit, args.status.as_deref(), &args.auth)
        .await?;
    output::print_logs(&logs, format);
    Ok(())
}

/// Handle stats
async fn handle_stats(client: &MedVerifyClient, args: StatsArgs, format: OutputFormat) -> CliResult<()> {
    if args.days == Some(0) {
        return Err(CliError::invalid_arg("--days must be at least 1"));
    }

    let stats = client.stats(args.days, &args.auth).await?;
    output::print_stats(&stats, format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::serve::defaults;
    use medverify_core::{BatchCode, BatchRecord, GeoPoint};
    use medverify_store::DEMO_VALID_CODE;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = Storage::open(None, 50).unwrap();
        assert!(storage.sled.is_none());
        assert_eq!(storage.registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_keeps_the_feature_location_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").to_string_lossy().to_string();
        let code = BatchCode::parse(DEMO_VALID_CODE).unwrap();

        for data_dir in [None, Some(path.as_str())] {
            let storage = Storage::open(data_dir, 80).unwrap();
            let record = BatchRecord::new(
                code.clone(),
                "Paracetamol 500mg",
                "PharmaCorp",
                0.95,
                Utc::now().date_naive(),
            );
            assert!(storage.registry.insert(record).await.unwrap());

            let mut latest = None;
            for i in 0..60u32 {
                let location = GeoPoint::new(f64::from(i) - 30.0, 10.0).unwrap();
                latest = storage.registry.record_scan(&code, Some(location)).await.unwrap();
            }
            assert_eq!(latest.unwrap().scan_locations.len(), 60);
        }
    }

    #[tokio::test]
    async fn test_seed_requires_data_dir() {
        let args = SeedArgs {
            count: 5,
            seed: 1,
            no_demo: false,
        };
        let err = handle_seed(None, args, OutputFormat::Json).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_seed_into_sled_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").to_string_lossy().to_string();
        let args = SeedArgs {
            count: 10,
            seed: 42,
            no_demo: false,
        };

        handle_seed(Some(&path), args.clone(), OutputFormat::Json)
            .await
            .unwrap();
        handle_seed(Some(&path), args, OutputFormat::Json).await.unwrap();

        let store = SledStore::open(&path).unwrap();
        assert_eq!(BatchRegistry::count(&store).await.unwrap(), 13);
        let code = BatchCode::parse(DEMO_VALID_CODE).unwrap();
        assert!(store.lookup(&code).await.unwrap().is_some());
    }

    #[test]
    fn test_missing_model_falls_back() {
        let args = StartArgs {
            host: "127.0.0.1".to_string(),
            port: 0,
            model_path: "/nonexistent/model.json".to_string(),
            scaler_path: "/nonexistent/scaler.json".to_string(),
            no_seed: true,
        };
        let scorer = load_scorer(&args);
        assert!(!scorer.is_ready());
    }

    #[test]
    fn test_shipped_model_loads() {
        let models = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join(defaults::MODEL_PATH);
        let scalers = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join(defaults::SCALER_PATH);
        let args = StartArgs {
            host: "127.0.0.1".to_string(),
            port: 0,
            model_path: models.to_string_lossy().to_string(),
            scaler_path: scalers.to_string_lossy().to_string(),
            no_seed: true,
        };
        let scorer = load_scorer(&args);
        assert!(scorer.is_ready());
        assert_eq!(scorer.model_version(), "reference-2026.03");
    }

    #[tokio::test]
    async fn test_verify_rejects_blank_code() {
        let client = MedVerifyClient::new("http://127.0.0.1:1").unwrap();
        let err = handle_verify(&client, "  ".to_string(), None, None, OutputFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
