//! Tokensmith server entry point.

use std::sync::Arc;

use anyhow::Context;
use tokensmith_auth_postgres::PostgresAuthStorage;
use tokensmith_server::config::loader::{DEFAULT_CONFIG_PATH, load_config};
use tokensmith_server::{AppConfig, observability, pool, router};
use tracing::info;

/// Where the configuration path came from, for the startup log line.
enum ConfigSource {
    CliArgument,
    EnvironmentVariable,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "--config argument"),
            ConfigSource::EnvironmentVariable => {
                write!(f, "TOKENSMITH_CONFIG environment variable")
            }
            ConfigSource::Default => write!(f, "default path"),
        }
    }
}

/// Resolves the configuration file path: `--config <path>` wins, then
/// `TOKENSMITH_CONFIG`, then the default path.
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }
    if let Ok(path) = std::env::var("TOKENSMITH_CONFIG") {
        return (path, ConfigSource::EnvironmentVariable);
    }
    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("Warning: failed to read .env file: {err}");
    }

    observability::init_tracing("info");

    let (config_path, config_source) = resolve_config_path();
    let config = match load_config(Some(&config_path)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(2);
        }
    };
    info!(path = %config_path, source = %config_source, "Configuration loaded");
    observability::apply_logging_level(&config.logging.level);

    if let Err(err) = run(config).await {
        eprintln!("Server error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    // validate() already requires the section, the let-else keeps the
    // Option honest without unwrapping.
    let Some(postgres) = config.storage.postgres.as_ref() else {
        anyhow::bail!("storage.postgres configuration is required");
    };

    let pool = pool::create_pool(postgres)
        .await
        .context("connecting to PostgreSQL")?;
    let storage = PostgresAuthStorage::new(Arc::new(pool));
    storage
        .run_migrations()
        .await
        .context("running migrations")?;

    let app = router::build_app(&storage, config.auth.clone());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Tokensmith server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, stopping server");
    }
}
