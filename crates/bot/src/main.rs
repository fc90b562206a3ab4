mod api;
mod metrics;
mod telegram;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nasbot_core::{
    load_config, load_config_from_env, validate_config, Config, DestinationPolicy, DsmClient,
    LogFormat, MagnetWorkflow, SanitizedConfig, TorrentMetaClient,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file used when `NASBOT_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logging depends on the config, so load it first and report errors after init.
    let loaded = load_configuration();
    let format = loaded
        .as_ref()
        .map(|(config, _)| config.logging.format)
        .unwrap_or_default();
    init_tracing(format);

    let (config, source) = loaded?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("nasbot {} starting", VERSION);
    info!("Configuration loaded from {}", source);
    if let Ok(json) = serde_json::to_string(&SanitizedConfig::from(&config)) {
        debug!("Effective configuration: {}", json);
    }

    // DSM client and startup probe
    let dsm = Arc::new(DsmClient::new(config.dsm.clone()).context("Failed to create DSM client")?);
    info!("DSM WebAPI at {}", config.dsm.base_url());
    if config.dsm.probe_on_start {
        match dsm.api_info().await {
            Ok(apis) => {
                for (name, info) in &apis {
                    info!(
                        "DSM API {} at {} (versions {}-{})",
                        name, info.path, info.min_version, info.max_version
                    );
                }
            }
            Err(e) => warn!("DSM API info probe failed: {}", e),
        }
    }

    let resolver = Arc::new(
        TorrentMetaClient::new(&config.metadata).context("Failed to create metadata client")?,
    );
    info!("Metadata lookup via {}", config.metadata.url);

    let workflow = Arc::new(MagnetWorkflow::new(
        resolver,
        dsm,
        DestinationPolicy::new(config.destination.clone()),
    ));

    // Metrics endpoint
    let metrics_server = if config.metrics.enabled {
        let addr = SocketAddr::new(config.metrics.host, config.metrics.port);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind metrics endpoint to {}", addr))?;
        info!("Serving /health and /metrics on {}", addr);

        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api::create_router()).await {
                error!("Metrics server error: {}", e);
            }
        }))
    } else {
        info!("Metrics endpoint disabled in config");
        None
    };

    // Telegram dispatcher
    let bot = Bot::new(&config.telegram.bot_token);
    let telegram = Arc::new(config.telegram.clone());
    if telegram.allowed_chat_ids.is_empty() {
        warn!("No chat allow-list configured, accepting messages from every chat");
    }

    let handler =
        Update::filter_message().endpoint(telegram::handle_message::<DsmClient>);
    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![workflow, telegram])
        .default_handler(|update| async move {
            debug!("Unhandled update: {:?}", update.id);
        })
        .build();

    let shutdown_token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        match shutdown_token.shutdown() {
            Ok(stopped) => stopped.await,
            Err(e) => warn!("Dispatcher was not running: {}", e),
        }
    });

    info!("Listening for Telegram messages");
    dispatcher.dispatch().await;

    if let Some(handle) = metrics_server {
        handle.abort();
    }
    info!("nasbot stopped");

    Ok(())
}

/// Load the config file named by `NASBOT_CONFIG`, falling back to
/// `config.toml` and then to environment variables alone.
fn load_configuration() -> Result<(Config, String)> {
    if let Ok(path) = std::env::var("NASBOT_CONFIG") {
        let path = PathBuf::from(path);
        let config = load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?;
        return Ok((config, path.display().to_string()));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = load_config(&default_path)
            .with_context(|| format!("Failed to load config from {:?}", default_path))?;
        return Ok((config, default_path.display().to_string()));
    }

    let config = load_config_from_env().context("Failed to load config from environment")?;
    Ok((config, "environment".to_string()))
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
