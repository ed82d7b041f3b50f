use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfshelf_core::{
    create_authenticator, load_config, load_config_from_env, validate_config, Authenticator,
    CloudinaryHost, Config, GeminiImageGenerator, ImageGenerator, MediaHost, PdfCatalog,
    SanitizedConfig, SqlitePdfCatalog,
};
use pdfshelf_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    if std::env::var_os("PDFSHELF_LOG_JSON").is_some() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Config file if one exists, otherwise environment only.
fn load(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))
    } else {
        info!(
            "No configuration file at {:?}, reading environment only",
            config_path
        );
        load_config_from_env().context("Failed to load config from environment")
    }
}

async fn run() -> Result<()> {
    // A missing .env is normal in production
    let dotenv = dotenvy::dotenv();

    init_tracing();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to read .env file: {}", e);
        }
    }

    info!("Starting pdfshelf v{}", VERSION);

    let config_path = std::env::var("PDFSHELF_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    let config = load(&config_path)?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite catalogue
    let catalog: Arc<dyn PdfCatalog> = Arc::new(
        SqlitePdfCatalog::new(&config.database.path).context("Failed to open PDF catalogue")?,
    );
    info!("PDF catalogue initialized at {:?}", config.database.path);

    // External services
    let media_host: Arc<dyn MediaHost> = Arc::new(
        CloudinaryHost::new(config.media_host.clone()).context("Failed to create media host")?,
    );
    info!(
        "Media host: {} (cloud {})",
        media_host.name(),
        config.media_host.cloud_name
    );

    let image_generator: Arc<dyn ImageGenerator> = Arc::new(
        GeminiImageGenerator::new(config.image_generation.clone())
            .context("Failed to create image generator")?,
    );
    info!(
        "Image generator: {} ({})",
        image_generator.provider(),
        image_generator.model()
    );

    if !config.server.index_path().exists() {
        warn!(
            "Fallback document {:?} does not exist; unmatched routes will 404",
            config.server.index_path()
        );
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);

    let state = Arc::new(AppState::new(
        config,
        authenticator,
        catalog,
        media_host,
        image_generator,
    ));

    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shut down");
    Ok(())
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

    info!("Shutdown signal received");
}
