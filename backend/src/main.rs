//! Platebook Backend
//!
//! A recipe sharing platform: publish recipes, follow authors, keep
//! favorites and a shopping cart, and download the cart's combined
//! ingredients as a PDF shopping list.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic and validation
//! - Repositories: Data access
//! - Database: PostgreSQL with SQLx

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use platebook_backend::{config, db, routes, state::AppState};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Platebook Backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Migrations run in-process during development; production deploys
    // them as a separate job before rollout.
    if !config::AppConfig::is_production() {
        info!("Running database migrations...");
        db::run_migrations(&db_pool).await?;
    }

    install_metrics_exporter(&config.metrics);

    let addr = config.server.bind_addr();
    let state = AppState::new(db_pool, config);
    let app = routes::create_router(state);

    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Start the Prometheus scrape endpoint with graceful fallback
///
/// Counters keep recording either way; without the exporter they are
/// simply never scraped.
fn install_metrics_exporter(config: &config::MetricsConfig) {
    if !config.enabled {
        info!("Metrics exporter disabled by configuration");
        return;
    }

    let addr: SocketAddr = match config.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics listen address '{}': {}. Metrics will not be exported.",
                config.listen_addr, e
            );
            return;
        }
    };

    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => warn!(
            "Failed to start Prometheus exporter: {}. Metrics will not be exported.",
            e
        ),
    }
}

/// Initialize tracing: JSON output in production, pretty locally
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "platebook_backend=info,tower_http=info".into()
        } else {
            "platebook_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Refuse to start production with a weak or development JWT secret
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    if config.jwt.secret.contains("development") || config.jwt.secret.len() < 32 {
        error!("JWT secret must be at least 32 characters and not contain 'development'");
        anyhow::bail!("Invalid production configuration");
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
