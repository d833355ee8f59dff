use anyhow::Context;
use sharespace_server::{AppConfig, AppState, build_router, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharespace_server=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("data directory: {}", config.data_dir.display());

    let db = storage::init_db(&config.data_dir)?;
    tracing::info!("database initialized");

    if !config.auth_enabled() {
        tracing::warn!("JWT_SECRET not set, authenticated routes will return 500");
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing any origin");
    } else {
        tracing::info!("CORS: allowing {}", config.cors_origins.join(", "));
    }

    let port = config.port;
    let app = build_router(AppState { db, config });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
