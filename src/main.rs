use std::sync::Arc;

use anyhow::Context;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digital_library::{
    api::{create_router, AppState},
    config::Config,
    db::{self, Cache},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digital_library=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db_pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to open database")?;
    db::init_schema(&db_pool).await?;

    let (cache, cache_handle) = Cache::from_url(config.redis_url.as_deref())?;

    let state = Arc::new(AppState::from_config(&config, db_pool, cache));

    let app = create_router(state).nest_service("/static", ServeDir::new(&config.static_dir));

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Digital library listening on http://{}", config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cache_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, stopping");
}
