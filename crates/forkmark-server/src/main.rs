mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use forkmark_db::PgStore;
use forkmark_geocode::{GeocodingClient, GoogleGeocoder};
use forkmark_search::{LocationIndex, SearchOrchestrator};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = forkmark_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = forkmark_db::PoolConfig::from_app_config(&config);
    let pool = forkmark_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = forkmark_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let provider = match config.geocoding_base_url.as_deref() {
        Some(base_url) => GoogleGeocoder::with_base_url(
            &config.geocoding_api_key,
            config.search.geocode_timeout,
            base_url,
        )?,
        None => GoogleGeocoder::new(&config.geocoding_api_key, config.search.geocode_timeout)?,
    };
    let search = Arc::new(SearchOrchestrator::new(
        PgStore::new(pool.clone()),
        GeocodingClient::new(provider, &config.search),
        Arc::new(LocationIndex::new()),
        config.search.clone(),
    ));

    // Tier 2 and 3 stay disabled until a snapshot exists; the scheduler retries.
    if let Err(e) = search.refresh_index().await {
        tracing::warn!(error = %e, "initial index build failed");
    }

    let _scheduler = scheduler::build_scheduler(pool.clone(), Arc::clone(&search), &config).await?;

    let app = build_app(
        AppState { pool, search },
        RateLimitState::per_minute(config.rate_limit_per_minute),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "forkmark server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
