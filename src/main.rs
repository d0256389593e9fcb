use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reunion_api::{
    config::Config,
    db::{self, Cache, CacheWriterHandle},
    routes::{create_router, AppState},
    services::catalog::load_catalog_file,
    store::{CachedStore, MemoryStore, PostgresStore, TravelStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reunion_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (store, cache_handle) = build_store(&config).await?;

    if let Some(path) = &config.catalog_path {
        let catalog = load_catalog_file(path)?;
        store.load_catalog(&catalog).await?;
    }

    let state = AppState::new(store, config.limits());
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

/// Picks the backing store from configuration, optionally behind the Redis cache
async fn build_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn TravelStore>, Option<CacheWriterHandle>)> {
    let base: Arc<dyn TravelStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::postgres::run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL store");
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data lives in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    match &config.redis_url {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            let (cache, handle) = Cache::new(client).await;
            tracing::info!("Catalog reads cached in Redis");
            let store = CachedStore::new(base, cache, config.cache_ttl_secs);
            Ok((Arc::new(store), Some(handle)))
        }
        None => Ok((base, None)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
