//! HTTP server initialization and runtime setup.
//!
//! Handles storage backend selection, database connections, cache setup, the
//! projection worker, and the Axum server lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::projection_worker::run_projection_worker;
use crate::domain::repositories::{ShardRepository, UniqueRepository};
use crate::infrastructure::cache::{NullCache, RedisCache, ShardHintCache};
use crate::infrastructure::persistence::{
    MemoryShardRepository, MemoryUniqueRepository, PgShardRepository, PgUniqueRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Connection attempts before startup gives up on the database.
const CONNECT_ATTEMPTS: usize = 5;

/// Opens the PostgreSQL pool, retrying with exponential backoff.
///
/// # Errors
///
/// Returns the last connection error once every attempt failed.
pub async fn connect_database(config: &Config, database_url: &str) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(100)
        .map(jitter)
        .take(CONNECT_ATTEMPTS);

    let pool = Retry::spawn(strategy, || async {
        options.clone().connect(database_url).await.inspect_err(|e| {
            tracing::warn!("Database connection attempt failed: {}", e);
        })
    })
    .await
    .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Connects the shard-count hint cache, falling back to [`NullCache`].
pub async fn connect_cache(config: &Config) -> Arc<dyn ShardHintCache> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Shard hints disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.shard_cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Shard hints enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Builds the shard and projection stores for the configured backend.
///
/// The PostgreSQL backend applies pending migrations before returning.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn open_stores(
    config: &Config,
) -> Result<(Arc<dyn ShardRepository>, Arc<dyn UniqueRepository>)> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(MemoryShardRepository::new()),
                Arc::new(MemoryUniqueRepository::new()),
            ))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;

            let pool = connect_database(config, database_url).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to apply migrations")?;

            let pool = Arc::new(pool);
            Ok((
                Arc::new(PgShardRepository::new(pool.clone())),
                Arc::new(PgUniqueRepository::new(pool)),
            ))
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Shard and projection stores (PostgreSQL with migrations, or in-memory)
/// - Redis shard hints (or NullCache fallback)
/// - Background projection worker, when an interval is configured
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (shards, uniques) = open_stores(&config).await?;
    let cache = connect_cache(&config).await;

    let state = AppState::new(shards, uniques, cache, config.store_limits());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = config.projection_interval().map(|period| {
        tracing::info!("Projection worker started (every {}s)", period.as_secs());
        tokio::spawn(run_projection_worker(
            state.projector_service.clone(),
            period,
            shutdown_rx,
        ))
    });

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    let _ = shutdown_tx.send(true);
    if let Some(worker) = worker {
        let _ = worker.await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
