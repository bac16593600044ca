//! roomap server binary
//!
//! Serves hotel room mappings out of Redis over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! roomap --config config.yaml
//!
//! # With environment variables only
//! ROOMAP_STORE__ADDRS=redis-1:6379 roomap
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use roomap_api::health::{check_store_health, HealthMonitor};
use roomap_api::http::{create_router, create_router_with_observability, AppState};
use roomap_api::observability::{init_logging, init_metrics, LoggingConfig, MetricsState};
use roomap_server::ServerConfig;
use roomap_storage::{MemoryRoomStore, RedisConfig, RedisRoomStore, RoomStore};

/// roomap - hotel room mapping lookup service
#[derive(Parser, Debug)]
#[command(name = "roomap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    init_logging(LoggingConfig::from_settings(&config.logging));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.server.environment,
        "Starting roomap server"
    );

    let metrics_state = if config.metrics.enabled {
        let state = init_metrics()?;
        info!("Metrics enabled at /metrics");
        Some(state)
    } else {
        None
    };

    match config.store.backend.as_str() {
        "memory" => {
            warn!("Using in-memory store backend: smoke-test mode, every lookup misses");
            run_server(MemoryRoomStore::new_shared(), &config, metrics_state).await
        }
        "redis" => {
            let redis_config = redis_config(&config);
            info!(
                addrs = ?redis_config.addrs,
                cluster = redis_config.cluster,
                "Connecting to Redis"
            );
            let store = RedisRoomStore::from_config(&redis_config)
                .await
                .context("failed to connect to Redis")?;
            run_server(Arc::new(store), &config, metrics_state).await
        }
        other => {
            error!("Unknown store backend: {}", other);
            anyhow::bail!("Unknown store backend: {}", other);
        }
    }
}

fn redis_config(config: &ServerConfig) -> RedisConfig {
    RedisConfig {
        addrs: config.store.addrs.clone(),
        password: config.store.password.clone(),
        cluster: config.store.cluster,
        connect_timeout: Duration::from_secs(config.store.connect_timeout_secs),
        response_timeout: Duration::from_secs(config.store.response_timeout_secs),
    }
}

/// Verifies the store, then serves HTTP until a shutdown signal arrives or
/// the background health monitor reports a failure.
///
/// A monitor failure is returned as an error so the process exits non-zero.
async fn run_server<S: RoomStore>(
    store: Arc<S>,
    config: &ServerConfig,
    metrics_state: Option<MetricsState>,
) -> anyhow::Result<()> {
    let health_timeout = Duration::from_secs(config.health.timeout_secs);
    let status = check_store_health(store.as_ref(), health_timeout)
        .await
        .context("store is not accessible")?;
    info!(
        backend = store.backend_name(),
        latency_ms = status.latency.as_millis() as u64,
        "Store health check passed"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState::with_config(
        Arc::clone(&store),
        config.resolver.to_resolver_config(),
        health_timeout,
    );
    let router = match metrics_state {
        Some(metrics_state) => create_router_with_observability(state, metrics_state),
        None => create_router(state),
    };

    let monitor = config.health.enabled.then(|| {
        HealthMonitor::new(
            Arc::clone(&store),
            Duration::from_secs(config.health.interval_secs),
            health_timeout,
        )
    });
    let monitor_failure = async move {
        match monitor {
            Some(monitor) => monitor.run().await,
            None => std::future::pending().await,
        }
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server received shutdown signal");
            })
            .await
    });

    let failure = tokio::select! {
        joined = &mut server => {
            joined??;
            info!("HTTP server stopped");
            return Ok(());
        }
        _ = shutdown_signal() => None,
        err = monitor_failure => {
            error!(error = %err, "Store became unhealthy, shutting down");
            Some(err)
        }
    };

    let _ = shutdown_tx.send(());

    let drain = Duration::from_secs(config.server.shutdown_timeout_secs);
    match tokio::time::timeout(drain, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            timeout_secs = drain.as_secs(),
            "Graceful shutdown timed out, dropping open connections"
        ),
    }
    info!("HTTP server shutdown complete");

    if let Some(err) = failure {
        anyhow::bail!("store health check failed: {err}");
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_parsing() {
        let args = Args::try_parse_from(["roomap"]).unwrap();
        assert!(args.config.is_none());

        let args = Args::try_parse_from(["roomap", "--config", "config.yaml"]).unwrap();
        assert_eq!(args.config, Some("config.yaml".to_string()));

        let args = Args::try_parse_from(["roomap", "-c", "test.yaml"]).unwrap();
        assert_eq!(args.config, Some("test.yaml".to_string()));
    }

    #[test]
    fn test_redis_config_from_store_settings() {
        let mut config = ServerConfig::default();
        config.store.addrs = vec!["a:6379".to_string(), "b:6379".to_string()];
        config.store.cluster = true;
        config.store.password = Some("secret".to_string());

        let redis = redis_config(&config);

        assert_eq!(redis.addrs, config.store.addrs);
        assert!(redis.cluster);
        assert_eq!(redis.password.as_deref(), Some("secret"));
        assert_eq!(redis.connect_timeout, Duration::from_secs(5));
        assert_eq!(redis.response_timeout, Duration::from_secs(3));
    }
}
