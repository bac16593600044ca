//! Store health probing and the background health monitor.
//!
//! The process refuses to start against an unreachable store, and once
//! running it keeps probing; the first failed probe ends the monitor, which
//! the binary treats as a reason to shut down.

use std::sync::Arc;
use std::time::Duration;

use roomap_storage::{HealthStatus, RoomStore, StorageError, StorageResult};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error};

/// Runs one health check under `deadline`.
pub async fn check_store_health<S: RoomStore>(
    store: &S,
    deadline: Duration,
) -> StorageResult<HealthStatus> {
    let status = match timeout(deadline, store.health_check()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(StorageError::HealthCheckFailed {
                message: format!("health check timed out after {deadline:?}"),
            })
        }
    };

    if !status.healthy {
        return Err(StorageError::HealthCheckFailed {
            message: status
                .message
                .unwrap_or_else(|| "store reported unhealthy".to_string()),
        });
    }
    Ok(status)
}

/// Periodically probes the store until a probe fails.
pub struct HealthMonitor<S: RoomStore> {
    store: Arc<S>,
    interval: Duration,
    timeout: Duration,
}

impl<S: RoomStore> HealthMonitor<S> {
    pub fn new(store: Arc<S>, interval: Duration, timeout: Duration) -> Self {
        Self {
            store,
            interval,
            timeout,
        }
    }

    /// Probes every `interval` and returns the first failure.
    ///
    /// The first probe happens one interval after the call.
    pub async fn run(self) -> StorageError {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match check_store_health(self.store.as_ref(), self.timeout).await {
                Ok(status) => {
                    debug!(
                        backend = self.store.backend_name(),
                        latency_ms = status.latency.as_millis() as u64,
                        "Store health check passed"
                    );
                }
                Err(e) => {
                    error!(
                        backend = self.store.backend_name(),
                        error = %e,
                        "Store health check failed"
                    );
                    metrics::counter!("roomap_health_check_failures_total").increment(1);
                    return e;
                }
            }
        }
    }
}
