//! Redis storage implementation.
//!
//! Supports a single Redis instance (via `ConnectionManager`, which
//! reconnects transparently) and Redis Cluster (via the async cluster
//! client). Hotel hashes are addressed as `room_map:{<id>}`; the braces are
//! a cluster hash tag, so every field of one hotel lives in one slot.
//!
//! # Pipelining
//!
//! - **Single node**: one explicit `redis::pipe()` carrying every `HGETALL`,
//!   i.e. exactly one network round-trip.
//! - **Cluster**: keys spread over many slots, so the commands are issued
//!   concurrently on the multiplexed cluster connection, which batches them
//!   per node on the wire. No extra tasks are spawned.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::aio::ConnectionLike;
use redis::{AsyncCommands, ConnectionInfo, IntoConnectionInfo, RedisError, RedisResult, Value};
use tracing::{debug, info, instrument};

use crate::error::{HealthStatus, StorageError, StorageResult};
use crate::traits::{PipelineResponse, RawFieldMap, RoomStore};

/// Default time allowed to establish connections.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for a single store round-trip.
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration for the Redis backend.
#[derive(Clone)]
pub struct RedisConfig {
    /// `host:port` pairs. Cluster mode accepts several seed nodes.
    pub addrs: Vec<String>,
    /// Optional AUTH password.
    pub password: Option<String>,
    /// Use the cluster client.
    pub cluster: bool,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for each round-trip.
    pub response_timeout: Duration,
}

// Custom Debug implementation to hide the password
impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("addrs", &self.addrs)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("cluster", &self.cluster)
            .field("connect_timeout", &self.connect_timeout)
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addrs: vec!["localhost:6379".to_string()],
            password: None,
            cluster: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl RedisConfig {
    fn connection_infos(&self) -> StorageResult<Vec<ConnectionInfo>> {
        if self.addrs.is_empty() {
            return Err(StorageError::InvalidConfig {
                message: "no Redis addresses provided".to_string(),
            });
        }
        if !self.cluster && self.addrs.len() > 1 {
            return Err(StorageError::InvalidConfig {
                message: "multiple addresses provided but cluster mode is disabled".to_string(),
            });
        }

        self.addrs
            .iter()
            .map(|addr| {
                let mut info = format!("redis://{}/", addr.trim())
                    .into_connection_info()
                    .map_err(|e| StorageError::InvalidConfig {
                        message: format!("invalid Redis address '{addr}': {e}"),
                    })?;
                info.redis.password = self.password.clone();
                Ok(info)
            })
            .collect()
    }
}

#[derive(Clone)]
enum Connection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

/// Redis implementation of RoomStore.
#[derive(Clone)]
pub struct RedisRoomStore {
    connection: Connection,
    response_timeout: Duration,
}

impl std::fmt::Debug for RedisRoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRoomStore")
            .field("backend", &self.backend_name())
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}

impl RedisRoomStore {
    /// Connects to Redis with the given configuration.
    #[instrument(skip(config), fields(cluster = config.cluster))]
    pub async fn from_config(config: &RedisConfig) -> StorageResult<Self> {
        let infos = config.connection_infos()?;

        let connect = async {
            if config.cluster {
                let mut builder = ClusterClientBuilder::new(infos);
                if let Some(password) = &config.password {
                    builder = builder.password(password.clone());
                }
                let client = builder.build()?;
                let conn = client.get_async_connection().await?;
                Ok::<_, RedisError>(Connection::Cluster(conn))
            } else {
                let info = infos.into_iter().next().ok_or_else(|| {
                    RedisError::from((redis::ErrorKind::InvalidClientConfig, "no address"))
                })?;
                let client = redis::Client::open(info)?;
                let manager = ConnectionManager::new(client).await?;
                Ok(Connection::Single(manager))
            }
        };

        let connection = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| StorageError::QueryTimeout {
                operation: "connect".to_string(),
                timeout: config.connect_timeout,
            })?
            .map_err(|e| StorageError::ConnectionError {
                message: e.to_string(),
            })?;

        info!(
            addrs = ?config.addrs,
            cluster = config.cluster,
            "Redis connection established"
        );

        Ok(Self {
            connection,
            response_timeout: config.response_timeout,
        })
    }

    /// Runs `fut` under the response timeout and records its duration.
    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: std::future::Future<Output = RedisResult<T>>,
    {
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.response_timeout, fut).await;

        let status = match &outcome {
            Ok(Ok(_)) => "success",
            Ok(Err(_)) => "error",
            Err(_) => "timeout",
        };
        metrics::histogram!(
            "roomap_store_round_trip_seconds",
            "operation" => operation,
            "backend" => self.backend_name(),
            "status" => status
        )
        .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(result) => result.map_err(|e| map_redis_error(operation, self.response_timeout, e)),
            Err(_elapsed) => Err(StorageError::QueryTimeout {
                operation: operation.to_string(),
                timeout: self.response_timeout,
            }),
        }
    }

    async fn ping_and_info(&self) -> RedisResult<String> {
        match &self.connection {
            Connection::Single(conn) => {
                let mut conn = conn.clone();
                let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                redis::cmd("INFO").arg("server").query_async(&mut conn).await
            }
            Connection::Cluster(conn) => {
                let mut conn = conn.clone();
                let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                redis::cmd("CLUSTER").arg("INFO").query_async(&mut conn).await
            }
        }
    }
}

/// Classifies a client error: transport problems are connection errors,
/// everything else is a query error.
fn map_redis_error(operation: &str, timeout: Duration, err: RedisError) -> StorageError {
    if err.is_timeout() {
        StorageError::QueryTimeout {
            operation: operation.to_string(),
            timeout,
        }
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StorageError::ConnectionError {
            message: err.to_string(),
        }
    } else {
        StorageError::QueryError {
            message: err.to_string(),
        }
    }
}

/// Redis never stores empty hashes, so an empty reply means the key is absent.
fn fields_or_not_found(key: &str, fields: RawFieldMap) -> StorageResult<RawFieldMap> {
    if fields.is_empty() {
        Err(StorageError::KeyNotFound {
            key: key.to_string(),
        })
    } else {
        Ok(fields)
    }
}

fn decode_pipeline_reply(key: &str, value: &Value) -> StorageResult<RawFieldMap> {
    if let Value::ServerError(err) = value {
        return Err(StorageError::QueryError {
            message: match err.details() {
                Some(details) => format!("HGETALL {key} failed: {} {details}", err.code()),
                None => format!("HGETALL {key} failed: {}", err.code()),
            },
        });
    }

    let fields: RawFieldMap =
        redis::from_redis_value(value).map_err(|e| StorageError::QueryError {
            message: format!("unexpected HGETALL reply for {key}: {e}"),
        })?;
    fields_or_not_found(key, fields)
}

#[async_trait]
impl RoomStore for RedisRoomStore {
    #[instrument(skip(self))]
    async fn hash_get_all(&self, key: &str) -> StorageResult<RawFieldMap> {
        let fields: RawFieldMap = match &self.connection {
            Connection::Single(conn) => {
                let mut conn = conn.clone();
                self.timed("hgetall", async move { conn.hgetall(key).await })
                    .await?
            }
            Connection::Cluster(conn) => {
                let mut conn = conn.clone();
                self.timed("hgetall", async move { conn.hgetall(key).await })
                    .await?
            }
        };
        fields_or_not_found(key, fields)
    }

    #[instrument(skip(self, keys), fields(key_count = keys.len()))]
    async fn pipelined_hash_get_all(&self, keys: &[String]) -> PipelineResponse {
        if keys.is_empty() {
            return PipelineResponse::default();
        }

        match &self.connection {
            Connection::Single(conn) => {
                let mut conn = conn.clone();
                let mut pipe = redis::pipe();
                for key in keys {
                    pipe.cmd("HGETALL").arg(key);
                }

                // Raw replies keep per-command error values in place.
                let count = keys.len();
                let values: Vec<Value> = match self
                    .timed("pipeline_hgetall", async move {
                        conn.req_packed_commands(&pipe, 0, count).await
                    })
                    .await
                {
                    Ok(values) => values,
                    Err(e) => return PipelineResponse::failed(keys.len(), e),
                };

                if values.len() != keys.len() {
                    return PipelineResponse::failed(
                        keys.len(),
                        StorageError::QueryError {
                            message: format!(
                                "pipeline returned {} replies for {} commands",
                                values.len(),
                                keys.len()
                            ),
                        },
                    );
                }

                let results: Vec<StorageResult<RawFieldMap>> = keys
                    .iter()
                    .zip(values.iter())
                    .map(|(key, value)| decode_pipeline_reply(key, value))
                    .collect();
                let batch_error = results
                    .iter()
                    .find_map(|r| r.as_ref().err().filter(|e| !e.is_not_found()).cloned());

                PipelineResponse {
                    results,
                    batch_error,
                }
            }
            Connection::Cluster(conn) => {
                let start = Instant::now();
                let reads = keys.iter().map(|key| {
                    let mut conn = conn.clone();
                    async move {
                        let outcome =
                            tokio::time::timeout(self.response_timeout, conn.hgetall(key.as_str()))
                                .await;
                        match outcome {
                            Ok(Ok(fields)) => fields_or_not_found(key, fields),
                            Ok(Err(e)) => Err(map_redis_error(
                                "pipeline_hgetall",
                                self.response_timeout,
                                e,
                            )),
                            Err(_elapsed) => Err(StorageError::QueryTimeout {
                                operation: "pipeline_hgetall".to_string(),
                                timeout: self.response_timeout,
                            }),
                        }
                    }
                });
                let results: Vec<StorageResult<RawFieldMap>> = join_all(reads).await;

                metrics::histogram!(
                    "roomap_store_round_trip_seconds",
                    "operation" => "pipeline_hgetall",
                    "backend" => "redis-cluster",
                    "status" => "complete"
                )
                .record(start.elapsed().as_secs_f64());
                debug!(key_count = keys.len(), "cluster pipeline complete");

                let batch_error = results
                    .iter()
                    .find_map(|r| r.as_ref().err().filter(|e| !e.is_not_found()).cloned());

                PipelineResponse {
                    results,
                    batch_error,
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let start = Instant::now();
        let info = self
            .timed("health_check", self.ping_and_info())
            .await
            .map_err(|e| StorageError::HealthCheckFailed {
                message: e.to_string(),
            })?;

        if info.trim().is_empty() {
            return Err(StorageError::HealthCheckFailed {
                message: "Redis info returned empty response".to_string(),
            });
        }

        Ok(HealthStatus {
            healthy: true,
            latency: start.elapsed(),
            message: Some(self.backend_name().to_string()),
        })
    }

    fn backend_name(&self) -> &'static str {
        match self.connection {
            Connection::Single(_) => "redis",
            Connection::Cluster(_) => "redis-cluster",
        }
    }
}
