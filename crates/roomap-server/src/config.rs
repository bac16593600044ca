//! Configuration management for the roomap server.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use roomap_server::config::ServerConfig;
//!
//! // Load from file with env overrides
//! let config = ServerConfig::load("config.yaml")?;
//!
//! // Or load from environment only
//! let config = ServerConfig::from_env()?;
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use roomap_domain::ResolverConfig;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "ROOMAP";

/// Largest batch size accepted by validation.
pub const MAX_CONFIGURABLE_BATCH_SIZE: usize = 1000;

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Store settings
    #[serde(default)]
    pub store: StoreSettings,

    /// Resolver deadlines and caps
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Background health monitoring
    #[serde(default)]
    pub health: HealthSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Server network settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name, reported in startup logs
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Grace period for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Store backend settings.
///
/// These settings can be overridden via environment variables with the
/// `ROOMAP_` prefix and `__` as the nested key separator:
///
/// - `ROOMAP_STORE__ADDRS=redis-0:6379,redis-1:6379` - Node addresses
/// - `ROOMAP_STORE__CLUSTER=true` - Use Redis Cluster
/// - `ROOMAP_STORE__PASSWORD=...` - AUTH password
///
/// # Example YAML Configuration
///
/// ```yaml
/// store:
///   backend: redis
///   addrs: ["redis-0:6379", "redis-1:6379", "redis-2:6379"]
///   cluster: true
/// ```
#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct StoreSettings {
    /// Store backend type: "redis" or "memory".
    ///
    /// "memory" starts empty and has no loader, so every lookup misses. It
    /// exists for smoke tests of the HTTP surface and is rejected when
    /// `server.environment` is "production".
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// `host:port` addresses. Exactly one unless `cluster` is set.
    #[serde(default = "default_store_addrs")]
    pub addrs: Vec<String>,

    /// Optional AUTH password
    #[serde(default)]
    pub password: Option<String>,

    /// Connect in Redis Cluster mode
    #[serde(default)]
    pub cluster: bool,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-command response timeout in seconds
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            addrs: default_store_addrs(),
            password: None,
            cluster: false,
            connect_timeout_secs: default_connect_timeout(),
            response_timeout_secs: default_response_timeout(),
        }
    }
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("backend", &self.backend)
            .field("addrs", &self.addrs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cluster", &self.cluster)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("response_timeout_secs", &self.response_timeout_secs)
            .finish()
    }
}

fn default_store_backend() -> String {
    "redis".to_string()
}

fn default_store_addrs() -> Vec<String> {
    vec!["localhost:6379".to_string()]
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_response_timeout() -> u64 {
    3
}

/// Resolver deadlines and caps.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResolverSettings {
    /// Deadline for a single-hotel lookup, both attempts included
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Deadline for the pipelined batch round-trip
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,

    /// Maximum identifiers per batch request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Maximum raw fields visited per hotel
    #[serde(default = "default_max_fields_per_hotel")]
    pub max_fields_per_hotel: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout_ms(),
            batch_timeout_ms: default_batch_timeout_ms(),
            max_batch_size: default_max_batch_size(),
            max_fields_per_hotel: default_max_fields_per_hotel(),
        }
    }
}

impl ResolverSettings {
    /// Converts the settings into the resolver's runtime configuration.
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_lookup_timeout(Duration::from_millis(self.lookup_timeout_ms))
            .with_batch_timeout(Duration::from_millis(self.batch_timeout_ms))
            .with_max_batch_size(self.max_batch_size)
            .with_max_fields_per_hotel(self.max_fields_per_hotel)
    }
}

fn default_lookup_timeout_ms() -> u64 {
    5000
}

fn default_batch_timeout_ms() -> u64 {
    2000
}

fn default_max_batch_size() -> usize {
    100
}

fn default_max_fields_per_hotel() -> usize {
    2000
}

/// Background store health monitoring.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HealthSettings {
    /// Run the background monitor
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between checks
    #[serde(default = "default_health_interval")]
    pub interval_secs: u64,

    /// Deadline for one check
    #[serde(default = "default_health_timeout")]
    pub timeout_secs: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_health_interval(),
            timeout_secs: default_health_timeout(),
        }
    }
}

fn default_health_interval() -> u64 {
    30
}

fn default_health_timeout() -> u64 {
    3
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricsSettings {
    /// Enable metrics endpoint
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

fn invalid(message: impl Into<String>) -> ConfigLoadError {
    ConfigLoadError::Invalid {
        message: message.into(),
    }
}

fn environment() -> Environment {
    // ROOMAP_STORE__ADDRS=a:6379,b:6379 -> store.addrs = ["a:6379", "b:6379"]
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("store.addrs")
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `ROOMAP_` and use `__` as separator.
    /// For example:
    /// - `ROOMAP_SERVER__PORT=9090` overrides `server.port`
    /// - `ROOMAP_RESOLVER__BATCH_TIMEOUT_MS=1500` overrides `resolver.batch_timeout_ms`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment())
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(environment())
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be greater than 0"));
        }

        let valid_backends = ["redis", "memory"];
        if !valid_backends.contains(&self.store.backend.as_str()) {
            return Err(invalid(format!(
                "store.backend must be one of: {:?}, got: {}",
                valid_backends, self.store.backend
            )));
        }

        if self.store.backend == "memory" && self.server.environment == "production" {
            return Err(invalid(
                "store.backend \"memory\" is for smoke tests and cannot run in production",
            ));
        }

        if self.store.backend == "redis" {
            let addrs: Vec<&str> = self
                .store
                .addrs
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .collect();
            if addrs.is_empty() {
                return Err(invalid("store.addrs must contain at least one address"));
            }
            if !self.store.cluster && addrs.len() > 1 {
                return Err(invalid(format!(
                    "store.addrs has {} addresses but store.cluster is false; \
                     exactly one address is required outside cluster mode",
                    addrs.len()
                )));
            }
        }

        let resolver = &self.resolver;
        if resolver.lookup_timeout_ms == 0 {
            return Err(invalid("resolver.lookup_timeout_ms must be greater than 0"));
        }
        if resolver.batch_timeout_ms == 0 || resolver.batch_timeout_ms > resolver.lookup_timeout_ms
        {
            return Err(invalid(format!(
                "resolver.batch_timeout_ms must be in 1..={}, got: {}",
                resolver.lookup_timeout_ms, resolver.batch_timeout_ms
            )));
        }
        if !(1..=MAX_CONFIGURABLE_BATCH_SIZE).contains(&resolver.max_batch_size) {
            return Err(invalid(format!(
                "resolver.max_batch_size must be in 1..={}, got: {}",
                MAX_CONFIGURABLE_BATCH_SIZE, resolver.max_batch_size
            )));
        }
        if resolver.max_fields_per_hotel == 0 {
            return Err(invalid(
                "resolver.max_fields_per_hotel must be greater than 0",
            ));
        }

        if self.health.enabled && self.health.interval_secs == 0 {
            return Err(invalid("health.interval_secs must be greater than 0"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(format!(
                "logging.level must be one of: {:?}, got: {}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}
