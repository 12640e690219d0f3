//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router
//! binary. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::RoutingOptions;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Path normalisation and body limits.
    pub routing: RoutingConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefix prepended to every declared route path.
    pub base_path: String,

    /// Leading segment stripped from request paths. Empty disables stripping.
    pub strip_prefix: String,

    /// Strip trailing slashes from patterns and request paths.
    pub trim_trailing_slash: bool,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            strip_prefix: "/api".to_string(),
            trim_trailing_slash: true,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

impl From<&RoutingConfig> for RoutingOptions {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            strip_prefix: (!config.strip_prefix.is_empty()).then(|| config.strip_prefix.clone()),
            trim_trailing_slash: config.trim_trailing_slash,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "api_router=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
