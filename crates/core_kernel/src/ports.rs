//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types for the hexagonal
//! architecture used across the quoting domains.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! │      (SessionService, PendingQuoteRepository, Settlement)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Port Traits                             │
//! │           (KeyValueStore, PaymentGateway, Clock)             │
//! └─────────────────────────────────────────────────────────────┘
//!                    ▲                         ▲
//!                    │                         │
//!         ┌─────────┴─────────┐     ┌────────┴────────┐
//!         │  In-memory / file │     │   PostgreSQL     │
//!         │     adapters      │     │    adapter       │
//!         └───────────────────┘     └──────────────────┘
//! ```
//!
//! Persisted state is a flat key → JSON document space, the same shape a
//! browser's local storage offers. Domain repositories own their keys and
//! their document formats; adapters only move strings.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// A value could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Serialization error
    pub fn serialization(message: impl fmt::Display) -> Self {
        PortError::Serialization {
            message: message.to_string(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::Timeout { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is degraded but operational
    Degraded,
    /// Adapter is unhealthy and not operational
    Unhealthy,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// A healthy result with no extra detail
    pub fn healthy(adapter_id: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    /// An unhealthy result carrying the failure reason
    pub fn unhealthy(adapter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Unhealthy,
            latency_ms: 0,
            message: Some(message.into()),
            checked_at: chrono::Utc::now(),
        }
    }
}

/// Trait for adapters that support health checks
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    async fn health_check(&self) -> HealthCheckResult;
}

/// Key-value persistence capability
///
/// Values are JSON documents encoded as strings. A missing key is `Ok(None)`,
/// never an error.
#[async_trait]
pub trait KeyValueStore: DomainPort + HealthCheckable {
    /// Reads the raw value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, PortError>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: String) -> Result<(), PortError>;

    /// Removes `key`; returns whether a value was present
    async fn remove(&self, key: &str) -> Result<bool, PortError>;

    /// Lists the keys starting with `prefix`
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, PortError>;
}

/// Reads and decodes a JSON document, degrading malformed content to `None`
///
/// Absence and corruption are both treated as "nothing stored"; only
/// adapter failures propagate.
pub async fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, PortError>
where
    T: serde::de::DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding malformed stored document");
            Ok(None)
        }
    }
}

/// Encodes and stores a JSON document
pub async fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), PortError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(PortError::serialization)?;
    store.set(key, raw).await
}

/// A view of a store whose keys are namespaced under a prefix
///
/// Used to give each authenticated user their own session and
/// pending-quote documents inside one shared store.
#[derive(Clone)]
pub struct ScopedStore {
    inner: Arc<dyn KeyValueStore>,
    scope: String,
}

impl ScopedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    /// Returns the namespace prefix
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}/{}", self.scope, key)
    }
}

impl fmt::Debug for ScopedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedStore").field("scope", &self.scope).finish()
    }
}

impl DomainPort for ScopedStore {}

#[async_trait]
impl HealthCheckable for ScopedStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check().await
    }
}

#[async_trait]
impl KeyValueStore for ScopedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        self.inner.get(&self.scoped(key)).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PortError> {
        self.inner.set(&self.scoped(key), value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, PortError> {
        self.inner.remove(&self.scoped(key)).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, PortError> {
        let full_prefix = self.scoped(prefix);
        let strip = format!("{}/", self.scope);
        Ok(self
            .inner
            .keys(&full_prefix)
            .await?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&strip).map(str::to_string))
            .collect())
    }
}
