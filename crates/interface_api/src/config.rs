//! API configuration
//!
//! Loaded from an optional `config/quoting` file (any format the `config`
//! crate understands) overlaid with `API_`-prefixed environment variables.
//! Nested keys use a double underscore: `API_STORE__BACKEND=file`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use core_kernel::Timezone;
use domain_party::CredentialDirectory;
use domain_quote::{PremiumPolicy, QuotePolicy, RateTable};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// Session and token lifetime in hours
    pub session_ttl_hours: i64,
    /// Log level
    pub log_level: String,
    /// Jurisdiction used for calendar-day date rules
    pub timezone: Timezone,
    pub store: StoreConfig,
    pub payment: PaymentConfig,
    pub quoting: QuotingConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            session_ttl_hours: domain_party::session::DEFAULT_SESSION_TTL_HOURS,
            log_level: "info".to_string(),
            timezone: Timezone::default(),
            store: StoreConfig::default(),
            payment: PaymentConfig::default(),
            quoting: QuotingConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the optional file and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/quoting").required(false))
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

/// Which key-value store backs sessions and pending quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Document path for the file backend
    pub path: PathBuf,
    /// Connection string for the postgres backend
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from("data/store.json"),
            database_url: "postgres://localhost/quoting".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Upper bound on a payment run
    pub timeout_secs: u64,
    /// How long the simulated gateway takes to answer
    pub simulated_delay_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            simulated_delay_ms: 1500,
        }
    }
}

impl PaymentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

/// Business tables: products, premium levies, validation policy and users
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotingConfig {
    pub rates: RateTable,
    pub premium: PremiumPolicy,
    pub policy: QuotePolicy,
    pub credentials: CredentialDirectory,
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            rates: RateTable::standard(),
            premium: PremiumPolicy::default(),
            policy: QuotePolicy::default(),
            credentials: CredentialDirectory::demo(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.session_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.quoting.rates.len(), 3);
        assert_eq!(config.quoting.credentials.len(), 2);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: ApiConfig = serde_json::from_str(
            r#"{"port": 9000, "store": {"backend": "file", "path": "/tmp/q.json"}}"#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.database_url, "postgres://localhost/quoting");
        assert_eq!(config.payment.timeout(), Duration::from_secs(60));
    }
}
