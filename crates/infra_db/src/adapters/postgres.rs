//! PostgreSQL key-value store
//!
//! Entries live in the `kv_entries` table created by the workspace
//! migrations. Queries are built at runtime so the crate compiles without a
//! live database.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, KeyValueStore, PortError};

use crate::error::DatabaseError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// PostgreSQL-backed implementation of the KeyValueStore port
#[derive(Debug, Clone)]
pub struct PostgresKeyValueStore {
    pool: PgPool,
}

impl PostgresKeyValueStore {
    /// Creates a new store over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::MigrationFailed` if a migration cannot be applied
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }
}

impl DomainPort for PostgresKeyValueStore {}

#[async_trait]
impl HealthCheckable for PostgresKeyValueStore {
    /// Performs a simple SELECT 1 query to verify the connection pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(_) => HealthCheckResult::healthy(
                "postgres-kv-store",
                start.elapsed().as_millis() as u64,
            ),
            Err(e) => HealthCheckResult::unhealthy(
                "postgres-kv-store",
                format!("Database error: {}", e),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for PostgresKeyValueStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: String) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(key, "Entry written");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<bool, PortError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, PortError> {
        let pattern = format!("{}%", escape_like(prefix));
        let keys = sqlx::query_scalar::<_, String>(
            r#"SELECT key FROM kv_entries WHERE key LIKE $1 ESCAPE '\' ORDER BY key"#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(keys)
    }
}

/// Escapes LIKE wildcards so the prefix matches literally
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
