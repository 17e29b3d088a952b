//! Backend trait for template storage.
//!
//! Every backend holds the same logical two-column table (name -> body) so
//! they can be swapped by configuration.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

use crate::metrics::BackendMetrics;
use crate::postgres::PostgresPoolError;
use crate::redis::{CircuitBreaker, PoolError};
use crate::template::{SaveOutcome, Template};

/// Errors that can occur during store backend operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Redis operation failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Backend is temporarily unavailable (e.g., circuit breaker open)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Reading a seed file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed rows could not be parsed
    #[error("Invalid seed rows: {0}")]
    InvalidSeed(String),
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Redis(e) => StoreError::Redis(e),
            PoolError::CircuitOpen => {
                StoreError::Unavailable("Redis circuit breaker is open".to_string())
            }
        }
    }
}

impl From<PostgresPoolError> for StoreError {
    fn from(err: PostgresPoolError) -> Self {
        match err {
            PostgresPoolError::Sqlx(e) => StoreError::Postgres(e),
            PostgresPoolError::CircuitOpen => {
                StoreError::Unavailable("PostgreSQL circuit breaker is open".to_string())
            }
        }
    }
}

/// Backend trait for template storage.
///
/// Implementations must be `Send + Sync`; one instance is shared by all
/// request handlers. Concurrent saves to the same name are last-writer-wins.
#[async_trait]
pub trait TemplateBackend: Send + Sync {
    /// Backend type identifier ("memory", "redis", "postgres")
    fn backend_type(&self) -> &'static str;

    /// Load every template.
    async fn load_all(&self) -> Result<Vec<Template>, StoreError>;

    /// Overwrite the body of `template.name`, or add it.
    async fn upsert(&self, template: &Template) -> Result<SaveOutcome, StoreError>;

    /// Remove a template. Returns whether it existed.
    async fn remove(&self, name: &str) -> Result<bool, StoreError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Circuit breaker protecting the backend, if any.
    fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        None
    }
}

/// Run a backend operation, recording its latency and any error.
pub(crate) async fn instrumented<T, Fut>(
    backend: &'static str,
    operation: &'static str,
    fut: Fut,
) -> Result<T, StoreError>
where
    Fut: Future<Output = Result<T, StoreError>>,
{
    let started = Instant::now();
    let result = fut.await;

    match &result {
        Ok(_) => BackendMetrics::record_operation(backend, operation, started.elapsed()),
        Err(e) => {
            BackendMetrics::record_error(backend, operation);
            tracing::warn!(
                backend = backend,
                operation = operation,
                error = %e,
                "Template store operation failed"
            );
        }
    }

    result
}
