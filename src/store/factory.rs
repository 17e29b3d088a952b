//! Template backend factory

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::postgres::PostgresPool;
use crate::redis::RedisPool;

use super::backend::{StoreError, TemplateBackend};
use super::memory_backend::MemoryTemplateBackend;
use super::postgres_backend::PostgresTemplateBackend;
use super::redis_backend::RedisTemplateBackend;

/// Create a template backend based on configuration.
///
/// Returns the appropriate backend implementation based on the `backend` setting:
/// - `"postgres"`: Returns a `PostgresTemplateBackend` if a PostgreSQL pool is provided
/// - `"redis"`: Returns a `RedisTemplateBackend` if a Redis pool is provided
/// - `"memory"` (default): Returns a `MemoryTemplateBackend`
///
/// The PostgreSQL table is created here when missing.
pub async fn create_template_backend(
    settings: &StoreConfig,
    redis_pool: Option<Arc<RedisPool>>,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Result<Arc<dyn TemplateBackend>, StoreError> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(
                    backend = "postgres",
                    table = %settings.table,
                    "Creating PostgreSQL template backend"
                );
                let backend = PostgresTemplateBackend::new(pool, settings.table.clone())?;
                backend.ensure_schema().await?;
                Ok(Arc::new(backend))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Ok(Arc::new(MemoryTemplateBackend::new()))
            }
        }
        "redis" => {
            if let Some(pool) = redis_pool {
                tracing::info!(
                    backend = "redis",
                    key = %settings.redis_key,
                    "Creating Redis template backend"
                );
                Ok(Arc::new(RedisTemplateBackend::new(
                    pool,
                    settings.redis_key.clone(),
                )))
            } else {
                tracing::warn!(
                    "Redis backend requested but no pool provided, falling back to memory"
                );
                Ok(Arc::new(MemoryTemplateBackend::new()))
            }
        }
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown store backend, using memory");
            }
            tracing::info!(backend = "memory", "Creating memory template backend");
            Ok(Arc::new(MemoryTemplateBackend::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisConfig;
    use crate::redis::CircuitBreaker;

    fn store(backend: &str) -> StoreConfig {
        StoreConfig {
            backend: backend.to_string(),
            ..StoreConfig::default()
        }
    }

    #[tokio::test]
    async fn test_memory_by_default() {
        let backend = create_template_backend(&store("memory"), None, None)
            .await
            .unwrap();
        assert_eq!(backend.backend_type(), "memory");

        let backend = create_template_backend(&store("sheets"), None, None)
            .await
            .unwrap();
        assert_eq!(backend.backend_type(), "memory");
    }

    #[tokio::test]
    async fn test_missing_pool_falls_back_to_memory() {
        let backend = create_template_backend(&store("redis"), None, None)
            .await
            .unwrap();
        assert_eq!(backend.backend_type(), "memory");

        let backend = create_template_backend(&store("postgres"), None, None)
            .await
            .unwrap();
        assert_eq!(backend.backend_type(), "memory");
    }

    #[tokio::test]
    async fn test_redis_backend_selected() {
        let pool = Arc::new(
            RedisPool::new(RedisConfig::default(), Arc::new(CircuitBreaker::new())).unwrap(),
        );
        let backend = create_template_backend(&store("redis"), Some(pool), None)
            .await
            .unwrap();
        assert_eq!(backend.backend_type(), "redis");
    }
}
