//! Redis access for the template hash.
//!
//! One multiplexed connection is shared by every task. Each command goes
//! through the circuit breaker. Transport failures count against the breaker
//! and drop the connection so the next command reconnects; error replies do
//! neither.

use std::future::Future;
use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use tokio::sync::RwLock;

use crate::config::RedisConfig;

use super::CircuitBreaker;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Circuit breaker is open")]
    CircuitOpen,
}

/// Failures of the connection itself, as opposed to error replies.
fn is_transport_error(err: &RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_timeout()
}

pub struct RedisPool {
    client: Client,
    shared: RwLock<Option<MultiplexedConnection>>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl RedisPool {
    /// Parses the URL only; the first command opens the connection.
    pub fn new(config: RedisConfig, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, PoolError> {
        Ok(Self {
            client: Client::open(config.url.as_str())?,
            shared: RwLock::new(None),
            circuit_breaker,
        })
    }

    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.circuit_breaker
    }

    async fn connection(&self) -> Result<MultiplexedConnection, PoolError> {
        if !self.circuit_breaker.allow_request() {
            return Err(PoolError::CircuitOpen);
        }

        if let Some(conn) = self.shared.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.shared.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .inspect_err(|e| {
                self.circuit_breaker.record_failure();
                tracing::error!(error = %e, "Failed to connect to Redis");
            })?;
        tracing::info!("Redis connection established");
        Ok(slot.insert(conn).clone())
    }

    async fn command<T, F, Fut>(&self, run: F) -> Result<T, PoolError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let conn = self.connection().await?;
        let result = run(conn).await;

        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(e) if is_transport_error(e) => {
                self.shared.write().await.take();
                self.circuit_breaker.record_failure();
            }
            // Server replies such as WRONGTYPE mean Redis is up
            Err(_) => {}
        }
        Ok(result?)
    }

    pub async fn ping(&self) -> Result<(), PoolError> {
        self.command(|mut conn| async move {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok(())
        })
        .await
    }

    /// True when `field` did not exist before.
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool, PoolError> {
        let added: i64 = self
            .command(|mut conn| async move { conn.hset(key, field, value).await })
            .await?;
        Ok(added > 0)
    }

    /// Field/value pairs in Redis iteration order.
    pub async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>, PoolError> {
        self.command(|mut conn| async move { conn.hgetall(key).await })
            .await
    }

    /// True when `field` existed.
    pub async fn hdel(&self, key: &str, field: &str) -> Result<bool, PoolError> {
        let removed: i64 = self
            .command(|mut conn| async move { conn.hdel(key, field).await })
            .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis::{CircuitBreakerConfig, CircuitState};

    #[test]
    fn test_new_does_not_connect() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:6399".to_string(),
        };
        let pool = RedisPool::new(config, Arc::new(CircuitBreaker::new())).unwrap();
        assert_eq!(pool.circuit_breaker().state(), CircuitState::Closed);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = RedisConfig {
            url: "not a url".to_string(),
        };
        assert!(RedisPool::new(config, Arc::new(CircuitBreaker::new())).is_err());
    }

    #[test]
    fn test_only_transport_errors_trip_breaker() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(is_transport_error(&RedisError::from(reset)));

        let wrong_type = RedisError::from((
            redis::ErrorKind::TypeError,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        ));
        assert!(!is_transport_error(&wrong_type));

        let reply = RedisError::from((redis::ErrorKind::ResponseError, "ERR unknown command"));
        assert!(!is_transport_error(&reply));
    }

    #[tokio::test]
    async fn test_open_circuit_fails_fast() {
        let breaker = Arc::new(CircuitBreaker::with_config(CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            reset_timeout_ms: 60_000,
        }));
        breaker.record_failure();

        let pool = RedisPool::new(RedisConfig::default(), breaker).unwrap();
        assert!(matches!(pool.ping().await, Err(PoolError::CircuitOpen)));
    }
}
