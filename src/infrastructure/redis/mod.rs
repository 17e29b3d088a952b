//! Redis connectivity for the template store.
//!
//! - `CircuitBreaker`: fails fast while a store is unavailable (also used by
//!   the PostgreSQL pool)
//! - `pool`: multiplexed connection with hash helpers

mod circuit_breaker;
pub mod pool;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
pub use pool::{PoolError, RedisPool};

