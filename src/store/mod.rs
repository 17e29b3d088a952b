//! Template storage.
//!
//! Backends:
//! - `memory`: process-local table, lost on restart
//! - `redis`: one hash per deployment
//! - `postgres`: one row per template
//!
//! [`TemplateRepository`] puts a read-through cache in front of whichever
//! backend is configured.

mod backend;
mod cache;
mod factory;
mod memory_backend;
mod postgres_backend;
mod redis_backend;
mod repository;

pub use backend::{StoreError, TemplateBackend};
pub use cache::{CacheInfo, TemplateCache};
pub use factory::create_template_backend;
pub use memory_backend::MemoryTemplateBackend;
pub use postgres_backend::PostgresTemplateBackend;
pub use redis_backend::RedisTemplateBackend;
pub use repository::{ImportSummary, TemplateRepository};
