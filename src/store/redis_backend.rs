//! Redis template backend.
//!
//! All templates live in a single hash: field = template name,
//! value = template body. `HSET` tells creates from overwrites.

use std::sync::Arc;

use async_trait::async_trait;

use crate::redis::{CircuitBreaker, RedisPool};
use crate::template::{SaveOutcome, Template};

use super::backend::{instrumented, StoreError, TemplateBackend};

const BACKEND: &str = "redis";

/// Redis hash-backed template store.
pub struct RedisTemplateBackend {
    pool: Arc<RedisPool>,
    /// Hash key holding the templates
    key: String,
}

impl RedisTemplateBackend {
    pub fn new(pool: Arc<RedisPool>, key: String) -> Self {
        Self { pool, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Hash entries as templates, ordered by name.
fn templates_from_hash(entries: Vec<(String, String)>) -> Vec<Template> {
    let mut templates: Vec<Template> = entries
        .into_iter()
        .map(|(name, body)| Template::new(name, body))
        .collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    templates
}

#[async_trait]
impl TemplateBackend for RedisTemplateBackend {
    fn backend_type(&self) -> &'static str {
        BACKEND
    }

    async fn load_all(&self) -> Result<Vec<Template>, StoreError> {
        instrumented(BACKEND, "load_all", async {
            let entries = self.pool.hgetall(&self.key).await?;
            Ok(templates_from_hash(entries))
        })
        .await
    }

    async fn upsert(&self, template: &Template) -> Result<SaveOutcome, StoreError> {
        instrumented(BACKEND, "upsert", async {
            let created = self
                .pool
                .hset(&self.key, &template.name, &template.body)
                .await?;

            tracing::debug!(
                key = %self.key,
                template = %template.name,
                created,
                "Template written to Redis"
            );

            Ok(if created {
                SaveOutcome::Created
            } else {
                SaveOutcome::Updated
            })
        })
        .await
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        instrumented(BACKEND, "remove", async {
            Ok(self.pool.hdel(&self.key, name).await?)
        })
        .await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(self.pool.ping().await?)
    }

    fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        Some(self.pool.circuit_breaker().as_ref())
    }
}
