//! PostgreSQL template backend.
//!
//! Templates are rows of a single table keyed by name. The table is created
//! on startup when missing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::postgres::PostgresPool;
use crate::redis::CircuitBreaker;
use crate::template::{SaveOutcome, Template};

use super::backend::{instrumented, StoreError, TemplateBackend};

const BACKEND: &str = "postgres";

/// PostgreSQL-based template backend.
///
/// Table structure:
/// - `name` - primary key, trimmed template name
/// - `body` - template text
/// - `created_at` / `updated_at` - row timestamps
pub struct PostgresTemplateBackend {
    pool: Arc<PostgresPool>,
    table: String,
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PostgresTemplateBackend {
    /// Create a backend over `table`.
    pub fn new(pool: Arc<PostgresPool>, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !is_valid_identifier(&table) {
            return Err(StoreError::Unavailable(format!(
                "invalid PostgreSQL table name '{}'",
                table
            )));
        }
        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the templates table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                name TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table
        );

        self.pool
            .guarded(|pool| async move {
                sqlx::query(&sql).execute(&pool).await
            })
            .await?;

        tracing::info!(table = %self.table, "Template table ready");
        Ok(())
    }
}

#[async_trait]
impl TemplateBackend for PostgresTemplateBackend {
    fn backend_type(&self) -> &'static str {
        BACKEND
    }

    async fn load_all(&self) -> Result<Vec<Template>, StoreError> {
        let sql = format!(
            "SELECT name, body, updated_at FROM {} ORDER BY created_at ASC, name ASC",
            self.table
        );

        instrumented(BACKEND, "load_all", async {
            let rows: Vec<(String, String, DateTime<Utc>)> = self
                .pool
                .guarded(|pool| async move {
                    sqlx::query_as(&sql).fetch_all(&pool).await
                })
                .await?;

            Ok(rows
                .into_iter()
                .map(|(name, body, updated_at)| Template {
                    name,
                    body,
                    updated_at: Some(updated_at),
                })
                .collect())
        })
        .await
    }

    async fn upsert(&self, template: &Template) -> Result<SaveOutcome, StoreError> {
        // xmax is zero only for freshly inserted tuples
        let sql = format!(
            r#"
            INSERT INTO {} (name, body)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET body = EXCLUDED.body, updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
            self.table
        );
        let name = template.name.clone();
        let body = template.body.clone();

        instrumented(BACKEND, "upsert", async {
            let inserted: bool = self
                .pool
                .guarded(|pool| async move {
                    sqlx::query_scalar(&sql)
                        .bind(&name)
                        .bind(&body)
                        .fetch_one(&pool)
                        .await
                })
                .await?;

            tracing::debug!(
                table = %self.table,
                template = %template.name,
                inserted,
                "Template written to PostgreSQL"
            );

            Ok(if inserted {
                SaveOutcome::Created
            } else {
                SaveOutcome::Updated
            })
        })
        .await
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE name = $1", self.table);
        let name = name.to_string();

        instrumented(BACKEND, "remove", async {
            let result = self
                .pool
                .guarded(|pool| async move {
                    sqlx::query(&sql).bind(&name).execute(&pool).await
                })
                .await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.pool
            .guarded(|pool| async move {
                sqlx::query("SELECT 1").execute(&pool).await
            })
            .await?;
        Ok(())
    }

    fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        Some(self.pool.circuit_breaker().as_ref())
    }
}
