//! In-memory template backend.
//!
//! Keeps templates in a [`TemplateTable`] so row order and upsert semantics
//! match the shared spreadsheet. Contents are lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::sheet::TemplateTable;
use crate::template::{SaveOutcome, Template};

use super::backend::{instrumented, StoreError, TemplateBackend};

const BACKEND: &str = "memory";

/// In-memory template backend.
#[derive(Default)]
pub struct MemoryTemplateBackend {
    table: RwLock<TemplateTable>,
}

impl MemoryTemplateBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows.
    pub fn with_table(table: TemplateTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl TemplateBackend for MemoryTemplateBackend {
    fn backend_type(&self) -> &'static str {
        BACKEND
    }

    async fn load_all(&self) -> Result<Vec<Template>, StoreError> {
        instrumented(BACKEND, "load_all", async {
            Ok(self.table.read().await.templates().to_vec())
        })
        .await
    }

    async fn upsert(&self, template: &Template) -> Result<SaveOutcome, StoreError> {
        instrumented(BACKEND, "upsert", async {
            let mut stamped = template.clone();
            stamped.updated_at = Some(chrono::Utc::now());
            Ok(self.table.write().await.upsert(stamped))
        })
        .await
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        instrumented(BACKEND, "remove", async {
            Ok(self.table.write().await.remove(name))
        })
        .await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_load() {
        let backend = MemoryTemplateBackend::new();

        let outcome = backend
            .upsert(&Template::new("welcome", "Hello {{name}}"))
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Created);

        let outcome = backend
            .upsert(&Template::new("welcome", "Hi {{name}}"))
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Updated);

        let all = backend.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].body, "Hi {{name}}");
        assert!(all[0].updated_at.is_some());
    }

    #[tokio::test]
    async fn test_preserves_row_order() {
        let backend = MemoryTemplateBackend::new();
        for name in ["zeta", "alpha", "mid"] {
            backend.upsert(&Template::new(name, "x")).await.unwrap();
        }
        backend.upsert(&Template::new("alpha", "y")).await.unwrap();

        let names: Vec<_> = backend
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let table: TemplateTable = vec![Template::new("a", "1")].into_iter().collect();
        let backend = MemoryTemplateBackend::with_table(table);

        assert!(backend.remove("a").await.unwrap());
        assert!(!backend.remove("a").await.unwrap());
        assert!(backend.load_all().await.unwrap().is_empty());
        tokio_test::assert_ok!(backend.health_check().await);
    }
}
