//! Template repository.
//!
//! Ties a backend to the read-through cache and the render policy. Handlers
//! only talk to this type.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::metrics::{BackendMetrics, RenderMetrics};
use crate::sheet::TemplateTable;
use crate::template::{
    extract_variables, render_report, variables_from_json, RenderedTemplate, SaveOutcome,
    Template, TemplateError, TemplateResult, VariableSet,
};

use super::backend::{StoreError, TemplateBackend};
use super::cache::{CacheInfo, TemplateCache};

/// Counts from a bulk import
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

/// Backend + cache + render policy
pub struct TemplateRepository {
    backend: Arc<dyn TemplateBackend>,
    cache: TemplateCache,
    /// Refuse renders that leave placeholders unresolved
    strict: bool,
}

impl TemplateRepository {
    pub fn new(backend: Arc<dyn TemplateBackend>, cache: TemplateCache, strict: bool) -> Self {
        Self {
            backend,
            cache,
            strict,
        }
    }

    pub fn backend(&self) -> &Arc<dyn TemplateBackend> {
        &self.backend
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub async fn cache_info(&self) -> CacheInfo {
        self.cache.info().await
    }

    async fn snapshot(&self) -> TemplateResult<Arc<Vec<Template>>> {
        let backend = &self.backend;
        let templates = self.cache.get_or_load(|| backend.load_all()).await?;
        BackendMetrics::set_template_count(templates.len());
        Ok(templates)
    }

    /// All templates in backend order.
    pub async fn list(&self) -> TemplateResult<Vec<Template>> {
        Ok(self.snapshot().await?.as_ref().clone())
    }

    /// Look up a template by name. Surrounding whitespace is ignored.
    pub async fn get(&self, name: &str) -> TemplateResult<Template> {
        let name = name.trim();
        self.snapshot()
            .await?
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Sorted, de-duplicated variable names of a stored template.
    pub async fn variables(&self, name: &str) -> TemplateResult<Vec<String>> {
        Ok(self.get(name).await?.variables().into_iter().collect())
    }

    /// Create or overwrite a template.
    pub async fn save(&self, name: &str, body: impl Into<String>) -> TemplateResult<SaveOutcome> {
        let template = Template::from_input(name, body)?;
        let result = self.backend.upsert(&template).await;
        // The write may have landed even when the reply was lost
        self.cache.invalidate().await;
        let outcome = result?;

        tracing::info!(
            template = %template.name,
            outcome = outcome.as_str(),
            backend = self.backend.backend_type(),
            "Template saved"
        );
        Ok(outcome)
    }

    /// Remove a template; NotFound when absent.
    pub async fn delete(&self, name: &str) -> TemplateResult<()> {
        let name = name.trim();
        let result = self.backend.remove(name).await;
        self.cache.invalidate().await;

        if result? {
            tracing::info!(template = %name, "Template deleted");
            Ok(())
        } else {
            Err(TemplateError::NotFound(name.to_string()))
        }
    }

    /// Drop cached state so the next read hits the backend.
    pub async fn refresh(&self) {
        self.cache.invalidate().await;
    }

    /// Render a stored template with JSON variables.
    pub async fn render(
        &self,
        name: &str,
        variables: &serde_json::Value,
    ) -> TemplateResult<RenderedTemplate> {
        let variables = variables_from_json(variables)?;
        let template = self.get(name).await?;
        self.render_body(&template.body, &variables)
    }

    /// Render text that is not stored, e.g. a template edited before saving.
    pub fn render_text(
        &self,
        body: &str,
        variables: &serde_json::Value,
    ) -> TemplateResult<RenderedTemplate> {
        let variables = variables_from_json(variables)?;
        self.render_body(body, &variables)
    }

    fn render_body(&self, body: &str, variables: &VariableSet) -> TemplateResult<RenderedTemplate> {
        let output = render_report(body, variables);

        if self.strict && !output.is_complete() {
            RenderMetrics::record_rejected(output.missing.len());
            return Err(TemplateError::MissingVariables(
                output.missing.into_iter().collect(),
            ));
        }

        RenderMetrics::record(&output);
        let template_variables = extract_variables(body);

        Ok(RenderedTemplate {
            output: output.text,
            variables: template_variables.into_iter().collect(),
            missing: output.missing.into_iter().collect(),
        })
    }

    /// Upsert every row of `table`.
    ///
    /// All rows are validated before anything is written.
    pub async fn import(&self, table: TemplateTable) -> TemplateResult<ImportSummary> {
        for template in table.templates() {
            template.validate()?;
        }

        let mut summary = ImportSummary::default();
        let mut result: Result<(), StoreError> = Ok(());

        for template in table {
            match self.backend.upsert(&template).await {
                Ok(SaveOutcome::Created) => summary.created += 1,
                Ok(SaveOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.cache.invalidate().await;
        result?;

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            "Templates imported"
        );
        Ok(summary)
    }

    /// Insert rows whose names are not stored yet. Returns how many were added.
    pub async fn seed(&self, table: TemplateTable) -> TemplateResult<usize> {
        let existing: Vec<String> = self
            .backend
            .load_all()
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();

        let mut added = 0;
        for template in table {
            if existing.contains(&template.name) {
                continue;
            }
            if let Err(e) = template.validate() {
                tracing::warn!(template = %template.name, error = %e, "Skipping invalid seed row");
                continue;
            }
            self.backend.upsert(&template).await?;
            added += 1;
        }

        self.cache.invalidate().await;
        Ok(added)
    }

    /// Current templates as a table.
    pub async fn export(&self) -> TemplateResult<TemplateTable> {
        Ok(self.list().await?.into_iter().collect())
    }
}
