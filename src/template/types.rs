//! Template types and validation

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Maximum template name length in characters
pub const MAX_NAME_LEN: usize = 256;

/// Maximum template body length in characters (one spreadsheet cell)
pub const MAX_BODY_LEN: usize = 50_000;

/// Names taken by the collection routes under `/api/v1/templates/`
pub const RESERVED_NAMES: [&str; 3] = ["export", "import", "refresh"];

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template name: {0}")]
    InvalidName(String),

    #[error("Invalid template body: {0}")]
    InvalidBody(String),

    #[error("Variables must be an object")]
    VariablesNotObject,

    #[error("Missing values for variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// A named text template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique template name
    pub name: String,

    /// Template text with {{variable}} placeholders
    pub body: String,

    /// Last write time, for backends that track it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Template {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            updated_at: None,
        }
    }

    /// Build a template from user input, trimming the name and validating.
    pub fn from_input(name: &str, body: impl Into<String>) -> TemplateResult<Self> {
        let template = Self::new(name.trim(), body);
        template.validate()?;
        Ok(template)
    }

    /// Validate the template
    pub fn validate(&self) -> TemplateResult<()> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::InvalidName(
                "Template name is required".to_string(),
            ));
        }

        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(TemplateError::InvalidName(format!(
                "Name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        if RESERVED_NAMES.contains(&self.name.as_str()) {
            return Err(TemplateError::InvalidName(format!(
                "'{}' is reserved",
                self.name
            )));
        }

        if self.name.chars().any(char::is_control) {
            return Err(TemplateError::InvalidName(
                "Name must not contain control characters".to_string(),
            ));
        }

        if self.body.is_empty() {
            return Err(TemplateError::InvalidBody(
                "Template content is required".to_string(),
            ));
        }

        if self.body.chars().count() > MAX_BODY_LEN {
            return Err(TemplateError::InvalidBody(format!(
                "Body must be at most {} characters",
                MAX_BODY_LEN
            )));
        }

        Ok(())
    }

    /// Variable names referenced by the body
    pub fn variables(&self) -> BTreeSet<String> {
        super::extract_variables(&self.body)
    }
}

/// Whether a save appended a new row or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Created,
    Updated,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveOutcome::Created => "created",
            SaveOutcome::Updated => "updated",
        }
    }

    /// User-facing confirmation message
    pub fn message(&self, name: &str) -> String {
        match self {
            SaveOutcome::Created => format!("Template '{}' saved successfully.", name),
            SaveOutcome::Updated => format!("Template '{}' updated successfully.", name),
        }
    }
}

/// Request to save (create or overwrite) a template
#[derive(Debug, Deserialize)]
pub struct SaveTemplateRequest {
    pub body: String,
}

/// Response after saving a template
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveTemplateResponse {
    pub name: String,
    pub outcome: SaveOutcome,
    pub message: String,
}

/// Response for listing templates
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateListResponse {
    /// List of templates
    pub templates: Vec<Template>,

    /// Total count
    pub total: usize,
}

/// A template together with the variables it references
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: Template,
    pub variables: Vec<String>,
}

impl From<Template> for TemplateDetail {
    fn from(template: Template) -> Self {
        let variables = template.variables().into_iter().collect();
        Self {
            template,
            variables,
        }
    }
}

/// Request to render a stored template
#[derive(Debug, Default, Deserialize)]
pub struct RenderTemplateRequest {
    #[serde(default)]
    pub variables: serde_json::Value,
}

/// Request to render ad-hoc template text
#[derive(Debug, Deserialize)]
pub struct RenderTextRequest {
    pub body: String,
    #[serde(default)]
    pub variables: serde_json::Value,
}

/// Request to extract variables from ad-hoc template text
#[derive(Debug, Deserialize)]
pub struct ExtractVariablesRequest {
    pub body: String,
}

/// Variables referenced by a template body
#[derive(Debug, Serialize, Deserialize)]
pub struct VariablesResponse {
    pub variables: Vec<String>,
}

/// A rendered template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedTemplate {
    /// Rendered text
    pub output: String,

    /// All variables referenced by the template
    pub variables: Vec<String>,

    /// Variables left unresolved in the output
    pub missing: Vec<String>,
}
