//! Text template system.
//!
//! This module provides:
//! - Template definition with variable placeholders ({{variable}})
//! - Variable extraction from template text
//! - Single-pass substitution engine for rendering templates
//!
//! # Example
//!
//! ```ignore
//! let body = "Hello {{name}}, welcome to {{place}}.";
//!
//! let names = extract_variables(body);
//! assert_eq!(names.len(), 2);
//!
//! let mut variables = VariableSet::new();
//! variables.insert("name".to_string(), "Ana".to_string());
//!
//! // Unresolved placeholders are left in place
//! assert_eq!(render(body, &variables), "Hello Ana, welcome to {{place}}.");
//! ```

mod render;
mod types;
mod variables;

pub use render::{
    render, render_report, render_strict, variables_from_json, RenderOutput, VariableSet,
};
pub use types::{
    ExtractVariablesRequest, RenderTemplateRequest, RenderTextRequest, RenderedTemplate,
    SaveOutcome, SaveTemplateRequest, SaveTemplateResponse, Template, TemplateDetail,
    TemplateError, TemplateListResponse, TemplateResult, VariablesResponse, MAX_BODY_LEN,
    MAX_NAME_LEN, RESERVED_NAMES,
};
pub use variables::{extract_variables, placeholders, Placeholder, Placeholders};
