//! Single-pass variable substitution

use std::collections::{BTreeSet, HashMap};

use super::types::{TemplateError, TemplateResult};
use super::variables::{placeholders, Placeholder};

/// Caller-supplied values keyed by variable name
pub type VariableSet = HashMap<String, String>;

/// Result of rendering with a report of unresolved placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    /// Rendered text
    pub text: String,
    /// Keys that were looked up but not supplied, exactly as written between
    /// the braces
    pub missing: BTreeSet<String>,
}

impl RenderOutput {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

// Keyed by the literal inner text: `{{ name }}` only matches the key " name "
fn lookup<'v>(variables: &'v VariableSet, placeholder: &Placeholder<'_>) -> Option<&'v str> {
    variables.get(placeholder.raw).map(String::as_str)
}

/// Render `body`, reporting which placeholders had no value.
///
/// Spans are located against the original body before anything is written,
/// so a value that itself looks like `{{other}}` is copied verbatim.
pub fn render_report(body: &str, variables: &VariableSet) -> RenderOutput {
    let mut text = String::with_capacity(body.len());
    let mut missing = BTreeSet::new();
    let mut last = 0;

    for placeholder in placeholders(body) {
        text.push_str(&body[last..placeholder.start]);

        match lookup(variables, &placeholder) {
            Some(value) => text.push_str(value),
            None => {
                text.push_str(placeholder.token);
                missing.insert(placeholder.raw.to_string());
            }
        }

        last = placeholder.end;
    }

    text.push_str(&body[last..]);

    RenderOutput { text, missing }
}

/// Replace every `{{name}}` in `body` with its value.
///
/// Placeholders without a value are left untouched.
pub fn render(body: &str, variables: &VariableSet) -> String {
    render_report(body, variables).text
}

/// Like [`render`], but unresolved placeholders are an error.
pub fn render_strict(body: &str, variables: &VariableSet) -> TemplateResult<String> {
    let output = render_report(body, variables);

    if output.is_complete() {
        Ok(output.text)
    } else {
        Err(TemplateError::MissingVariables(
            output.missing.into_iter().collect(),
        ))
    }
}

/// Convert a JSON object of variables into a [`VariableSet`].
///
/// Strings are used as-is, numbers and booleans are stringified, `null`
/// becomes empty, arrays and objects are inserted as JSON text.
pub fn variables_from_json(value: &serde_json::Value) -> TemplateResult<VariableSet> {
    match value {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(key, value)| (key.clone(), json_to_text(value)))
            .collect()),
        serde_json::Value::Null => Ok(VariableSet::new()),
        _ => Err(TemplateError::VariablesNotObject),
    }
}

fn json_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        _ => value.to_string(),
    }
}
