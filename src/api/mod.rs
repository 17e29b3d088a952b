//! API layer - HTTP endpoint handlers organized by concern.

mod health;
mod metrics;
mod render;
mod routes;
mod template;

pub use health::{health, HealthResponse, StoreHealthResponse};
pub use metrics::prometheus_metrics;
pub use render::{extract, render_template, render_text};
pub use routes::api_routes;
pub use template::{
    delete_template, export_templates, get_template, import_templates, list_templates,
    refresh_templates, save_template, template_variables,
};
