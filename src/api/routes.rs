use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::health::health;
use super::metrics::prometheus_metrics;
use super::render::{extract, render_template, render_text};
use super::template::{
    delete_template, export_templates, get_template, import_templates, list_templates,
    refresh_templates, save_template, template_variables,
};

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Writes require X-API-Key when api.key is set
    let auth = middleware::from_fn_with_state(state, api_key_auth);

    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                // Templates
                .route("/templates", get(list_templates))
                .route("/templates/refresh", post(refresh_templates))
                .route("/templates/export", get(export_templates))
                .route(
                    "/templates/import",
                    post(import_templates).route_layer(auth.clone()),
                )
                .route(
                    "/templates/{name}",
                    get(get_template).merge(
                        put(save_template)
                            .delete(delete_template)
                            .route_layer(auth),
                    ),
                )
                .route("/templates/{name}/variables", get(template_variables))
                // Rendering
                .route("/templates/{name}/render", post(render_template))
                .route("/render", post(render_text))
                .route("/variables", post(extract)),
        )
}
