//! Rendering and variable extraction endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::metrics::HttpMetrics;
use crate::server::AppState;
use crate::template::{
    extract_variables, ExtractVariablesRequest, RenderTemplateRequest, RenderTextRequest,
    RenderedTemplate, VariablesResponse,
};

/// POST /api/v1/templates/{name}/render - Render a stored template
#[tracing::instrument(name = "http.render_template", skip(state, request))]
pub async fn render_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RenderTemplateRequest>,
) -> Result<Json<RenderedTemplate>> {
    HttpMetrics::record_request("render_template");

    let rendered = state.repository.render(&name, &request.variables).await?;
    Ok(Json(rendered))
}

/// POST /api/v1/render - Render template text supplied in the request
#[tracing::instrument(
    name = "http.render_text",
    skip(state, request),
    fields(body_len = request.body.len())
)]
pub async fn render_text(
    State(state): State<AppState>,
    Json(request): Json<RenderTextRequest>,
) -> Result<Json<RenderedTemplate>> {
    HttpMetrics::record_request("render_text");

    let rendered = state
        .repository
        .render_text(&request.body, &request.variables)?;
    Ok(Json(rendered))
}

/// POST /api/v1/variables - Extract variables from template text
#[tracing::instrument(name = "http.extract_variables", skip(request))]
pub async fn extract(Json(request): Json<ExtractVariablesRequest>) -> Json<VariablesResponse> {
    HttpMetrics::record_request("extract_variables");

    Json(VariablesResponse {
        variables: extract_variables(&request.body).into_iter().collect(),
    })
}
