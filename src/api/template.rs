//! Template CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, Result};
use crate::metrics::HttpMetrics;
use crate::server::AppState;
use crate::sheet::{SheetValues, TemplateTable};
use crate::store::ImportSummary;
use crate::template::{
    SaveOutcome, SaveTemplateRequest, SaveTemplateResponse, TemplateDetail, TemplateListResponse,
    VariablesResponse,
};

/// GET /api/v1/templates - List all templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Result<Json<TemplateListResponse>> {
    HttpMetrics::record_request("list_templates");

    let templates = state.repository.list().await?;
    let total = templates.len();

    Ok(Json(TemplateListResponse { templates, total }))
}

/// GET /api/v1/templates/{name} - Get a template and its variables
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TemplateDetail>> {
    HttpMetrics::record_request("get_template");

    let template = state.repository.get(&name).await?;
    Ok(Json(template.into()))
}

/// PUT /api/v1/templates/{name} - Create or overwrite a template
#[tracing::instrument(
    name = "http.save_template",
    skip(state, request),
    fields(body_len = request.body.len())
)]
pub async fn save_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SaveTemplateRequest>,
) -> Result<(StatusCode, Json<SaveTemplateResponse>)> {
    HttpMetrics::record_request("save_template");

    let outcome = state.repository.save(&name, request.body).await?;
    let name = name.trim().to_string();
    let status = match outcome {
        SaveOutcome::Created => StatusCode::CREATED,
        SaveOutcome::Updated => StatusCode::OK,
    };

    Ok((
        status,
        Json(SaveTemplateResponse {
            message: outcome.message(&name),
            name,
            outcome,
        }),
    ))
}

/// DELETE /api/v1/templates/{name} - Delete a template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    HttpMetrics::record_request("delete_template");

    state.repository.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{name}/variables - Variables referenced by a template
#[tracing::instrument(name = "http.template_variables", skip(state))]
pub async fn template_variables(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<VariablesResponse>> {
    HttpMetrics::record_request("template_variables");

    let variables = state.repository.variables(&name).await?;
    Ok(Json(VariablesResponse { variables }))
}

/// POST /api/v1/templates/refresh - Drop the cached template list
#[tracing::instrument(name = "http.refresh_templates", skip(state))]
pub async fn refresh_templates(State(state): State<AppState>) -> StatusCode {
    HttpMetrics::record_request("refresh_templates");

    state.repository.refresh().await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/templates/export - All templates as spreadsheet rows
#[tracing::instrument(name = "http.export_templates", skip(state))]
pub async fn export_templates(State(state): State<AppState>) -> Result<Json<SheetValues>> {
    HttpMetrics::record_request("export_templates");

    let table = state.repository.export().await?;
    Ok(Json(SheetValues {
        values: table.to_rows(),
    }))
}

/// POST /api/v1/templates/import - Bulk upsert from spreadsheet rows
#[tracing::instrument(
    name = "http.import_templates",
    skip(state, request),
    fields(rows = request.values.len())
)]
pub async fn import_templates(
    State(state): State<AppState>,
    Json(request): Json<SheetValues>,
) -> Result<Json<ImportSummary>> {
    HttpMetrics::record_request("import_templates");

    let table = TemplateTable::from_rows(request.values);
    if table.is_empty() {
        return Err(AppError::Validation(
            "Import contains no template rows".to_string(),
        ));
    }

    let summary = state.repository.import(table).await?;
    Ok(Json(summary))
}
