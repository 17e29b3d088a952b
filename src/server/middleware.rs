use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

use super::AppState;

const API_KEY_HEADER: &str = "X-API-Key";

/// What a guarded request would write: a named template or the bulk import.
fn write_target(path: &str) -> String {
    match path.rsplit_once("/templates/") {
        Some((_, "import")) => "template import".to_string(),
        Some((_, name)) if !name.is_empty() => format!("template '{}'", name),
        _ => path.to_string(),
    }
}

/// Guards template writes with `api.key`. Open when no key is configured.
pub async fn api_key_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.api.key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let supplied = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    let key_present = supplied.is_some();

    if supplied == Some(expected) {
        return Ok(next.run(req).await);
    }

    let target = write_target(req.uri().path());
    tracing::warn!(
        method = %req.method(),
        target = %target,
        key_present,
        "Rejected template write"
    );

    Err(AppError::Unauthorized(format!(
        "{} {} requires a valid {} header",
        req.method(),
        target,
        API_KEY_HEADER
    )))
}
