use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

/// Hide internal detail from clients in production
fn masked(detail: String, public: &str) -> String {
    if is_production() {
        public.to_string()
    } else {
        detail
    }
}

impl AppError {
    /// Status, machine-readable code, client message and log message
    fn parts(&self) -> (StatusCode, &'static str, String, String) {
        let detail = self.to_string();

        match self {
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                detail.clone(),
                detail,
            ),
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                detail.clone(),
                detail,
            ),
            AppError::Template(err) => match err {
                TemplateError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "TEMPLATE_NOT_FOUND",
                    detail.clone(),
                    detail,
                ),
                TemplateError::InvalidName(_) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_NAME",
                    detail.clone(),
                    detail,
                ),
                TemplateError::InvalidBody(_) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_BODY",
                    detail.clone(),
                    detail,
                ),
                TemplateError::VariablesNotObject => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_VARIABLES",
                    detail.clone(),
                    detail,
                ),
                TemplateError::MissingVariables(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MISSING_VARIABLES",
                    detail.clone(),
                    detail,
                ),
                TemplateError::Store(StoreError::Unavailable(_)) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    masked(detail.clone(), "Service temporarily unavailable"),
                    detail,
                ),
                TemplateError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    masked(detail.clone(), "Template store error"),
                    detail,
                ),
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Template(TemplateError::Store(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message, log_message) = self.parts();

        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::debug!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
