use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::compile::CompileError;
use crate::pipeline::template::TemplateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// This is the recovery boundary: every pipeline failure ends up here and is
/// converted into a structured JSON error response. Nothing crashes the
/// long-lived process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Compilation error: {0}")]
    Compile(#[from] CompileError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),

            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                let code = match e {
                    TemplateError::NotFound(_) | TemplateError::Io { .. } => "TEMPLATE_NOT_FOUND",
                    TemplateError::Syntax { .. } | TemplateError::Render { .. } => {
                        "TEMPLATE_SYNTAX"
                    }
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, e.to_string())
            }

            AppError::Compile(e) => {
                tracing::error!("Compilation error: {e}");
                match e {
                    CompileError::PassFailed { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "LATEX_COMPILE_FAILED",
                        e.to_string(),
                    ),
                    CompileError::Timeout(_) => {
                        (StatusCode::GATEWAY_TIMEOUT, "COMPILE_TIMEOUT", e.to_string())
                    }
                    CompileError::ArtifactMissing => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "ARTIFACT_MISSING",
                        e.to_string(),
                    ),
                    CompileError::Spawn(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "COMPILER_UNAVAILABLE",
                        e.to_string(),
                    ),
                    CompileError::Remote(_) => {
                        (StatusCode::BAD_GATEWAY, "REMOTE_COMPILE_FAILED", e.to_string())
                    }
                    CompileError::Io(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "LATEX_COMPILE_FAILED",
                        e.to_string(),
                    ),
                }
            }

            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
