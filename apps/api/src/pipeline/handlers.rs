//! Axum route handlers for the document generation API.
//!
//! Handlers are deliberately thin: parse the body, pick the pipeline, hand
//! back the PDF as a download. All failure handling lives in `AppError`.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::document::DocumentKind;
use crate::errors::AppError;
use crate::pipeline::generate_document;
use crate::state::AppState;

/// POST /api/v1/documents/resume
///
/// Body shape is defined by the resume template: `summary`,
/// `work_experience`, `projects`, `skills`. Missing fields render empty.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    respond_with_pdf(&state, DocumentKind::Resume, payload).await
}

/// POST /api/v1/documents/cover-letter
///
/// Body shape is defined by the cover letter template: `date`,
/// `company_name`, `body`.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    respond_with_pdf(&state, DocumentKind::CoverLetter, payload).await
}

async fn respond_with_pdf(
    state: &AppState,
    kind: DocumentKind,
    payload: Value,
) -> Result<Response, AppError> {
    let pdf = generate_document(state, kind, payload).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.download_filename()),
        ),
    ];
    Ok((headers, pdf).into_response())
}
