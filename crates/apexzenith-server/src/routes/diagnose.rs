//! Diagnose route: accept a problem description and an optional attachment,
//! run the diagnose flow, and report the outcome.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use apexzenith::diagnosis::{diagnose, Attachment, DiagnosisRecord};

use crate::routes::errors::ErrorResponse;
use crate::routes::session::session_id_from_headers;
use crate::state::AppState;

// Constants
pub(crate) const MAX_ATTACHMENT_BYTES: usize = 25 * 1024 * 1024; // 25MB

/// Response for the diagnose endpoint
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseResponse {
    /// Session the record was appended to
    pub session_id: String,
    /// The stamped record: timestamp, input, and tagged outcome
    pub record: DiagnosisRecord,
    /// Head rows of the attachment when a line-delimited JSON file was
    /// supplied and parsed cleanly
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub preview: Option<Vec<Value>>,
}

/// Submit a diagnosis request
///
/// # Request
/// - Content-Type: multipart/form-data
/// - `text`: free-form problem description (may be empty)
/// - `file`: optional attachment; extension must be txt, json, jsonl, png or jpg
///
/// # Response
/// - `record`: the stamped record, also appended to the session history and
///   the durable log
/// - `preview`: head rows of a cleanly parsed `.jsonl` attachment
///
/// # Errors
/// - 400: Bad Request (invalid form data or a disallowed attachment type)
/// - 413: Payload Too Large (attachment exceeds 25MB)
/// - 500: Internal Server Error (durable log rejected the record)
#[utoipa::path(
    post,
    path = "/diagnose",
    responses(
        (status = 200, description = "Diagnosis recorded", body = DiagnoseResponse),
        (status = 400, description = "Invalid form data or disallowed attachment type"),
        (status = 413, description = "Attachment too large (max 25MB)"),
        (status = 500, description = "Failed to persist the record")
    )
)]
pub async fn submit_diagnosis(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<DiagnoseResponse>, ErrorResponse> {
    let mut text = String::new();
    let mut attachment: Option<Attachment> = None;

    // MultipartError carries its own status: reads that blow the transport
    // body limit come back as 413, everything else as 400.
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {:?}", e);
        ErrorResponse {
            message: format!("Failed to read form data: {}", e),
            status: e.status(),
        }
    })? {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("text") => {
                text = field.text().await.map_err(|e| {
                    tracing::error!("Failed to read text field: {:?}", e);
                    ErrorResponse {
                        message: format!("Failed to read text field: {}", e),
                        status: e.status(),
                    }
                })?;
            }
            Some("file") => {
                if attachment.is_some() {
                    return Err(ErrorResponse::bad_request(
                        "Only one attachment per submission",
                    ));
                }

                let name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let data = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read attachment data: {:?}", e);
                    ErrorResponse {
                        message: format!("Failed to read attachment data: {}", e),
                        status: e.status(),
                    }
                })?;

                if data.len() > MAX_ATTACHMENT_BYTES {
                    return Err(ErrorResponse {
                        message: format!(
                            "Attachment '{}' is too large ({:.1}MB). Maximum size is {}MB.",
                            name,
                            data.len() as f64 / (1024.0 * 1024.0),
                            MAX_ATTACHMENT_BYTES / (1024 * 1024)
                        ),
                        status: StatusCode::PAYLOAD_TOO_LARGE,
                    });
                }

                let file = Attachment::new(name, data.to_vec());
                if !file.is_allowed() {
                    return Err(ErrorResponse::bad_request(format!(
                        "Unsupported attachment type: '{}'. Allowed: txt, json, jsonl, png, jpg.",
                        file.name
                    )));
                }

                // Empty files pass through: an empty .jsonl is a read
                // failure, which is an outcome rather than a rejection.
                attachment = Some(file);
            }
            _ => continue,
        }
    }

    let session_id = state
        .sessions
        .ensure(session_id_from_headers(&headers).as_deref());

    // The analysis pause the dashboard spinner waits on. Pacing only.
    let delay = state.config.analysis_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let report = diagnose(
        &text,
        attachment.as_ref(),
        &state.store,
        &state.sessions,
        &session_id,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to persist diagnosis record: {:?}", e);
        ErrorResponse::internal(format!("Failed to persist diagnosis record: {}", e))
    })?;

    tracing::info!(
        "Recorded {} for session {} ({} bytes of input)",
        report.record.outcome.kind(),
        session_id,
        text.len()
    );

    Ok(Json(DiagnoseResponse {
        session_id,
        record: report.record,
        preview: report.preview,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/diagnose", post(submit_diagnosis))
}
