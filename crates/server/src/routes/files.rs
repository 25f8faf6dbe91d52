use crate::dtos::assignment::AttachmentUrlQuery;
use crate::dtos::response::ApiResponse;
use crate::dtos::submission::FileTokenQuery;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use database::error::ServiceError;
use database::services::assignment::AssignmentService;
use database::services::submission::SubmissionService;
use sea_orm::prelude::Uuid;
use serde_json::json;
use storage::store::content_type;

/// Mint a signed download URL for an instructor-provided assignment file
#[utoipa::path(
    get,
    path = "/assignments/{id}/attachments/url",
    params(("id" = Uuid, Path, description = "Assignment ID"), AttachmentUrlQuery),
    responses(
        (status = 200, description = "Signed URL minted"),
        (status = 404, description = "Assignment or attachment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Files"
)]
pub async fn assignment_attachment_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AttachmentUrlQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let assignment = AssignmentService::get_by_id(&state.db, id)
        .await?
        .ok_or(ServiceError::AssignmentNotFound)?;

    let blob_name = assignment
        .attachments
        .0
        .iter()
        .filter_map(|url| blob_name_from_url(state.blobs.base_url(), url))
        .find(|name| name.ends_with(&query.filename))
        .ok_or_else(|| ApiError::NotFound("Attachment not found".to_owned()))?;

    mint(&state, &blob_name)
}

/// Mint a signed download URL for a submission attachment
#[utoipa::path(
    get,
    path = "/submissions/{id}/attachments/{attachmentId}/url",
    params(
        ("id" = Uuid, Path, description = "Submission ID"),
        ("attachmentId" = Uuid, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Signed URL minted"),
        (status = 404, description = "Submission or attachment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Files"
)]
pub async fn submission_attachment_url(
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let submission = SubmissionService::get_submission_by_id(&state.db, id)
        .await?
        .ok_or(ServiceError::SubmissionNotFound)?;

    let attachment = submission
        .attachments
        .0
        .iter()
        .find(|a| a.id == attachment_id)
        .ok_or_else(|| ApiError::NotFound("Attachment not found".to_owned()))?;
    let blob_name = blob_name_from_url(state.blobs.base_url(), &attachment.upload_url)
        .ok_or_else(|| ApiError::NotFound("Attachment not found".to_owned()))?;

    mint(&state, &blob_name)
}

/// Serve a blob after verifying its signed, time-limited token
#[utoipa::path(
    get,
    path = "/files/{blob}",
    params(
        ("blob" = String, Path, description = "Blob name"),
        FileTokenQuery
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 403, description = "Signature invalid or link expired"),
        (status = 404, description = "File not found")
    ),
    tag = "Files"
)]
pub async fn serve_blob(
    State(state): State<AppState>,
    Path(blob): Path<String>,
    Query(query): Query<FileTokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .blobs
        .verify_download_token(&blob, query.expires, &query.sig)?;
    let bytes = state.blobs.read(&blob).await?;
    Ok(([(header::CONTENT_TYPE, content_type(&blob))], bytes))
}

fn mint(
    state: &AppState,
    blob_name: &str,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let download_url = state.blobs.generate_download_url(blob_name, None)?;
    Ok(Json(ApiResponse::ok(json!({
        "downloadUrl": download_url,
        "expiresInMinutes": 60,
    }))))
}

fn blob_name_from_url(base_url: &str, url: &str) -> Option<String> {
    url.strip_prefix(base_url)
        .map(|rest| rest.trim_start_matches('/').to_owned())
}
