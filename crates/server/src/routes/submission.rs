use crate::dtos::response::{ApiResponse, PaginationMeta};
use crate::dtos::submission::{
    CreateSubmissionJsonRequest, GradeRequest, StatusRequest, StudentSubmissionsQuery,
    SubmissionListQuery, SubmitFields,
};
use crate::error::ApiError;
use crate::routes::assignment::cleanup_uploads;
use crate::state::AppState;
use crate::utils::multipart::{from_fields, parse_upload};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use database::entities::submissions;
use database::error::ServiceError;
use database::services::assignment::AssignmentService;
use database::services::submission::{CreateSubmission, SubmissionService};
use models::submission::SubmissionAttachment;
use sea_orm::prelude::Uuid;
use storage::{AttachmentKind, BlobStore, IncomingFile, UploadLimits, UploadResult};

/// Submit work for an assignment from a multipart form.
///
/// Files are uploaded first under a temporary entity id; if the submission
/// is then rejected the blobs are deleted best-effort.
#[utoipa::path(
    post,
    path = "/assignments/{id}/submit",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 201, description = "Submission recorded"),
        (status = 400, description = "Submission rules violated or upload rejected"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn submit_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let parsed = parse_upload(multipart, "attachments").await?;
    let fields: SubmitFields = from_fields(parsed.fields)?;
    create_with_files(&state, id, fields, parsed.files).await
}

/// Submit work as a single JSON document, files carried as base64
#[utoipa::path(
    post,
    path = "/submissions/create",
    request_body = CreateSubmissionJsonRequest,
    responses(
        (status = 201, description = "Submission recorded"),
        (status = 400, description = "Submission rules violated or upload rejected"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn create_submission_json(
    State(state): State<AppState>,
    Json(body): Json<CreateSubmissionJsonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut files = Vec::with_capacity(body.attachments.len());
    for attachment in body.attachments {
        let bytes = BASE64.decode(attachment.data.as_bytes()).map_err(|_| {
            ApiError::BadRequest(format!(
                "Attachment '{}' is not valid base64",
                attachment.filename
            ))
        })?;
        files.push(IncomingFile {
            original_filename: attachment.filename,
            mime_type: attachment.mime_type,
            bytes,
        });
    }

    let fields = SubmitFields {
        student_id: body.student_id,
        student_name: body.student_name,
        student_email: body.student_email,
        submission_text: body.submission_text,
    };
    create_with_files(&state, body.assignment_id, fields, files).await
}

/// List an assignment's submissions, paginated
#[utoipa::path(
    get,
    path = "/assignments/{id}/submissions",
    params(("id" = Uuid, Path, description = "Assignment ID"), SubmissionListQuery),
    responses(
        (status = 200, description = "One page of submissions, newest first"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn get_assignment_submissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<ApiResponse<Vec<submissions::Model>>>, ApiError> {
    let page = SubmissionService::get_assignment_submissions(
        &state.db,
        id,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(50),
        query.status,
    )
    .await?;

    let pagination = PaginationMeta {
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total.div_ceil(page.limit),
    };
    Ok(Json(ApiResponse::paginated(page.submissions, pagination)))
}

/// Get a submission by ID
#[utoipa::path(
    get,
    path = "/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission found"),
        (status = 404, description = "Submission not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn get_submission_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<submissions::Model>>, ApiError> {
    let submission = SubmissionService::get_submission_by_id(&state.db, id)
        .await?
        .ok_or(ServiceError::SubmissionNotFound)?;
    Ok(Json(ApiResponse::ok(submission)))
}

/// List a student's submissions, optionally scoped to a course
#[utoipa::path(
    get,
    path = "/submissions/student/{studentId}",
    params(
        ("studentId" = String, Path, description = "Student ID"),
        StudentSubmissionsQuery
    ),
    responses(
        (status = 200, description = "The student's active submissions, newest first"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn get_student_submissions(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Query(query): Query<StudentSubmissionsQuery>,
) -> Result<Json<ApiResponse<Vec<submissions::Model>>>, ApiError> {
    let submissions =
        SubmissionService::get_student_submissions(&state.db, &student_id, query.course_id)
            .await?;
    let count = submissions.len();
    Ok(Json(ApiResponse::list(submissions, count)))
}

/// Grade a submission
#[utoipa::path(
    post,
    path = "/submissions/{id}/grade",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Submission graded"),
        (status = 400, description = "Grade outside the 0..=maxPoints range"),
        (status = 404, description = "Submission not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn grade_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GradeRequest>,
) -> Result<Json<ApiResponse<submissions::Model>>, ApiError> {
    let submission = SubmissionService::grade_submission(
        &state.db,
        id,
        body.grade,
        body.feedback,
        body.graded_by,
    )
    .await?;
    Ok(Json(ApiResponse::ok_with_message(
        submission,
        "Submission graded successfully",
    )))
}

/// Replace a submission's workflow status
#[utoipa::path(
    put,
    path = "/submissions/{id}/status",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Submission not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn update_submission_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<ApiResponse<submissions::Model>>, ApiError> {
    let submission = SubmissionService::update_status(&state.db, id, body.status).await?;
    Ok(Json(ApiResponse::ok_with_message(
        submission,
        "Submission status updated successfully",
    )))
}

/// Soft-delete a submission
#[utoipa::path(
    delete,
    path = "/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission deleted"),
        (status = 404, description = "Submission not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Submissions"
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    SubmissionService::delete_submission(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Submission deleted successfully")))
}

async fn create_with_files(
    state: &AppState,
    assignment_id: Uuid,
    fields: SubmitFields,
    files: Vec<IncomingFile>,
) -> Result<(StatusCode, Json<ApiResponse<submissions::Model>>), ApiError> {
    // the assignment is fetched up front so the upload folder can carry the
    // owning course id; the service re-checks it when creating the row
    let assignment = AssignmentService::get_by_id(&state.db, assignment_id)
        .await?
        .ok_or(ServiceError::AssignmentNotFound)?;

    let folder = BlobStore::folder_path(
        AttachmentKind::Submission,
        &assignment.course_id.to_string(),
        &format!("temp-{}", chrono::Utc::now().timestamp_millis()),
    );
    let uploads = state
        .blobs
        .upload_many(files, &folder, &UploadLimits::default())
        .await?;

    let input = CreateSubmission {
        assignment_id,
        student_id: fields.student_id,
        student_name: fields.student_name,
        student_email: fields.student_email,
        submission_text: fields.submission_text,
        attachments: uploads.iter().cloned().map(into_attachment).collect(),
    };

    match SubmissionService::create_submission(&state.db, input).await {
        Ok(submission) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok_with_message(
                submission,
                "Submission created successfully",
            )),
        )),
        Err(e) => {
            cleanup_uploads(&state.blobs, &uploads).await;
            Err(e.into())
        }
    }
}

fn into_attachment(upload: UploadResult) -> SubmissionAttachment {
    SubmissionAttachment {
        id: upload.id,
        filename: upload.filename,
        original_filename: upload.original_filename,
        file_size: upload.file_size,
        mime_type: upload.mime_type,
        upload_url: upload.upload_url,
        uploaded_at: upload.uploaded_at,
    }
}
