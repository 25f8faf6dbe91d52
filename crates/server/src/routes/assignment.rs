use crate::dtos::assignment::{
    AssignmentIdQuery, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::dtos::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;
use crate::utils::multipart::{from_fields, parse_upload};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use chrono::Utc;
use database::entities::assignments;
use database::error::ServiceError;
use database::services::assignment::AssignmentService;
use log::warn;
use sea_orm::prelude::Uuid;
use storage::{AttachmentKind, BlobStore, UploadLimits};

/// List all active assignments
#[utoipa::path(
    get,
    path = "/assignments",
    responses(
        (status = 200, description = "Active assignments, ordered by due date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn get_assignments(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<assignments::Model>>>, ApiError> {
    let assignments = AssignmentService::list_all(&state.db).await?;
    let count = assignments.len();
    Ok(Json(ApiResponse::list(assignments, count)))
}

/// Get an assignment by ID
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment found"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn get_assignment_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<assignments::Model>>, ApiError> {
    fetch_assignment(&state, id).await
}

/// Get an assignment, with the assignment id carried as a query parameter
#[utoipa::path(
    get,
    path = "/assignments/details",
    params(AssignmentIdQuery),
    responses(
        (status = 200, description = "Assignment found"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn get_assignment_details(
    State(state): State<AppState>,
    Query(query): Query<AssignmentIdQuery>,
) -> Result<Json<ApiResponse<assignments::Model>>, ApiError> {
    fetch_assignment(&state, query.assignment_id).await
}

/// List a course's assignments
#[utoipa::path(
    get,
    path = "/courses/{id}/assignments",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Active assignments for the course"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn get_course_assignments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<assignments::Model>>>, ApiError> {
    let assignments = AssignmentService::list_for_course(&state.db, id).await?;
    let count = assignments.len();
    Ok(Json(ApiResponse::list(assignments, count)))
}

/// List a course's assignments, with the course id carried as a query parameter
#[utoipa::path(
    get,
    path = "/assignments/course",
    params(crate::dtos::course::CourseIdQuery),
    responses(
        (status = 200, description = "Active assignments for the course"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn get_course_assignments_by_query(
    State(state): State<AppState>,
    Query(query): Query<crate::dtos::course::CourseIdQuery>,
) -> Result<Json<ApiResponse<Vec<assignments::Model>>>, ApiError> {
    let assignments = AssignmentService::list_for_course(&state.db, query.course_id).await?;
    let count = assignments.len();
    Ok(Json(ApiResponse::list(assignments, count)))
}

/// Create an assignment under a course
#[utoipa::path(
    post,
    path = "/courses/{id}/assignments",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created"),
        (status = 400, description = "Invalid assignment payload"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn create_for_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let attachments = body.attachments.clone();
    let assignment =
        AssignmentService::create(&state.db, body.into_input(id, attachments)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            assignment,
            "Assignment created successfully",
        )),
    ))
}

/// Create an assignment from a multipart form, uploading instructor files.
///
/// Files are stored before the assignment exists, so they land under a
/// temporary entity id inside the course's folder. If the create then
/// fails, the uploaded blobs are deleted best-effort.
#[utoipa::path(
    post,
    path = "/assignments/create",
    responses(
        (status = 201, description = "Assignment created"),
        (status = 400, description = "Invalid form or rejected upload"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let parsed = parse_upload(multipart, "attachments").await?;
    let body: CreateAssignmentRequest = from_fields(parsed.fields)?;
    let course_id = body
        .course_id
        .ok_or_else(|| ApiError::BadRequest("courseId is required".to_owned()))?;

    let folder = BlobStore::folder_path(
        AttachmentKind::Assignment,
        &course_id.to_string(),
        &format!("temp-{}", Utc::now().timestamp_millis()),
    );
    let uploads = state
        .blobs
        .upload_many(parsed.files, &folder, &UploadLimits::default())
        .await?;

    let mut attachments = body.attachments.clone();
    attachments.extend(uploads.iter().map(|u| u.upload_url.clone()));

    match AssignmentService::create(&state.db, body.into_input(course_id, attachments)).await {
        Ok(assignment) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok_with_message(
                assignment,
                "Assignment created successfully",
            )),
        )),
        Err(e) => {
            cleanup_uploads(&state.blobs, &uploads).await;
            Err(e.into())
        }
    }
}

/// Update an assignment
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAssignmentRequest>,
) -> Result<Json<ApiResponse<assignments::Model>>, ApiError> {
    let assignment = AssignmentService::update(&state.db, id, body.into()).await?;
    Ok(Json(ApiResponse::ok_with_message(
        assignment,
        "Assignment updated successfully",
    )))
}

/// Soft-delete an assignment
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments"
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    AssignmentService::delete(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Assignment deleted successfully")))
}

async fn fetch_assignment(
    state: &AppState,
    id: Uuid,
) -> Result<Json<ApiResponse<assignments::Model>>, ApiError> {
    let assignment = AssignmentService::get_by_id(&state.db, id)
        .await?
        .ok_or(ServiceError::AssignmentNotFound)?;
    Ok(Json(ApiResponse::ok(assignment)))
}

pub(crate) async fn cleanup_uploads(blobs: &BlobStore, uploads: &[storage::UploadResult]) {
    let blob_names: Vec<String> = uploads
        .iter()
        .filter_map(|u| u.blob_name(blobs.base_url()))
        .collect();
    if !blob_names.is_empty() {
        warn!("rolling back {} uploaded blob(s)", blob_names.len());
        blobs.delete_many(&blob_names).await;
    }
}
