use crate::dtos::course::StudentIdQuery;
use crate::dtos::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use database::entities::students;
use database::error::ServiceError;
use database::services::course::CourseService;

/// List all active students
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "Active students, ordered by name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn get_students(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<students::Model>>>, ApiError> {
    let students = CourseService::list_all_students(&state.db).await?;
    let count = students.len();
    Ok(Json(ApiResponse::list(students, count)))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn get_student_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<students::Model>>, ApiError> {
    fetch_student(&state, &id).await
}

/// Get a student profile, with the student id carried as a query parameter
#[utoipa::path(
    get,
    path = "/students/profile",
    params(StudentIdQuery),
    responses(
        (status = 200, description = "Student found"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn get_student_profile(
    State(state): State<AppState>,
    Query(query): Query<StudentIdQuery>,
) -> Result<Json<ApiResponse<students::Model>>, ApiError> {
    fetch_student(&state, &query.student_id).await
}

async fn fetch_student(
    state: &AppState,
    student_id: &str,
) -> Result<Json<ApiResponse<students::Model>>, ApiError> {
    let student = CourseService::get_student(&state.db, student_id)
        .await?
        .ok_or(ServiceError::StudentNotFound)?;
    Ok(Json(ApiResponse::ok(student)))
}
