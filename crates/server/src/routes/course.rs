use crate::dtos::course::{
    CourseIdQuery, CreateCourseRequest, EnrollmentByBodyRequest, EnrollmentRequest,
};
use crate::dtos::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use database::entities::{courses, enrollments};
use database::error::ServiceError;
use database::services::course::{CourseService, CreateCourse};
use sea_orm::prelude::Uuid;

/// List all active courses
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Active courses, newest first"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn get_courses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<courses::Model>>>, ApiError> {
    let courses = CourseService::list_active_courses(&state.db).await?;
    let count = courses.len();
    Ok(Json(ApiResponse::list(courses, count)))
}

/// Create a new course
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created"),
        (status = 400, description = "Invalid course payload"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = CourseService::create_course(
        &state.db,
        CreateCourse {
            title: body.title,
            description: body.description,
            instructor_id: body.instructor_id,
            instructor_name: body.instructor_name,
            category: body.category,
            level: body.level,
            duration: body.duration,
            max_students: body.max_students,
            is_active: body.is_active,
            tags: body.tags,
            syllabus: body.syllabus,
            prerequisites: body.prerequisites,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            course,
            "Course created successfully",
        )),
    ))
}

/// Get a specific course by ID
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn get_course_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<courses::Model>>, ApiError> {
    let course = CourseService::get_course(&state.db, id)
        .await?
        .ok_or(ServiceError::CourseNotFound)?;
    Ok(Json(ApiResponse::ok(course)))
}

/// Enroll a student in a course
#[utoipa::path(
    post,
    path = "/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = EnrollmentRequest,
    responses(
        (status = 201, description = "Enrollment created"),
        (status = 400, description = "Course full or student already enrolled"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EnrollmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = CourseService::enroll_student(
        &state.db,
        id,
        &body.student_id,
        &body.student_name,
        &body.student_email,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            enrollment,
            "Successfully enrolled in course",
        )),
    ))
}

/// Enroll a student, with the course id carried in the body
#[utoipa::path(
    post,
    path = "/courses/enroll",
    request_body = EnrollmentByBodyRequest,
    responses(
        (status = 201, description = "Enrollment created"),
        (status = 400, description = "Course full or student already enrolled"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn enroll_by_body(
    State(state): State<AppState>,
    Json(body): Json<EnrollmentByBodyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = CourseService::enroll_student(
        &state.db,
        body.course_id,
        &body.student_id,
        &body.student_name,
        &body.student_email,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            enrollment,
            "Successfully enrolled in course",
        )),
    ))
}

/// List students enrolled in a course
#[utoipa::path(
    get,
    path = "/courses/{id}/students",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrollment records for the course"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn get_enrolled_students(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<enrollments::Model>>>, ApiError> {
    list_students(&state, id).await
}

/// List enrolled students, with the course id carried as a query parameter
#[utoipa::path(
    get,
    path = "/courses/students",
    params(CourseIdQuery),
    responses(
        (status = 200, description = "Enrollment records for the course"),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn get_enrolled_students_by_query(
    State(state): State<AppState>,
    Query(query): Query<CourseIdQuery>,
) -> Result<Json<ApiResponse<Vec<enrollments::Model>>>, ApiError> {
    list_students(&state, query.course_id).await
}

async fn list_students(
    state: &AppState,
    course_id: Uuid,
) -> Result<Json<ApiResponse<Vec<enrollments::Model>>>, ApiError> {
    CourseService::get_course(&state.db, course_id)
        .await?
        .ok_or(ServiceError::CourseNotFound)?;
    let students = CourseService::list_enrolled_students(&state.db, course_id).await?;
    let count = students.len();
    Ok(Json(ApiResponse::list(students, count)))
}
