use models::course::CourseLevel;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub category: String,
    #[schema(value_type = String)]
    pub level: CourseLevel,
    pub duration: i32,
    pub max_students: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub syllabus: Option<Vec<String>>,
    pub prerequisites: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
}

/// Flat body for the path-parameter-free enroll variant
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentByBodyRequest {
    pub course_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseIdQuery {
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentIdQuery {
    pub student_id: String,
}

fn default_true() -> bool {
    true
}
