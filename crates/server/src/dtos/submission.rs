use models::submission::SubmissionStatus;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Text fields accompanying a multipart submission upload
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFields {
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub submission_text: Option<String>,
}

/// JSON-only submission variant carrying file contents as base64
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionJsonRequest {
    pub assignment_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub submission_text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Base64Attachment>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Base64Attachment {
    pub filename: String,
    pub mime_type: String,
    /// Base64-encoded file contents
    pub data: String,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub grade: i32,
    pub feedback: Option<String>,
    pub graded_by: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    #[schema(value_type = String)]
    pub status: SubmissionStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubmissionListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[param(value_type = Option<String>)]
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentSubmissionsQuery {
    pub course_id: Option<Uuid>,
}

/// Query half of a signed download URL
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileTokenQuery {
    pub expires: i64,
    pub sig: String,
}
