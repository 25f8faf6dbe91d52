use chrono::{DateTime, Utc};
use database::services::assignment::{CreateAssignment, UpdateAssignment};
use models::assignment::{AssignmentType, SubmissionFormat};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Body for assignment creation. `course_id` comes from the path on the
/// nested route and from the body on `/assignments/create`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub course_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub instructions: Option<String>,
    pub due_date: DateTime<Utc>,
    pub max_points: i32,
    #[schema(value_type = String)]
    pub assignment_type: AssignmentType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_by: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[schema(value_type = String)]
    pub submission_format: SubmissionFormat,
    #[serde(default)]
    pub allow_late_submissions: bool,
    #[serde(default)]
    pub allow_multiple_submissions: bool,
}

impl CreateAssignmentRequest {
    pub fn into_input(self, course_id: Uuid, attachments: Vec<String>) -> CreateAssignment {
        CreateAssignment {
            course_id,
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            due_date: self.due_date,
            max_points: self.max_points,
            assignment_type: self.assignment_type,
            is_active: self.is_active,
            created_by: self.created_by,
            attachments,
            submission_format: self.submission_format,
            allow_late_submissions: self.allow_late_submissions,
            allow_multiple_submissions: self.allow_multiple_submissions,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub max_points: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub assignment_type: Option<AssignmentType>,
    #[schema(value_type = Option<String>)]
    pub submission_format: Option<SubmissionFormat>,
    pub allow_late_submissions: Option<bool>,
    pub allow_multiple_submissions: Option<bool>,
    pub attachments: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl From<UpdateAssignmentRequest> for UpdateAssignment {
    fn from(r: UpdateAssignmentRequest) -> Self {
        UpdateAssignment {
            title: r.title,
            description: r.description,
            instructions: r.instructions,
            due_date: r.due_date,
            max_points: r.max_points,
            assignment_type: r.assignment_type,
            submission_format: r.submission_format,
            allow_late_submissions: r.allow_late_submissions,
            allow_multiple_submissions: r.allow_multiple_submissions,
            attachments: r.attachments,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssignmentIdQuery {
    pub assignment_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttachmentUrlQuery {
    pub filename: String,
}

fn default_true() -> bool {
    true
}
