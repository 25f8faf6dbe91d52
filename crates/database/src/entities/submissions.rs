use models::submission::SubmissionAttachments;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assignment_id: Uuid,
    /// Copied from the assignment at creation time
    pub course_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub submission_text: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub attachments: SubmissionAttachments,
    pub submitted_at: DateTimeUtc,
    pub is_late: bool,
    pub status: String, // submitted, graded, returned, resubmitted
    /// 1-based sequence per (assignment, student)
    pub submission_number: i32,
    pub grade: Option<i32>,
    /// Snapshot of the assignment's max points at submission time
    pub max_points: i32,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTimeUtc>,
    pub graded_by: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
