use models::course::StringList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub instructions: Option<String>,
    pub due_date: DateTimeUtc,
    pub max_points: i32,
    pub assignment_type: String, // homework, quiz, exam, project, essay
    /// Soft-delete flag; deleted assignments are never physically removed
    pub is_active: bool,
    /// Instructor id
    pub created_by: String,
    /// Upload URLs of instructor-provided files
    #[sea_orm(column_type = "JsonBinary")]
    pub attachments: StringList,
    pub submission_format: String, // text, file, both
    /// Derived count of active submissions, refreshed best-effort
    pub submission_count: i32,
    pub allow_late_submissions: bool,
    pub allow_multiple_submissions: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
