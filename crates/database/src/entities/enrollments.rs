use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (course, student) pair. Uniqueness is enforced by a
/// lookup before insert rather than a database constraint.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub enrolled_at: DateTimeUtc,
    pub status: String, // enrolled, completed, dropped
    /// Completion percentage
    pub progress: i32,
    pub last_accessed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
