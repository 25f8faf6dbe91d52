use models::course::{AssignmentReferences, EnrolledStudents, StringList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub category: String,
    pub level: String, // beginner, intermediate, advanced
    /// Course length in hours
    pub duration: i32,
    pub max_students: i32,
    /// Derived counter, kept equal to `enrolled_students.len()`
    pub current_enrollments: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub enrolled_students: EnrolledStudents,
    #[sea_orm(column_type = "JsonBinary")]
    pub assignments: AssignmentReferences,
    pub is_active: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: StringList,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub syllabus: Option<StringList>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub prerequisites: Option<StringList>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
