use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Created lazily on first enrollment; keyed by the external user identity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Stored as raw JSON: current records hold a list of
    /// `{courseId, courseName, enrolledAt}` objects, but legacy records
    /// hold bare course-id strings and are migrated in place on read.
    #[sea_orm(column_type = "JsonBinary")]
    pub enrolled_courses: Json,
    pub is_active: bool,
    pub academic_level: Option<String>,
    pub major: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
