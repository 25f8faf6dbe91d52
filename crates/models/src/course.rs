use crate::assignment::AssignmentType;
use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Difficulty level advertised on a course
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Denormalized entry in a course's embedded roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledStudent {
    pub student_id: String,
    pub student_name: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct EnrolledStudents(pub Vec<EnrolledStudent>);

/// Denormalized copy of an assignment's headline fields, embedded in the
/// owning course for fast reads. Kept in sync by best-effort secondary
/// writes whenever the assignment is created, updated, or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReference {
    pub assignment_id: Uuid,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub assignment_type: AssignmentType,
    pub max_points: i32,
}

#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct AssignmentReferences(pub Vec<AssignmentReference>);

/// JSON-column wrapper for plain string lists (tags, syllabus entries,
/// prerequisite descriptions, attachment URLs).
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct StringList(pub Vec<String>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn course_level_round_trips_through_strings() {
        assert_eq!(CourseLevel::Beginner.to_string(), "beginner");
        assert_eq!(
            CourseLevel::from_str("advanced").unwrap(),
            CourseLevel::Advanced
        );
        assert!(CourseLevel::from_str("expert").is_err());
    }

    #[test]
    fn enrolled_student_uses_camel_case_keys() {
        let entry = EnrolledStudent {
            student_id: "uid-1".into(),
            student_name: "Ada".into(),
            enrolled_at: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("studentId").is_some());
        assert!(json.get("enrolledAt").is_some());
    }
}
