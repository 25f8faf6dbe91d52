use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

/// Entry in a student's embedded list of enrolled courses.
///
/// A legacy representation stored this list as bare course-id strings;
/// readers detect that shape and migrate it in place (see the course
/// directory service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub course_id: Uuid,
    pub course_name: String,
    pub enrolled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn enrollment_status_round_trips() {
        for name in ["enrolled", "completed", "dropped"] {
            assert_eq!(EnrollmentStatus::from_str(name).unwrap().to_string(), name);
        }
    }
}
