use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Workflow state of a submission. Soft deletion is tracked separately via
/// the record's `isActive` flag and is orthogonal to this status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
    Returned,
    Resubmitted,
}

/// Metadata for one uploaded file attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAttachment {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub upload_url: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct SubmissionAttachments(pub Vec<SubmissionAttachment>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn submission_status_parses_all_variants() {
        for name in ["submitted", "graded", "returned", "resubmitted"] {
            assert_eq!(SubmissionStatus::from_str(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn attachment_list_serializes_as_json_array() {
        let list = SubmissionAttachments(vec![SubmissionAttachment {
            id: Uuid::new_v4(),
            filename: "abc.pdf".into(),
            original_filename: "essay.pdf".into(),
            file_size: 1024,
            mime_type: "application/pdf".into(),
            upload_url: "http://localhost:3000/files/submissions/abc.pdf".into(),
            uploaded_at: Utc::now(),
        }]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert!(json[0].get("originalFilename").is_some());
    }
}
