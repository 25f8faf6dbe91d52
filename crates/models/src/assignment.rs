use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Homework,
    Quiz,
    Exam,
    Project,
    Essay,
}

/// Per-assignment policy for what a valid submission must contain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionFormat {
    /// Requires non-empty submission text
    Text,
    /// Requires at least one file attachment
    File,
    /// Requires at least one of text or files
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn assignment_type_parses_all_variants() {
        for name in ["homework", "quiz", "exam", "project", "essay"] {
            assert_eq!(AssignmentType::from_str(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn submission_format_rejects_unknown_values() {
        assert!(SubmissionFormat::from_str("audio").is_err());
        assert_eq!(
            SubmissionFormat::from_str("both").unwrap(),
            SubmissionFormat::Both
        );
    }
}
