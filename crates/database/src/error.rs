use sea_orm::DbErr;

/// Business-rule and lookup failures raised by the domain services.
///
/// Variants are split along the HTTP classification the server applies:
/// the `*NotFound` variants map to 404, the rule violations to 400, and
/// wrapped database errors to a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Assignment not found")]
    AssignmentNotFound,
    #[error("Submission not found")]
    SubmissionNotFound,
    #[error("Student not found")]
    StudentNotFound,
    #[error("Course is full")]
    CourseFull,
    #[error("Student already enrolled in this course")]
    AlreadyEnrolled,
    #[error("Student not enrolled in this course")]
    NotEnrolled,
    #[error("Text submission is required for this assignment")]
    TextRequired,
    #[error("File submission is required for this assignment")]
    FileRequired,
    #[error("Either text or file submission is required for this assignment")]
    TextOrFileRequired,
    #[error("Invalid submission format specified in assignment: {0}")]
    InvalidSubmissionFormat(String),
    #[error("Multiple submissions are not allowed for this assignment")]
    MultipleSubmissionsNotAllowed,
    #[error("Late submissions are not allowed for this assignment")]
    LateSubmissionNotAllowed,
    #[error("Grade must be between 0 and {max_points}")]
    GradeOutOfRange { max_points: i32 },
    #[error("Assignment is not referenced by this course")]
    AssignmentRefNotFound,
    #[error("Assignment is already referenced by this course")]
    AssignmentRefDuplicate,
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CourseNotFound
                | Self::AssignmentNotFound
                | Self::SubmissionNotFound
                | Self::StudentNotFound
        )
    }

    /// Unexpected backend errors, surfaced to callers without detail.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Db(_) | Self::Json(_))
    }
}
