use crate::entities::{assignments, submissions};
use crate::error::ServiceError;
use crate::services::assignment::AssignmentService;
use crate::services::course::CourseService;
use chrono::{DateTime, Utc};
use log::warn;
use models::assignment::SubmissionFormat;
use models::submission::{SubmissionAttachment, SubmissionAttachments, SubmissionStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Input for [`SubmissionService::create_submission`]
pub struct CreateSubmission {
    pub assignment_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub submission_text: Option<String>,
    pub attachments: Vec<SubmissionAttachment>,
}

/// One page of an assignment's submissions; `total` counts all matches so
/// the caller can derive the page count.
pub struct SubmissionPage {
    pub submissions: Vec<submissions::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// A submission is late when it arrives strictly after the due date.
pub fn is_late(submitted_at: DateTime<Utc>, due_date: DateTime<Utc>) -> bool {
    submitted_at > due_date
}

/// Enforces the assignment's declared submission format.
pub fn validate_format(
    format: SubmissionFormat,
    submission_text: Option<&str>,
    attachment_count: usize,
) -> Result<(), ServiceError> {
    let has_text = submission_text.is_some_and(|t| !t.trim().is_empty());
    let has_files = attachment_count > 0;
    match format {
        SubmissionFormat::Text if !has_text => Err(ServiceError::TextRequired),
        SubmissionFormat::File if !has_files => Err(ServiceError::FileRequired),
        SubmissionFormat::Both if !has_text && !has_files => {
            Err(ServiceError::TextOrFileRequired)
        }
        _ => Ok(()),
    }
}

/// Next 1-based submission number for a student on an assignment, given the
/// highest existing number. Repeat submissions require the assignment to
/// allow them.
pub fn next_submission_number(
    last_number: Option<i32>,
    allow_multiple: bool,
) -> Result<i32, ServiceError> {
    match last_number {
        None => Ok(1),
        Some(_) if !allow_multiple => Err(ServiceError::MultipleSubmissionsNotAllowed),
        Some(last) => Ok(last + 1),
    }
}

pub struct SubmissionService;

impl SubmissionService {
    /// Validates and persists a new submission.
    ///
    /// Check order: assignment active, course exists, student enrolled
    /// (against the course's embedded roster), format contract, submission
    /// numbering / multiple-submission rule, late policy. The assignment's
    /// submission counter is refreshed best-effort afterwards.
    pub async fn create_submission(
        db: &DatabaseConnection,
        input: CreateSubmission,
    ) -> Result<submissions::Model, ServiceError> {
        let assignment = AssignmentService::get_by_id(db, input.assignment_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ServiceError::AssignmentNotFound)?;

        let course = CourseService::get_course(db, assignment.course_id)
            .await?
            .ok_or(ServiceError::CourseNotFound)?;
        if !course
            .enrolled_students
            .0
            .iter()
            .any(|s| s.student_id == input.student_id)
        {
            return Err(ServiceError::NotEnrolled);
        }

        let format = assignment
            .submission_format
            .parse::<SubmissionFormat>()
            .map_err(|_| {
                ServiceError::InvalidSubmissionFormat(assignment.submission_format.clone())
            })?;
        validate_format(
            format,
            input.submission_text.as_deref(),
            input.attachments.len(),
        )?;

        let last = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(input.assignment_id))
            .filter(submissions::Column::StudentId.eq(input.student_id.as_str()))
            .filter(submissions::Column::IsActive.eq(true))
            .order_by_desc(submissions::Column::SubmissionNumber)
            .one(db)
            .await?;
        let submission_number = next_submission_number(
            last.map(|s| s.submission_number),
            assignment.allow_multiple_submissions,
        )?;

        let now = Utc::now();
        let late = is_late(now, assignment.due_date);
        if late && !assignment.allow_late_submissions {
            return Err(ServiceError::LateSubmissionNotAllowed);
        }

        let submission = submissions::Model {
            id: Uuid::new_v4(),
            assignment_id: assignment.id,
            course_id: assignment.course_id,
            student_id: input.student_id,
            student_name: input.student_name,
            student_email: input.student_email,
            submission_text: input.submission_text,
            attachments: SubmissionAttachments(input.attachments),
            submitted_at: now,
            is_late: late,
            status: SubmissionStatus::Submitted.to_string(),
            submission_number,
            grade: None,
            max_points: assignment.max_points,
            feedback: None,
            graded_at: None,
            graded_by: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        submissions::Entity::insert(submission.clone().into_active_model().reset_all())
            .exec_without_returning(db)
            .await?;

        Self::refresh_count(db, assignment.id).await;

        Ok(submission)
    }

    /// Paginated active submissions for an assignment, newest first,
    /// optionally filtered by status.
    pub async fn get_assignment_submissions(
        db: &DatabaseConnection,
        assignment_id: Uuid,
        page: u64,
        limit: u64,
        status: Option<SubmissionStatus>,
    ) -> Result<SubmissionPage, ServiceError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let mut query = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .filter(submissions::Column::IsActive.eq(true));
        if let Some(status) = status {
            query = query.filter(submissions::Column::Status.eq(status.to_string()));
        }
        let query = query.order_by_desc(submissions::Column::SubmittedAt);

        let total = query.clone().count(db).await?;
        let submissions = query.paginate(db, limit).fetch_page(page - 1).await?;

        Ok(SubmissionPage {
            submissions,
            total,
            page,
            limit,
        })
    }

    /// Lookup by id alone, active submissions only
    pub async fn get_submission_by_id(
        db: &DatabaseConnection,
        submission_id: Uuid,
    ) -> Result<Option<submissions::Model>, ServiceError> {
        Ok(submissions::Entity::find()
            .filter(submissions::Column::Id.eq(submission_id))
            .filter(submissions::Column::IsActive.eq(true))
            .one(db)
            .await?)
    }

    /// Active submissions for a student, optionally scoped to a course,
    /// newest first.
    pub async fn get_student_submissions(
        db: &DatabaseConnection,
        student_id: &str,
        course_id: Option<Uuid>,
    ) -> Result<Vec<submissions::Model>, ServiceError> {
        let mut query = submissions::Entity::find()
            .filter(submissions::Column::StudentId.eq(student_id))
            .filter(submissions::Column::IsActive.eq(true));
        if let Some(course_id) = course_id {
            query = query.filter(submissions::Column::CourseId.eq(course_id));
        }
        Ok(query
            .order_by_desc(submissions::Column::SubmittedAt)
            .all(db)
            .await?)
    }

    /// Records a grade against the max-points snapshot taken at submission
    /// time, and moves the submission to `graded`.
    pub async fn grade_submission(
        db: &DatabaseConnection,
        submission_id: Uuid,
        grade: i32,
        feedback: Option<String>,
        graded_by: String,
    ) -> Result<submissions::Model, ServiceError> {
        let submission = Self::get_submission_by_id(db, submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound)?;

        if grade < 0 || grade > submission.max_points {
            return Err(ServiceError::GradeOutOfRange {
                max_points: submission.max_points,
            });
        }

        let now = Utc::now();
        let updated = submissions::ActiveModel {
            id: Set(submission.id),
            grade: Set(Some(grade)),
            feedback: Set(feedback),
            graded_at: Set(Some(now)),
            graded_by: Set(Some(graded_by)),
            status: Set(SubmissionStatus::Graded.to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(updated)
    }

    /// Replaces the workflow status. Any listed status is accepted from any
    /// current state; transition legality is deliberately not enforced.
    pub async fn update_status(
        db: &DatabaseConnection,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> Result<submissions::Model, ServiceError> {
        let submission = Self::get_submission_by_id(db, submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound)?;

        let updated = submissions::ActiveModel {
            id: Set(submission.id),
            status: Set(status.to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(updated)
    }

    /// Soft delete; the submission disappears from listings and the
    /// assignment's counter is refreshed best-effort.
    pub async fn delete_submission(
        db: &DatabaseConnection,
        submission_id: Uuid,
    ) -> Result<(), ServiceError> {
        let submission = Self::get_submission_by_id(db, submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound)?;

        submissions::ActiveModel {
            id: Set(submission.id),
            is_active: Set(false),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await?;

        Self::refresh_count(db, submission.assignment_id).await;
        Ok(())
    }

    async fn refresh_count(db: &DatabaseConnection, assignment_id: Uuid) {
        let count = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .filter(submissions::Column::IsActive.eq(true))
            .count(db)
            .await;
        match count {
            Ok(count) => {
                AssignmentService::refresh_submission_count(db, assignment_id, count).await
            }
            Err(e) => warn!("failed to count submissions for assignment {assignment_id}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::courses;
    use chrono::TimeZone;
    use models::course::{
        AssignmentReferences, EnrolledStudent, EnrolledStudents, StringList,
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    fn due_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    fn sample_assignment(
        format: &str,
        allow_late: bool,
        allow_multiple: bool,
        due: DateTime<Utc>,
    ) -> assignments::Model {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assignments::Model {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: "HW 1".into(),
            description: "Prove it".into(),
            instructions: None,
            due_date: due,
            max_points: 100,
            assignment_type: "homework".into(),
            is_active: true,
            created_by: "instr-1".into(),
            attachments: StringList::default(),
            submission_format: format.into(),
            submission_count: 0,
            allow_late_submissions: allow_late,
            allow_multiple_submissions: allow_multiple,
            created_at: t,
            updated_at: t,
        }
    }

    fn course_with_student(course_id: Uuid, student_id: &str) -> courses::Model {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        courses::Model {
            id: course_id,
            title: "Systems Programming".into(),
            description: "Bits and bytes".into(),
            instructor_id: "instr-1".into(),
            instructor_name: "Prof. Stone".into(),
            category: "cs".into(),
            level: "intermediate".into(),
            duration: 40,
            max_students: 30,
            current_enrollments: 1,
            enrolled_students: EnrolledStudents(vec![EnrolledStudent {
                student_id: student_id.into(),
                student_name: "Ada".into(),
                enrolled_at: t,
            }]),
            assignments: AssignmentReferences::default(),
            is_active: true,
            tags: StringList::default(),
            syllabus: None,
            prerequisites: None,
            created_at: t,
            updated_at: t,
        }
    }

    fn sample_submission(assignment: &assignments::Model, number: i32) -> submissions::Model {
        let t = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        submissions::Model {
            id: Uuid::new_v4(),
            assignment_id: assignment.id,
            course_id: assignment.course_id,
            student_id: "uid".into(),
            student_name: "Ada".into(),
            student_email: "a@x.io".into(),
            submission_text: Some("answer".into()),
            attachments: SubmissionAttachments::default(),
            submitted_at: t,
            is_late: false,
            status: "submitted".into(),
            submission_number: number,
            grade: None,
            max_points: assignment.max_points,
            feedback: None,
            graded_at: None,
            graded_by: None,
            is_active: true,
            created_at: t,
            updated_at: t,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }

    fn input(assignment_id: Uuid, text: Option<&str>) -> CreateSubmission {
        CreateSubmission {
            assignment_id,
            student_id: "uid".into(),
            student_name: "Ada".into(),
            student_email: "a@x.io".into(),
            submission_text: text.map(Into::into),
            attachments: vec![],
        }
    }

    #[test]
    fn late_iff_strictly_after_due_date() {
        let due = due_date();
        let just_late = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 1).unwrap();
        let just_in_time = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        assert!(is_late(just_late, due));
        assert!(!is_late(just_in_time, due));
        assert!(!is_late(due, due));
    }

    #[test]
    fn format_contract_covers_all_three_modes() {
        use SubmissionFormat::*;
        assert!(matches!(
            validate_format(Text, None, 0),
            Err(ServiceError::TextRequired)
        ));
        assert!(matches!(
            validate_format(Text, Some("   "), 3),
            Err(ServiceError::TextRequired)
        ));
        assert!(validate_format(Text, Some("answer"), 0).is_ok());
        assert!(matches!(
            validate_format(File, Some("answer"), 0),
            Err(ServiceError::FileRequired)
        ));
        assert!(validate_format(File, None, 1).is_ok());
        assert!(matches!(
            validate_format(Both, None, 0),
            Err(ServiceError::TextOrFileRequired)
        ));
        assert!(validate_format(Both, Some("answer"), 0).is_ok());
        assert!(validate_format(Both, None, 1).is_ok());
    }

    #[test]
    fn submission_numbers_are_sequential_when_allowed() {
        assert_eq!(next_submission_number(None, false).unwrap(), 1);
        assert_eq!(next_submission_number(Some(1), true).unwrap(), 2);
        assert!(matches!(
            next_submission_number(Some(1), false),
            Err(ServiceError::MultipleSubmissionsNotAllowed)
        ));
    }

    #[tokio::test]
    async fn create_rejects_unenrolled_student() {
        let assignment = sample_assignment("text", true, true, due_date());
        let assignment_id = assignment.id;
        let course = course_with_student(assignment.course_id, "someone-else");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment]])
            .append_query_results([vec![course]])
            .into_connection();

        let err = SubmissionService::create_submission(&db, input(assignment_id, Some("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotEnrolled));
    }

    #[tokio::test]
    async fn create_rejects_empty_text_for_text_assignments() {
        let assignment = sample_assignment("text", true, true, due_date());
        let assignment_id = assignment.id;
        let course = course_with_student(assignment.course_id, "uid");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment]])
            .append_query_results([vec![course]])
            .into_connection();

        let err = SubmissionService::create_submission(&db, input(assignment_id, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TextRequired));
    }

    #[tokio::test]
    async fn create_rejects_second_submission_when_multiple_disallowed() {
        let far_future = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
        let assignment = sample_assignment("text", true, false, far_future);
        let assignment_id = assignment.id;
        let course = course_with_student(assignment.course_id, "uid");
        let prior = sample_submission(&assignment, 1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment]])
            .append_query_results([vec![course]])
            .append_query_results([vec![prior]])
            .into_connection();

        let err = SubmissionService::create_submission(&db, input(assignment_id, Some("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MultipleSubmissionsNotAllowed));
    }

    #[tokio::test]
    async fn create_rejects_late_submission_when_disallowed() {
        // due date in the past, late submissions off
        let assignment = sample_assignment("text", false, true, due_date());
        let assignment_id = assignment.id;
        let course = course_with_student(assignment.course_id, "uid");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment]])
            .append_query_results([vec![course]])
            .append_query_results([Vec::<submissions::Model>::new()])
            .into_connection();

        let err = SubmissionService::create_submission(&db, input(assignment_id, Some("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LateSubmissionNotAllowed));
    }

    #[tokio::test]
    async fn first_submission_gets_number_one_and_snapshots_max_points() {
        let far_future = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
        let assignment = sample_assignment("text", false, false, far_future);
        let assignment_id = assignment.id;
        let course = course_with_student(assignment.course_id, "uid");
        let refreshed = {
            let mut a = assignment.clone();
            a.submission_count = 1;
            a
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment]])
            .append_query_results([vec![course]])
            .append_query_results([Vec::<submissions::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // best-effort counter refresh: count + assignment update
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![refreshed]])
            .into_connection();

        let submission =
            SubmissionService::create_submission(&db, input(assignment_id, Some("answer")))
                .await
                .unwrap();
        assert_eq!(submission.submission_number, 1);
        assert_eq!(submission.max_points, 100);
        assert_eq!(submission.status, "submitted");
        assert!(!submission.is_late);
        assert!(submission.is_active);
    }

    #[tokio::test]
    async fn grading_rejects_out_of_range_grades() {
        let assignment = sample_assignment("text", true, true, due_date());
        let submission = sample_submission(&assignment, 1);
        let submission_id = submission.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![submission]])
            .into_connection();

        let err = SubmissionService::grade_submission(
            &db,
            submission_id,
            101,
            None,
            "instr-1".into(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::GradeOutOfRange { max_points: 100 }
        ));
    }

    #[tokio::test]
    async fn grading_with_full_marks_succeeds_and_sets_status() {
        let assignment = sample_assignment("text", true, true, due_date());
        let submission = sample_submission(&assignment, 1);
        let submission_id = submission.id;
        let mut graded = submission.clone();
        graded.grade = Some(100);
        graded.status = "graded".into();
        graded.graded_by = Some("instr-1".into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![submission]])
            .append_query_results([vec![graded]])
            .into_connection();

        let updated = SubmissionService::grade_submission(
            &db,
            submission_id,
            100,
            Some("perfect".into()),
            "instr-1".into(),
        )
        .await
        .unwrap();
        assert_eq!(updated.grade, Some(100));
        assert_eq!(updated.status, "graded");
    }

    #[tokio::test]
    async fn delete_soft_deletes_and_refreshes_the_counter() {
        let assignment = sample_assignment("text", true, true, due_date());
        let submission = sample_submission(&assignment, 1);
        let submission_id = submission.id;
        let mut inactive = submission.clone();
        inactive.is_active = false;
        let refreshed = {
            let mut a = assignment.clone();
            a.submission_count = 0;
            a
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![submission]])
            .append_query_results([vec![inactive]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([vec![refreshed]])
            .into_connection();

        SubmissionService::delete_submission(&db, submission_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_submission_cannot_be_deleted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<submissions::Model>::new()])
            .into_connection();

        let err = SubmissionService::delete_submission(&db, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SubmissionNotFound));
    }
}
