use crate::entities::assignments;
use crate::error::ServiceError;
use crate::services::course::CourseService;
use chrono::{DateTime, Utc};
use log::warn;
use models::assignment::{AssignmentType, SubmissionFormat};
use models::course::{AssignmentReference, StringList};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Input for [`AssignmentService::create`]
pub struct CreateAssignment {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub instructions: Option<String>,
    pub due_date: DateTime<Utc>,
    pub max_points: i32,
    pub assignment_type: AssignmentType,
    pub is_active: bool,
    pub created_by: String,
    pub attachments: Vec<String>,
    pub submission_format: SubmissionFormat,
    pub allow_late_submissions: bool,
    pub allow_multiple_submissions: bool,
}

/// Partial update for [`AssignmentService::update`]; `None` leaves the
/// stored value untouched.
#[derive(Default)]
pub struct UpdateAssignment {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub max_points: Option<i32>,
    pub assignment_type: Option<AssignmentType>,
    pub submission_format: Option<SubmissionFormat>,
    pub allow_late_submissions: Option<bool>,
    pub allow_multiple_submissions: Option<bool>,
    pub attachments: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

pub struct AssignmentService;

impl AssignmentService {
    /// Active assignments for a course, ordered by due date
    pub async fn list_for_course(
        db: &DatabaseConnection,
        course_id: Uuid,
    ) -> Result<Vec<assignments::Model>, ServiceError> {
        Ok(assignments::Entity::find()
            .filter(assignments::Column::CourseId.eq(course_id))
            .filter(assignments::Column::IsActive.eq(true))
            .order_by_asc(assignments::Column::DueDate)
            .all(db)
            .await?)
    }

    /// Lookup by id alone, with no owning-course hint
    pub async fn get_by_id(
        db: &DatabaseConnection,
        assignment_id: Uuid,
    ) -> Result<Option<assignments::Model>, ServiceError> {
        Ok(assignments::Entity::find_by_id(assignment_id).one(db).await?)
    }

    /// Creates an assignment after verifying the owning course exists, then
    /// pushes the denormalized reference into the course. The reference push
    /// is best-effort: the assignment has already been persisted and is not
    /// rolled back if the course update fails.
    pub async fn create(
        db: &DatabaseConnection,
        input: CreateAssignment,
    ) -> Result<assignments::Model, ServiceError> {
        CourseService::get_course(db, input.course_id)
            .await?
            .ok_or(ServiceError::CourseNotFound)?;

        let now = Utc::now();
        let assignment = assignments::Model {
            id: Uuid::new_v4(),
            course_id: input.course_id,
            title: input.title,
            description: input.description,
            instructions: input.instructions,
            due_date: input.due_date,
            max_points: input.max_points,
            assignment_type: input.assignment_type.to_string(),
            is_active: input.is_active,
            created_by: input.created_by,
            attachments: StringList(input.attachments),
            submission_format: input.submission_format.to_string(),
            submission_count: 0,
            allow_late_submissions: input.allow_late_submissions,
            allow_multiple_submissions: input.allow_multiple_submissions,
            created_at: now,
            updated_at: now,
        };
        assignments::Entity::insert(assignment.clone().into_active_model().reset_all())
            .exec_without_returning(db)
            .await?;

        let reference = AssignmentReference {
            assignment_id: assignment.id,
            title: assignment.title.clone(),
            due_date: assignment.due_date,
            assignment_type: input.assignment_type,
            max_points: assignment.max_points,
        };
        if let Err(e) = CourseService::add_assignment_ref(db, assignment.course_id, reference).await
        {
            warn!(
                "failed to sync assignment reference {} into course {}: {e}",
                assignment.id, assignment.course_id
            );
        }

        Ok(assignment)
    }

    /// Merges the partial update and re-syncs the embedded course reference
    /// when any of the denormalized fields changed.
    pub async fn update(
        db: &DatabaseConnection,
        assignment_id: Uuid,
        update: UpdateAssignment,
    ) -> Result<assignments::Model, ServiceError> {
        let existing = Self::get_by_id(db, assignment_id)
            .await?
            .ok_or(ServiceError::AssignmentNotFound)?;

        let mut merged = existing.clone();
        if let Some(title) = update.title {
            merged.title = title;
        }
        if let Some(description) = update.description {
            merged.description = description;
        }
        if let Some(instructions) = update.instructions {
            merged.instructions = Some(instructions);
        }
        if let Some(due_date) = update.due_date {
            merged.due_date = due_date;
        }
        if let Some(max_points) = update.max_points {
            merged.max_points = max_points;
        }
        if let Some(assignment_type) = update.assignment_type {
            merged.assignment_type = assignment_type.to_string();
        }
        if let Some(submission_format) = update.submission_format {
            merged.submission_format = submission_format.to_string();
        }
        if let Some(allow_late) = update.allow_late_submissions {
            merged.allow_late_submissions = allow_late;
        }
        if let Some(allow_multiple) = update.allow_multiple_submissions {
            merged.allow_multiple_submissions = allow_multiple;
        }
        if let Some(attachments) = update.attachments {
            merged.attachments = StringList(attachments);
        }
        if let Some(is_active) = update.is_active {
            merged.is_active = is_active;
        }
        merged.updated_at = Utc::now();

        let reference_changed = merged.title != existing.title
            || merged.due_date != existing.due_date
            || merged.assignment_type != existing.assignment_type
            || merged.max_points != existing.max_points;

        let merged = merged.into_active_model().reset_all().update(db).await?;

        if reference_changed {
            Self::sync_course_reference(db, &merged).await;
        }

        Ok(merged)
    }

    /// Soft delete; the record stays behind with `is_active = false` and the
    /// embedded course reference is removed best-effort.
    pub async fn delete(
        db: &DatabaseConnection,
        assignment_id: Uuid,
    ) -> Result<(), ServiceError> {
        let deleted = Self::update(
            db,
            assignment_id,
            UpdateAssignment {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        if let Err(e) =
            CourseService::remove_assignment_ref(db, deleted.course_id, assignment_id).await
        {
            warn!(
                "failed to remove assignment reference {assignment_id} from course {}: {e}",
                deleted.course_id
            );
        }
        Ok(())
    }

    /// All active assignments across courses, ordered by due date
    pub async fn list_all(
        db: &DatabaseConnection,
    ) -> Result<Vec<assignments::Model>, ServiceError> {
        Ok(assignments::Entity::find()
            .filter(assignments::Column::IsActive.eq(true))
            .order_by_asc(assignments::Column::DueDate)
            .all(db)
            .await?)
    }

    /// Refreshes the derived submission counter. Failures are logged and
    /// swallowed; the counter is only eventually consistent.
    pub async fn refresh_submission_count(
        db: &DatabaseConnection,
        assignment_id: Uuid,
        count: u64,
    ) {
        let result = assignments::ActiveModel {
            id: Set(assignment_id),
            submission_count: Set(count as i32),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await;
        if let Err(e) = result {
            warn!("failed to refresh submission count for assignment {assignment_id}: {e}");
        }
    }

    async fn sync_course_reference(db: &DatabaseConnection, assignment: &assignments::Model) {
        let assignment_type = match assignment.assignment_type.parse::<AssignmentType>() {
            Ok(t) => t,
            Err(_) => {
                warn!(
                    "assignment {} stores unknown type {:?}, skipping reference sync",
                    assignment.id, assignment.assignment_type
                );
                return;
            }
        };
        let reference = AssignmentReference {
            assignment_id: assignment.id,
            title: assignment.title.clone(),
            due_date: assignment.due_date,
            assignment_type,
            max_points: assignment.max_points,
        };
        if let Err(e) =
            CourseService::update_assignment_ref(db, assignment.course_id, reference).await
        {
            warn!(
                "failed to re-sync assignment reference {} in course {}: {e}",
                assignment.id, assignment.course_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::courses;
    use chrono::TimeZone;
    use models::course::{AssignmentReferences, EnrolledStudents};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_assignment() -> assignments::Model {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assignments::Model {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: "HW 1".into(),
            description: "Prove it".into(),
            instructions: None,
            due_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            max_points: 100,
            assignment_type: "homework".into(),
            is_active: true,
            created_by: "instr-1".into(),
            attachments: StringList::default(),
            submission_format: "text".into(),
            submission_count: 0,
            allow_late_submissions: false,
            allow_multiple_submissions: false,
            created_at: t,
            updated_at: t,
        }
    }

    fn sample_course(id: Uuid) -> courses::Model {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        courses::Model {
            id,
            title: "Systems Programming".into(),
            description: "Bits and bytes".into(),
            instructor_id: "instr-1".into(),
            instructor_name: "Prof. Stone".into(),
            category: "cs".into(),
            level: "intermediate".into(),
            duration: 40,
            max_students: 30,
            current_enrollments: 0,
            enrolled_students: EnrolledStudents::default(),
            assignments: AssignmentReferences::default(),
            is_active: true,
            tags: StringList::default(),
            syllabus: None,
            prerequisites: None,
            created_at: t,
            updated_at: t,
        }
    }

    #[tokio::test]
    async fn create_fails_without_owning_course() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<courses::Model>::new()])
            .into_connection();

        let err = AssignmentService::create(
            &db,
            CreateAssignment {
                course_id: Uuid::new_v4(),
                title: "HW 1".into(),
                description: "Prove it".into(),
                instructions: None,
                due_date: Utc::now(),
                max_points: 100,
                assignment_type: AssignmentType::Homework,
                is_active: true,
                created_by: "instr-1".into(),
                attachments: vec![],
                submission_format: SubmissionFormat::Text,
                allow_late_submissions: false,
                allow_multiple_submissions: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::CourseNotFound));
    }

    #[tokio::test]
    async fn create_persists_and_pushes_course_reference() {
        let course_id = Uuid::new_v4();
        let course = sample_course(course_id);
        let mut course_with_ref = course.clone();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // course existence check
            .append_query_results([vec![course.clone()]])
            // assignment insert
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // reference sync: course fetch + replace
            .append_query_results([vec![course]])
            .append_query_results([vec![{
                course_with_ref.assignments.0.push(AssignmentReference {
                    assignment_id: Uuid::new_v4(),
                    title: "HW 1".into(),
                    due_date: Utc::now(),
                    assignment_type: AssignmentType::Homework,
                    max_points: 100,
                });
                course_with_ref
            }]])
            .into_connection();

        let created = AssignmentService::create(
            &db,
            CreateAssignment {
                course_id,
                title: "HW 1".into(),
                description: "Prove it".into(),
                instructions: None,
                due_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
                max_points: 100,
                assignment_type: AssignmentType::Homework,
                is_active: true,
                created_by: "instr-1".into(),
                attachments: vec![],
                submission_format: SubmissionFormat::Text,
                allow_late_submissions: false,
                allow_multiple_submissions: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.course_id, course_id);
        assert_eq!(created.submission_count, 0);
        assert_eq!(created.submission_format, "text");
        assert_eq!(created.max_points, 100);
    }

    #[tokio::test]
    async fn update_missing_assignment_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<assignments::Model>::new()])
            .into_connection();

        let err = AssignmentService::update(&db, Uuid::new_v4(), UpdateAssignment::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AssignmentNotFound));
    }

    #[tokio::test]
    async fn update_of_title_resyncs_the_embedded_reference() {
        let assignment = sample_assignment();
        let mut renamed = assignment.clone();
        renamed.title = "HW 1 (revised)".into();

        let mut course = sample_course(assignment.course_id);
        course.assignments.0.push(AssignmentReference {
            assignment_id: assignment.id,
            title: assignment.title.clone(),
            due_date: assignment.due_date,
            assignment_type: AssignmentType::Homework,
            max_points: assignment.max_points,
        });
        let mut course_synced = course.clone();
        course_synced.assignments.0[0].title = renamed.title.clone();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment.clone()]])
            // assignment replace
            .append_query_results([vec![renamed.clone()]])
            // reference sync: course fetch + replace
            .append_query_results([vec![course]])
            .append_query_results([vec![course_synced]])
            .into_connection();

        let updated = AssignmentService::update(
            &db,
            assignment.id,
            UpdateAssignment {
                title: Some("HW 1 (revised)".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "HW 1 (revised)");
        // the other denormalized fields are untouched
        assert_eq!(updated.max_points, assignment.max_points);
    }
}
