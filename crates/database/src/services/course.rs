use crate::entities::{courses, enrollments, students};
use crate::error::ServiceError;
use chrono::Utc;
use log::warn;
use models::course::{AssignmentReference, CourseLevel, EnrolledStudent, StringList};
use models::enrollment::{EnrolledCourse, EnrollmentStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};
use serde_json::Value;
use uuid::Uuid;

/// Input for [`CourseService::create_course`]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub category: String,
    pub level: CourseLevel,
    pub duration: i32,
    pub max_students: i32,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub syllabus: Option<Vec<String>>,
    pub prerequisites: Option<Vec<String>>,
}

/// Owns Course and Student records, the enrollment checks, and the
/// denormalized back-references embedded in both.
pub struct CourseService;

impl CourseService {
    /// All active courses, newest first
    pub async fn list_active_courses(
        db: &DatabaseConnection,
    ) -> Result<Vec<courses::Model>, ServiceError> {
        Ok(courses::Entity::find()
            .filter(courses::Column::IsActive.eq(true))
            .order_by_desc(courses::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn get_course(
        db: &DatabaseConnection,
        course_id: Uuid,
    ) -> Result<Option<courses::Model>, ServiceError> {
        Ok(courses::Entity::find_by_id(course_id).one(db).await?)
    }

    pub async fn create_course(
        db: &DatabaseConnection,
        input: CreateCourse,
    ) -> Result<courses::Model, ServiceError> {
        let now = Utc::now();
        let course = courses::Model {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            instructor_id: input.instructor_id,
            instructor_name: input.instructor_name,
            category: input.category,
            level: input.level.to_string(),
            duration: input.duration,
            max_students: input.max_students,
            current_enrollments: 0,
            enrolled_students: Default::default(),
            assignments: Default::default(),
            is_active: input.is_active,
            tags: StringList(input.tags),
            syllabus: input.syllabus.map(StringList),
            prerequisites: input.prerequisites.map(StringList),
            created_at: now,
            updated_at: now,
        };

        courses::Entity::insert(course.clone().into_active_model().reset_all())
            .exec_without_returning(db)
            .await?;
        Ok(course)
    }

    /// Enrolls a student into a course.
    ///
    /// The enrollment row is created before the course document is updated
    /// and the student record is upserted last; none of the three writes is
    /// transactional with the others, so a failure mid-sequence can leave
    /// an orphan enrollment row.
    pub async fn enroll_student(
        db: &DatabaseConnection,
        course_id: Uuid,
        student_id: &str,
        student_name: &str,
        student_email: &str,
    ) -> Result<enrollments::Model, ServiceError> {
        let mut course = Self::get_course(db, course_id)
            .await?
            .ok_or(ServiceError::CourseNotFound)?;

        if course.current_enrollments >= course.max_students {
            return Err(ServiceError::CourseFull);
        }

        // Duplicate check against both projections of the enrollment fact:
        // the standalone row and the course's embedded roster.
        let existing = enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::StudentId.eq(student_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::AlreadyEnrolled);
        }
        if course
            .enrolled_students
            .0
            .iter()
            .any(|s| s.student_id == student_id)
        {
            return Err(ServiceError::AlreadyEnrolled);
        }

        let now = Utc::now();
        let enrollment = enrollments::Model {
            id: Uuid::new_v4(),
            course_id,
            student_id: student_id.to_owned(),
            student_name: student_name.to_owned(),
            student_email: student_email.to_owned(),
            enrolled_at: now,
            status: EnrollmentStatus::Enrolled.to_string(),
            progress: 0,
            last_accessed_at: None,
        };
        enrollments::Entity::insert(enrollment.clone().into_active_model().reset_all())
            .exec_without_returning(db)
            .await?;

        course.enrolled_students.0.push(EnrolledStudent {
            student_id: student_id.to_owned(),
            student_name: student_name.to_owned(),
            enrolled_at: now,
        });
        course.current_enrollments += 1;
        course.updated_at = now;
        let course = course.into_active_model().reset_all().update(db).await?;

        if let Err(e) =
            Self::upsert_student(db, student_id, student_name, student_email, &course).await
        {
            warn!("failed to upsert student {student_id} after enrollment: {e}");
        }

        Ok(enrollment)
    }

    /// Enrollment rows for the course that are still in the `enrolled` state
    pub async fn list_enrolled_students(
        db: &DatabaseConnection,
        course_id: Uuid,
    ) -> Result<Vec<enrollments::Model>, ServiceError> {
        Ok(enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Enrolled.to_string()))
            .all(db)
            .await?)
    }

    /// Pushes an assignment reference into the course's embedded list
    pub async fn add_assignment_ref(
        db: &DatabaseConnection,
        course_id: Uuid,
        reference: AssignmentReference,
    ) -> Result<(), ServiceError> {
        let mut course = Self::get_course(db, course_id)
            .await?
            .ok_or(ServiceError::CourseNotFound)?;
        if course
            .assignments
            .0
            .iter()
            .any(|r| r.assignment_id == reference.assignment_id)
        {
            return Err(ServiceError::AssignmentRefDuplicate);
        }
        course.assignments.0.push(reference);
        course.updated_at = Utc::now();
        course.into_active_model().reset_all().update(db).await?;
        Ok(())
    }

    /// Replaces the embedded reference matching `reference.assignment_id`
    pub async fn update_assignment_ref(
        db: &DatabaseConnection,
        course_id: Uuid,
        reference: AssignmentReference,
    ) -> Result<(), ServiceError> {
        let mut course = Self::get_course(db, course_id)
            .await?
            .ok_or(ServiceError::CourseNotFound)?;
        let slot = course
            .assignments
            .0
            .iter_mut()
            .find(|r| r.assignment_id == reference.assignment_id)
            .ok_or(ServiceError::AssignmentRefNotFound)?;
        *slot = reference;
        course.updated_at = Utc::now();
        course.into_active_model().reset_all().update(db).await?;
        Ok(())
    }

    pub async fn remove_assignment_ref(
        db: &DatabaseConnection,
        course_id: Uuid,
        assignment_id: Uuid,
    ) -> Result<(), ServiceError> {
        let mut course = Self::get_course(db, course_id)
            .await?
            .ok_or(ServiceError::CourseNotFound)?;
        let before = course.assignments.0.len();
        course
            .assignments
            .0
            .retain(|r| r.assignment_id != assignment_id);
        if course.assignments.0.len() == before {
            return Err(ServiceError::AssignmentRefNotFound);
        }
        course.updated_at = Utc::now();
        course.into_active_model().reset_all().update(db).await?;
        Ok(())
    }

    /// Fetches a student, transparently migrating the legacy
    /// `enrolledCourses` shape (bare course-id strings) to the
    /// `{courseId, courseName, enrolledAt}` shape. The migrated record is
    /// persisted before it is returned; course ids that no longer resolve
    /// are dropped with a warning.
    pub async fn get_student(
        db: &DatabaseConnection,
        student_id: &str,
    ) -> Result<Option<students::Model>, ServiceError> {
        let Some(student) = students::Entity::find_by_id(student_id).one(db).await? else {
            return Ok(None);
        };

        let entries = match student.enrolled_courses.as_array() {
            Some(entries) => entries.clone(),
            None => {
                warn!("student {student_id} has a non-list enrolledCourses value, resetting");
                Vec::new()
            }
        };
        let is_legacy =
            !student.enrolled_courses.is_array() || entries.iter().any(Value::is_string);
        if !is_legacy {
            return Ok(Some(student));
        }

        let mut migrated = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::String(raw_id) => {
                    let Ok(course_id) = raw_id.parse::<Uuid>() else {
                        warn!("dropping unparseable legacy course id {raw_id} on student {student_id}");
                        continue;
                    };
                    match Self::get_course(db, course_id).await? {
                        // the legacy shape never recorded an enrollment
                        // time, so the record's creation time stands in
                        Some(course) => migrated.push(serde_json::to_value(EnrolledCourse {
                            course_id: course.id,
                            course_name: course.title,
                            enrolled_at: student.created_at,
                        })?),
                        None => {
                            warn!("dropping unresolvable legacy course id {raw_id} on student {student_id}");
                        }
                    }
                }
                other => migrated.push(other),
            }
        }

        let updated = students::ActiveModel {
            id: Set(student.id.clone()),
            enrolled_courses: Set(Value::Array(migrated)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(Some(updated))
    }

    /// All active students, name-ordered
    pub async fn list_all_students(
        db: &DatabaseConnection,
    ) -> Result<Vec<students::Model>, ServiceError> {
        Ok(students::Entity::find()
            .filter(students::Column::IsActive.eq(true))
            .order_by_asc(students::Column::Name)
            .all(db)
            .await?)
    }

    /// Creates the student record on first enrollment, or appends the course
    /// to an existing record unless it is already listed (idempotent).
    async fn upsert_student(
        db: &DatabaseConnection,
        student_id: &str,
        student_name: &str,
        student_email: &str,
        course: &courses::Model,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        let entry = serde_json::to_value(EnrolledCourse {
            course_id: course.id,
            course_name: course.title.clone(),
            enrolled_at: now,
        })?;

        match students::Entity::find_by_id(student_id).one(db).await? {
            Some(student) => {
                if course_listed(&student.enrolled_courses, course.id) {
                    return Ok(());
                }
                let mut list = match student.enrolled_courses {
                    Value::Array(list) => list,
                    _ => Vec::new(),
                };
                list.push(entry);
                students::ActiveModel {
                    id: Set(student.id),
                    enrolled_courses: Set(Value::Array(list)),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(db)
                .await?;
            }
            None => {
                let student = students::Model {
                    id: student_id.to_owned(),
                    name: student_name.to_owned(),
                    email: student_email.to_owned(),
                    enrolled_courses: Value::Array(vec![entry]),
                    is_active: true,
                    academic_level: None,
                    major: None,
                    profile_image: None,
                    created_at: now,
                    updated_at: now,
                };
                students::Entity::insert(student.into_active_model().reset_all())
                    .exec_without_returning(db)
                    .await?;
            }
        }
        Ok(())
    }
}

/// True when the course already appears in a student's embedded list, in
/// either the current object shape or the legacy bare-id shape.
fn course_listed(enrolled_courses: &Value, course_id: Uuid) -> bool {
    let Some(entries) = enrolled_courses.as_array() else {
        return false;
    };
    let id = course_id.to_string();
    entries.iter().any(|entry| match entry {
        Value::String(raw) => *raw == id,
        other => other.get("courseId").and_then(Value::as_str) == Some(id.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use models::course::{AssignmentReferences, EnrolledStudents};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_course(max_students: i32, current: i32) -> courses::Model {
        let t = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        courses::Model {
            id: Uuid::new_v4(),
            title: "Systems Programming".into(),
            description: "Bits and bytes".into(),
            instructor_id: "instr-1".into(),
            instructor_name: "Prof. Stone".into(),
            category: "cs".into(),
            level: "intermediate".into(),
            duration: 40,
            max_students,
            current_enrollments: current,
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
    async fn enroll_fails_when_course_is_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<courses::Model>::new()])
            .into_connection();

        let err = CourseService::enroll_student(&db, Uuid::new_v4(), "uid", "Ada", "a@x.io")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CourseNotFound));
    }

    #[tokio::test]
    async fn enroll_fails_when_course_is_full() {
        let course = sample_course(30, 30);
        let course_id = course.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course]])
            .into_connection();

        let err = CourseService::enroll_student(&db, course_id, "uid", "Ada", "a@x.io")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CourseFull));
    }

    #[tokio::test]
    async fn enroll_rejects_duplicate_enrollment_row() {
        let course = sample_course(30, 1);
        let course_id = course.id;
        let existing = enrollments::Model {
            id: Uuid::new_v4(),
            course_id,
            student_id: "uid".into(),
            student_name: "Ada".into(),
            student_email: "a@x.io".into(),
            enrolled_at: Utc::now(),
            status: "enrolled".into(),
            progress: 0,
            last_accessed_at: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course]])
            .append_query_results([vec![existing]])
            .into_connection();

        let err = CourseService::enroll_student(&db, course_id, "uid", "Ada", "a@x.io")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyEnrolled));
    }

    #[tokio::test]
    async fn enroll_rejects_student_already_on_embedded_roster() {
        let mut course = sample_course(30, 1);
        course.enrolled_students.0.push(EnrolledStudent {
            student_id: "uid".into(),
            student_name: "Ada".into(),
            enrolled_at: Utc::now(),
        });
        let course_id = course.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course]])
            .append_query_results([Vec::<enrollments::Model>::new()])
            .into_connection();

        let err = CourseService::enroll_student(&db, course_id, "uid", "Ada", "a@x.io")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyEnrolled));
    }

    #[tokio::test]
    async fn enroll_appends_to_roster_and_bumps_counter() {
        let course = sample_course(30, 0);
        let course_id = course.id;

        let mut updated = course.clone();
        updated.enrolled_students.0.push(EnrolledStudent {
            student_id: "uid".into(),
            student_name: "Ada".into(),
            enrolled_at: Utc::now(),
        });
        updated.current_enrollments = 1;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // course fetch, duplicate-row check
            .append_query_results([vec![course]])
            .append_query_results([Vec::<enrollments::Model>::new()])
            // enrollment insert
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // course replace
            .append_query_results([vec![updated.clone()]])
            // student lookup (absent) then insert
            .append_query_results([Vec::<students::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let enrollment = CourseService::enroll_student(&db, course_id, "uid", "Ada", "a@x.io")
            .await
            .unwrap();
        assert_eq!(enrollment.course_id, course_id);
        assert_eq!(enrollment.student_id, "uid");
        assert_eq!(enrollment.status, "enrolled");
        assert_eq!(enrollment.progress, 0);
        assert_eq!(
            updated.current_enrollments as usize,
            updated.enrolled_students.0.len()
        );
    }

    #[tokio::test]
    async fn add_assignment_ref_rejects_duplicates() {
        let mut course = sample_course(30, 0);
        let reference = AssignmentReference {
            assignment_id: Uuid::new_v4(),
            title: "HW 1".into(),
            due_date: Utc::now(),
            assignment_type: models::assignment::AssignmentType::Homework,
            max_points: 100,
        };
        course.assignments.0.push(reference.clone());
        let course_id = course.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course]])
            .into_connection();

        let err = CourseService::add_assignment_ref(&db, course_id, reference)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AssignmentRefDuplicate));
    }

    #[tokio::test]
    async fn get_student_migrates_legacy_course_id_list() {
        let t = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
        let course = sample_course(30, 1);
        let known_id = course.id;
        let unknown_id = Uuid::new_v4();

        let student = students::Model {
            id: "uid".into(),
            name: "Ada".into(),
            email: "a@x.io".into(),
            enrolled_courses: serde_json::json!([
                known_id.to_string(),
                unknown_id.to_string(),
            ]),
            is_active: true,
            academic_level: None,
            major: None,
            profile_image: None,
            created_at: t,
            updated_at: t,
        };
        let mut migrated = student.clone();
        migrated.enrolled_courses = serde_json::json!([{
            "courseId": known_id,
            "courseName": "Systems Programming",
            "enrolledAt": t,
        }]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student]])
            // known id resolves, unknown id does not
            .append_query_results([vec![course]])
            .append_query_results([Vec::<courses::Model>::new()])
            // persisted migration
            .append_query_results([vec![migrated]])
            .into_connection();

        let result = CourseService::get_student(&db, "uid").await.unwrap().unwrap();
        let list = result.enrolled_courses.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(
            list[0].get("courseId").and_then(Value::as_str),
            Some(known_id.to_string().as_str())
        );
        assert!(list[0].get("courseName").is_some());
    }

    #[test]
    fn course_listed_handles_both_shapes() {
        let id = Uuid::new_v4();
        let legacy = serde_json::json!([id.to_string()]);
        let current = serde_json::json!([{ "courseId": id, "courseName": "X", "enrolledAt": Utc::now() }]);
        let other = serde_json::json!([Uuid::new_v4().to_string()]);
        assert!(course_listed(&legacy, id));
        assert!(course_listed(&current, id));
        assert!(!course_listed(&other, id));
    }
}
