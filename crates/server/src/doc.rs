use crate::routes::{assignment, course, files, health, root, student, submission};
use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        course::get_courses,
        course::create_course,
        course::get_course_by_id,
        course::enroll,
        course::enroll_by_body,
        course::get_enrolled_students,
        course::get_enrolled_students_by_query,
        student::get_students,
        student::get_student_by_id,
        student::get_student_profile,
        assignment::get_assignments,
        assignment::get_assignment_by_id,
        assignment::get_assignment_details,
        assignment::get_course_assignments,
        assignment::get_course_assignments_by_query,
        assignment::create_for_course,
        assignment::create_assignment,
        assignment::update_assignment,
        assignment::delete_assignment,
        submission::submit_assignment,
        submission::create_submission_json,
        submission::get_assignment_submissions,
        submission::get_submission_by_id,
        submission::get_student_submissions,
        submission::grade_submission,
        submission::update_submission_status,
        submission::delete_submission,
        files::assignment_attachment_url,
        files::submission_attachment_url,
        files::serve_blob
    ),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Courses", description = "Course catalog and enrollment"),
        (name = "Students", description = "Student directory"),
        (name = "Assignments", description = "Assignment management"),
        (name = "Submissions", description = "Submission and grading workflow"),
        (name = "Files", description = "Attachment uploads and signed downloads"),
    ),
    info(
        title = "Educational Platform API",
        version = "1.0.0",
        description = "Courses, enrollments, assignments, submissions, and file attachments",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
