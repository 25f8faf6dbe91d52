mod doc;
mod dtos;
mod error;
mod routes;
mod state;
mod utils;

use crate::doc::ApiDoc;
use crate::routes::{assignment, course, files, health, root, student, submission};
use crate::state::AppState;
use crate::utils::shutdown::shutdown_signal;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use database::db::create_connection;
use log::info;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use storage::BlobStore;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// five 10 MB files plus form overhead
const MAX_BODY_BYTES: usize = 55 * 1024 * 1024;

#[tokio::main]
async fn main() {
    env_logger::init();
    dotenvy::dotenv().ok();

    let db = create_connection()
        .await
        .expect("failed to connect to the database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run pending migrations");
    let blobs = BlobStore::from_env().expect("incomplete blob store configuration");
    blobs
        .initialize()
        .await
        .expect("failed to prepare the blob storage root");

    let state = AppState {
        db,
        blobs: Arc::new(blobs),
    };

    let app = Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route(
            "/courses",
            get(course::get_courses).post(course::create_course),
        )
        .route(
            "/courses/students",
            get(course::get_enrolled_students_by_query),
        )
        .route("/courses/enroll", post(course::enroll_by_body))
        .route("/courses/{id}", get(course::get_course_by_id))
        .route("/courses/{id}/enroll", post(course::enroll))
        .route("/courses/{id}/students", get(course::get_enrolled_students))
        .route(
            "/courses/{id}/assignments",
            get(assignment::get_course_assignments).post(assignment::create_for_course),
        )
        .route("/students", get(student::get_students))
        .route("/students/profile", get(student::get_student_profile))
        .route("/students/{id}", get(student::get_student_by_id))
        .route("/assignments", get(assignment::get_assignments))
        .route(
            "/assignments/course",
            get(assignment::get_course_assignments_by_query),
        )
        .route("/assignments/details", get(assignment::get_assignment_details))
        .route("/assignments/create", post(assignment::create_assignment))
        .route(
            "/assignments/{id}",
            get(assignment::get_assignment_by_id)
                .put(assignment::update_assignment)
                .delete(assignment::delete_assignment),
        )
        .route(
            "/assignments/{id}/attachments/url",
            get(files::assignment_attachment_url),
        )
        .route("/assignments/{id}/submit", post(submission::submit_assignment))
        .route(
            "/assignments/{id}/submissions",
            get(submission::get_assignment_submissions),
        )
        .route("/submissions/create", post(submission::create_submission_json))
        .route(
            "/submissions/student/{studentId}",
            get(submission::get_student_submissions),
        )
        .route(
            "/submissions/{id}",
            get(submission::get_submission_by_id).delete(submission::delete_submission),
        )
        .route("/submissions/{id}/grade", post(submission::grade_submission))
        .route(
            "/submissions/{id}/status",
            axum::routing::put(submission::update_submission_status),
        )
        .route(
            "/submissions/{id}/attachments/{attachmentId}/url",
            get(files::submission_attachment_url),
        )
        .route("/files/{*blob}", get(files::serve_blob))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Running axum on http://localhost:3000");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}
