pub mod applications;
pub mod auth;
pub mod candidates;
pub mod courses;
pub mod enquiries;
pub mod enrollments;
pub mod health;
pub mod jobs;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// The full HTTP surface, shared by the binary and the integration tests.
pub fn router(state: AppState) -> Router {
    let base_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health));

    let auth_api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me).put(auth::update_me));

    let user_api = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/stats", get(users::user_stats))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/:field", patch(users::patch_user_field));

    let course_api = Router::new()
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/:id",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/courses/:id/:field", patch(courses::patch_course_field));

    let candidate_api = Router::new()
        .route(
            "/candidates",
            get(candidates::list_candidates).post(candidates::create_candidate),
        )
        .route("/candidates/stats", get(candidates::candidate_stats))
        .route(
            "/candidates/:id",
            get(candidates::get_candidate)
                .put(candidates::update_candidate)
                .delete(candidates::delete_candidate),
        )
        .route(
            "/candidates/:id/:field",
            patch(candidates::patch_candidate_field),
        );

    let job_api = Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/jobs/:id",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/jobs/:id/:field", patch(jobs::patch_job_field));

    let enquiry_api = Router::new()
        .route(
            "/enquiries",
            get(enquiries::list_enquiries).post(enquiries::create_enquiry),
        )
        .route("/enquiries/stats", get(enquiries::enquiry_stats))
        .route(
            "/enquiries/:id",
            get(enquiries::get_enquiry)
                .put(enquiries::update_enquiry)
                .delete(enquiries::delete_enquiry),
        )
        .route("/enquiries/:id/:field", patch(enquiries::patch_enquiry_field));

    let application_api = Router::new()
        .route(
            "/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route("/applications/stats", get(applications::application_stats))
        .route(
            "/applications/:id",
            get(applications::get_application)
                .put(applications::update_application)
                .delete(applications::delete_application),
        )
        .route(
            "/applications/:id/:field",
            patch(applications::patch_application_field),
        );

    let enrollment_api = Router::new()
        .route(
            "/enrollments",
            get(enrollments::list_enrollments).post(enrollments::create_enrollment),
        )
        .route("/enrollments/stats", get(enrollments::enrollment_stats))
        .route(
            "/enrollments/:id",
            get(enrollments::get_enrollment)
                .put(enrollments::update_enrollment)
                .delete(enrollments::delete_enrollment),
        )
        .route(
            "/enrollments/:id/:field",
            patch(enrollments::patch_enrollment_field),
        );

    base_routes
        .merge(auth_api)
        .merge(user_api)
        .merge(course_api)
        .merge(candidate_api)
        .merge(job_api)
        .merge(enquiry_api)
        .merge(application_api)
        .merge(enrollment_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
