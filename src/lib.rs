pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    application_service::ApplicationService, candidate_service::CandidateService,
    course_service::CourseService, enquiry_service::EnquiryService,
    enrollment_service::EnrollmentService, job_service::JobService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub candidate_service: CandidateService,
    pub job_service: JobService,
    pub enquiry_service: EnquiryService,
    pub application_service: ApplicationService,
    pub enrollment_service: EnrollmentService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self {
            user_service: UserService::new(pool.clone()),
            course_service: CourseService::new(pool.clone()),
            candidate_service: CandidateService::new(pool.clone()),
            job_service: JobService::new(pool.clone()),
            enquiry_service: EnquiryService::new(pool.clone()),
            application_service: ApplicationService::new(pool.clone()),
            enrollment_service: EnrollmentService::new(pool.clone()),
            config: Arc::new(config),
            pool,
        }
    }
}
