pub mod application_service;
pub mod candidate_service;
pub mod course_service;
pub mod enquiry_service;
pub mod enrollment_service;
pub mod job_service;
pub mod user_service;
