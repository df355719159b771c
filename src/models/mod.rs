pub mod application;
pub mod candidate;
pub mod course;
pub mod enquiry;
pub mod enrollment;
pub mod job;
pub mod user;
