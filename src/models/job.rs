use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i32,
    pub job_title: String,
    pub job_description: String,
    pub job_type: String,
    pub work_mode: String,
    pub industry: String,
    pub department: String,
    pub role: String,
    pub company_id: Option<String>,
    pub company_name: String,
    pub company_location: Option<String>,
    pub location: String,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub required_skills: Option<String>,
    pub preferred_skills: Option<String>,
    pub experience_min_years: Option<i32>,
    pub experience_max_years: Option<i32>,
    pub education_required: Option<String>,
    pub certifications: Option<String>,
    pub languages: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: String,
    pub additional_benefits: Option<String>,
    pub number_of_openings: i32,
    pub employment_start_date: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub shift_timing: Option<String>,
    pub notice_period_preference: Option<String>,
    pub work_authorization_requirements: Option<String>,
    pub status: String,
    pub priority: String,
    pub date_posted: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub posted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
