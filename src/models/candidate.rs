use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub gender: Option<String>,
    pub address: String,
    pub pincode: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub course: Option<String>,
    pub joining_date: Option<DateTime<Utc>>,
    pub fees_transaction_number: Option<String>,
    pub job_admission: bool,
    pub profile_title: Option<String>,
    pub current_job_status: Option<String>,
    pub total_experience_years: Option<i32>,
    pub total_experience_months: Option<i32>,
    pub current_employer: Option<String>,
    pub current_job_title: Option<String>,
    pub primary_skills: Option<String>,
    pub secondary_skills: Option<String>,
    pub skill_proficiency_level: Option<String>,
    pub certifications: Option<String>,
    pub highest_qualification: Option<String>,
    pub specialization: Option<String>,
    pub university: Option<String>,
    pub year_of_passing: Option<i32>,
    pub grades: Option<String>,
    pub preferred_job_type: Option<String>,
    pub preferred_industry: Option<String>,
    pub preferred_roles: Option<String>,
    pub expected_salary: Option<String>,
    pub work_mode_preference: Option<String>,
    pub notice_period: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub languages: Option<String>,
    pub work_authorization: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
