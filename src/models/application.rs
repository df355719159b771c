use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: i32,
    pub job_id: i32,
    pub candidate_id: i32,
    pub user_id: Option<i32>,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub expected_salary: Option<String>,
    pub notice_period: Option<String>,
    pub availability_date: Option<DateTime<Utc>>,
    pub status: String,
    pub priority: String,
    pub notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
