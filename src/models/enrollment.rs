use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: i32,
    pub course_id: i32,
    pub candidate_id: i32,
    pub user_id: Option<i32>,
    pub status: String,
    pub progress: i32,
    pub completed_topics: Option<String>,
    pub current_topic: Option<String>,
    /// Minor currency units.
    pub total_fees: i32,
    pub paid_amount: i32,
    pub payment_status: String,
    pub notes: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
