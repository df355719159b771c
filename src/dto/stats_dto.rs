use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row count per value of a closed-set column. Every allowed value is present.
pub type Breakdown = BTreeMap<String, i64>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub admin_users: i64,
    pub regular_users: i64,
    pub recent_registrations: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateStats {
    pub total_candidates: i64,
    pub status_breakdown: Breakdown,
    pub priority_breakdown: Breakdown,
    pub recent_candidates: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryStats {
    pub total_enquiries: i64,
    pub status_breakdown: Breakdown,
    pub priority_breakdown: Breakdown,
    pub year_breakdown: Breakdown,
    pub recent_enquiries: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total_applications: i64,
    pub status_breakdown: Breakdown,
    pub priority_breakdown: Breakdown,
    pub recent_applications: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentStats {
    pub total_enrollments: i64,
    pub status_breakdown: Breakdown,
    pub payment_breakdown: Breakdown,
    pub recent_enrollments: i64,
    /// Mean progress of enrolled and in-progress records, two decimals.
    pub average_progress: f64,
    pub generated_at: DateTime<Utc>,
}
