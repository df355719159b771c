use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course row. List attributes are JSON-array text, see `utils::json_field`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub level: String,
    pub price: i32,
    pub icon: Option<String>,
    pub icon_name: Option<String>,
    pub career_path: Option<String>,
    pub instructor: Option<String>,
    pub topics: Option<String>,
    pub skills: Option<String>,
    pub projects: Option<String>,
    pub prerequisites: Option<String>,
    pub syllabus: Option<String>,
    pub enrolled_students: Option<String>,
    pub students_count: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
