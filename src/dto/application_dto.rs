use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::Result;
use crate::models::application::JobApplication;
use crate::utils::validation::{ensure_optional_one_of, APPLICATION_STATUSES, PRIORITIES};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    #[validate(range(min = 1))]
    pub job_id: i32,
    #[validate(range(min = 1))]
    pub candidate_id: i32,
    pub user_id: Option<i32>,
    pub cover_letter: Option<String>,
    #[validate(url)]
    pub resume_url: Option<String>,
    #[validate(url)]
    pub portfolio_url: Option<String>,
    pub expected_salary: Option<String>,
    pub notice_period: Option<String>,
    pub availability_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

impl CreateApplicationPayload {
    /// The caller becomes the owning user unless one is given.
    pub fn into_changeset(self, caller_id: i32) -> Result<Changeset> {
        ensure_optional_one_of("status", self.status.as_deref(), APPLICATION_STATUSES)?;
        ensure_optional_one_of("priority", self.priority.as_deref(), PRIORITIES)?;

        let mut changes = Changeset::new();
        changes.value("job_id", self.job_id);
        changes.value("candidate_id", self.candidate_id);
        changes.value("user_id", self.user_id.unwrap_or(caller_id));
        changes.optional("cover_letter", self.cover_letter);
        changes.optional("resume_url", self.resume_url);
        changes.optional("portfolio_url", self.portfolio_url);
        changes.optional("expected_salary", self.expected_salary);
        changes.optional("notice_period", self.notice_period);
        changes.optional("availability_date", self.availability_date);
        changes.value("status", self.status.unwrap_or_else(|| "applied".to_string()));
        changes.value("priority", self.priority.unwrap_or_else(|| "medium".to_string()));
        changes.optional("notes", self.notes);
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateApplicationPayload {
    pub job_id: Patch<i32>,
    pub candidate_id: Patch<i32>,
    pub user_id: Patch<i32>,
    pub cover_letter: Patch<String>,
    pub resume_url: Patch<String>,
    pub portfolio_url: Patch<String>,
    pub expected_salary: Patch<String>,
    pub notice_period: Patch<String>,
    pub availability_date: Patch<DateTime<Utc>>,
    pub status: Patch<String>,
    pub priority: Patch<String>,
    pub notes: Patch<String>,
}

impl UpdateApplicationPayload {
    pub fn into_changeset(self) -> Result<Changeset> {
        ensure_optional_one_of(
            "status",
            self.status.value().map(String::as_str),
            APPLICATION_STATUSES,
        )?;
        ensure_optional_one_of("priority", self.priority.value().map(String::as_str), PRIORITIES)?;

        let mut changes = Changeset::new();
        changes.patch_required("job_id", self.job_id)?;
        changes.patch_required("candidate_id", self.candidate_id)?;
        changes.patch("user_id", self.user_id);
        changes.patch("cover_letter", self.cover_letter);
        changes.patch("resume_url", self.resume_url);
        changes.patch("portfolio_url", self.portfolio_url);
        changes.patch("expected_salary", self.expected_salary);
        changes.patch("notice_period", self.notice_period);
        changes.patch("availability_date", self.availability_date);
        changes.patch_required("status", self.status)?;
        changes.patch_required("priority", self.priority)?;
        changes.patch("notes", self.notes);
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub job_id: Option<i32>,
    pub candidate_id: Option<i32>,
}

impl ApplicationListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
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

impl From<JobApplication> for ApplicationResponse {
    fn from(a: JobApplication) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            candidate_id: a.candidate_id,
            user_id: a.user_id,
            cover_letter: a.cover_letter,
            resume_url: a.resume_url,
            portfolio_url: a.portfolio_url,
            expected_salary: a.expected_salary,
            notice_period: a.notice_period,
            availability_date: a.availability_date,
            status: a.status,
            priority: a.priority,
            notes: a.notes,
            applied_at: a.applied_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_defaults_owner_and_status() {
        let payload: CreateApplicationPayload =
            serde_json::from_value(json!({ "job_id": 3, "candidate_id": 8 })).unwrap();
        let changes = payload.into_changeset(5).unwrap();
        assert_eq!(changes.get("user_id").and_then(|v| v.as_int()), Some(5));
        assert_eq!(changes.text("status"), Some("applied"));
    }

    #[test]
    fn response_copies_row_fields() {
        let at = chrono::Utc::now();
        let row = JobApplication {
            id: 4,
            job_id: 3,
            candidate_id: 8,
            user_id: Some(5),
            cover_letter: None,
            resume_url: Some("https://cv.example.com/8".into()),
            portfolio_url: None,
            expected_salary: None,
            notice_period: Some("30 days".into()),
            availability_date: None,
            status: "shortlisted".into(),
            priority: "high".into(),
            notes: None,
            applied_at: at,
            created_at: at,
            updated_at: at,
        };
        let body = serde_json::to_value(ApplicationResponse::from(row)).unwrap();
        assert_eq!(body["status"], "shortlisted");
        assert_eq!(body["resume_url"], "https://cv.example.com/8");
        assert!(body["cover_letter"].is_null());
    }

    #[test]
    fn status_must_be_known() {
        let payload: UpdateApplicationPayload =
            serde_json::from_value(json!({ "status": "hired" })).unwrap();
        assert!(payload.into_changeset().is_err());

        let payload: UpdateApplicationPayload =
            serde_json::from_value(json!({ "status": "shortlisted" })).unwrap();
        assert!(payload.into_changeset().is_ok());
    }
}
