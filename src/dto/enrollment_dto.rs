use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::{Error, Result};
use crate::models::enrollment::Enrollment;
use crate::utils::json_field::{self, StringList};
use crate::utils::validation::{
    clamp_progress, ensure_min, ensure_optional_one_of, ENROLLMENT_STATUSES, PAYMENT_STATUSES,
};

pub const STATUS_ENROLLED: &str = "enrolled";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEnrollmentPayload {
    #[validate(range(min = 1))]
    pub course_id: i32,
    #[validate(range(min = 1))]
    pub candidate_id: i32,
    pub user_id: Option<i32>,
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub completed_topics: Option<StringList>,
    pub current_topic: Option<String>,
    pub total_fees: Option<i32>,
    pub paid_amount: Option<i32>,
    pub payment_status: Option<String>,
    pub notes: Option<String>,
}

impl CreateEnrollmentPayload {
    /// `course_price` is the course's price in major units; fees default to it in minor units.
    pub fn into_changeset(self, caller_id: i32, course_price: i32, now: DateTime<Utc>) -> Result<Changeset> {
        ensure_optional_one_of("status", self.status.as_deref(), ENROLLMENT_STATUSES)?;
        ensure_optional_one_of("payment_status", self.payment_status.as_deref(), PAYMENT_STATUSES)?;
        if let Some(fees) = self.total_fees {
            ensure_min("total_fees", fees, 0)?;
        }
        if let Some(paid) = self.paid_amount {
            ensure_min("paid_amount", paid, 0)?;
        }
        let total_fees = match self.total_fees {
            Some(fees) => fees,
            None => course_price
                .checked_mul(100)
                .ok_or_else(|| Error::Invalid("course price is too large to convert to fees".to_string()))?,
        };

        let mut changes = Changeset::new();
        changes.value("course_id", self.course_id);
        changes.value("candidate_id", self.candidate_id);
        changes.value("user_id", self.user_id.unwrap_or(caller_id));
        changes.value("status", self.status.unwrap_or_else(|| STATUS_ENROLLED.to_string()));
        if let Some(progress) = self.progress {
            changes.value("progress", progress);
        }
        changes.list("completed_topics", self.completed_topics)?;
        changes.optional("current_topic", self.current_topic);
        changes.value("total_fees", total_fees);
        changes.value("paid_amount", self.paid_amount.unwrap_or(0));
        changes.value(
            "payment_status",
            self.payment_status.unwrap_or_else(|| "pending".to_string()),
        );
        changes.optional("notes", self.notes);
        apply_progress_rules(&mut changes, None, now);
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateEnrollmentPayload {
    pub course_id: Patch<i32>,
    pub candidate_id: Patch<i32>,
    pub user_id: Patch<i32>,
    pub status: Patch<String>,
    pub progress: Patch<i32>,
    pub completed_topics: Patch<StringList>,
    pub current_topic: Patch<String>,
    pub total_fees: Patch<i32>,
    pub paid_amount: Patch<i32>,
    pub payment_status: Patch<String>,
    pub notes: Patch<String>,
}

impl UpdateEnrollmentPayload {
    /// `current_status` is the stored status before this write.
    pub fn into_changeset(self, current_status: &str, now: DateTime<Utc>) -> Result<Changeset> {
        ensure_optional_one_of(
            "status",
            self.status.value().map(String::as_str),
            ENROLLMENT_STATUSES,
        )?;
        ensure_optional_one_of(
            "payment_status",
            self.payment_status.value().map(String::as_str),
            PAYMENT_STATUSES,
        )?;
        if let Some(fees) = self.total_fees.value() {
            ensure_min("total_fees", *fees, 0)?;
        }
        if let Some(paid) = self.paid_amount.value() {
            ensure_min("paid_amount", *paid, 0)?;
        }

        let mut changes = Changeset::new();
        changes.patch_required("course_id", self.course_id)?;
        changes.patch_required("candidate_id", self.candidate_id)?;
        changes.patch("user_id", self.user_id);
        changes.patch_required("status", self.status)?;
        changes.patch_required("progress", self.progress)?;
        changes.patch_list("completed_topics", self.completed_topics)?;
        changes.patch("current_topic", self.current_topic);
        changes.patch_required("total_fees", self.total_fees)?;
        changes.patch_required("paid_amount", self.paid_amount)?;
        changes.patch_required("payment_status", self.payment_status)?;
        changes.patch("notes", self.notes);
        apply_progress_rules(&mut changes, Some(current_status), now);
        Ok(changes)
    }
}

/// Derives status side effects from a pending write.
///
/// A supplied progress is clamped to 0..=100 and stamps `last_accessed`.
/// Progress 100 forces `completed`; any progress on an `enrolled` record moves
/// it to `in_progress`. `completed_at` is written only on the edge into
/// `completed`, so repeating a completed update leaves it alone.
pub fn apply_progress_rules(changes: &mut Changeset, current_status: Option<&str>, now: DateTime<Utc>) {
    let progress = changes.get("progress").and_then(|v| v.as_int()).map(clamp_progress);
    let supplied = changes.text("status").map(str::to_string);
    let mut status = supplied
        .clone()
        .or_else(|| current_status.map(str::to_string))
        .unwrap_or_else(|| STATUS_ENROLLED.to_string());

    if let Some(progress) = progress {
        changes.value("progress", progress);
        changes.value("last_accessed", now);
        if progress == 100 {
            status = STATUS_COMPLETED.to_string();
        } else if progress > 0 && status == STATUS_ENROLLED {
            status = STATUS_IN_PROGRESS.to_string();
        }
    }

    let entering_completed = status == STATUS_COMPLETED && current_status != Some(STATUS_COMPLETED);
    let unchanged = match supplied.as_deref() {
        Some(s) => s == status,
        None => current_status == Some(status.as_str()),
    };
    if !unchanged {
        changes.value("status", status);
    }
    if entering_completed {
        changes.value("completed_at", now);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub course_id: Option<i32>,
    pub candidate_id: Option<i32>,
}

impl EnrollmentListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub id: i32,
    pub course_id: i32,
    pub candidate_id: i32,
    pub user_id: Option<i32>,
    pub status: String,
    pub progress: i32,
    pub completed_topics: Option<StringList>,
    pub current_topic: Option<String>,
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

impl TryFrom<Enrollment> for EnrollmentResponse {
    type Error = Error;

    fn try_from(e: Enrollment) -> Result<Self> {
        Ok(Self {
            completed_topics: json_field::decode("completed_topics", e.completed_topics.as_deref())?,
            id: e.id,
            course_id: e.course_id,
            candidate_id: e.candidate_id,
            user_id: e.user_id,
            status: e.status,
            progress: e.progress,
            current_topic: e.current_topic,
            total_fees: e.total_fees,
            paid_amount: e.paid_amount,
            payment_status: e.payment_status,
            notes: e.notes,
            enrollment_date: e.enrollment_date,
            last_accessed: e.last_accessed,
            completed_at: e.completed_at,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::changeset::SqlValue;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn update(body: serde_json::Value, current: &str, now: DateTime<Utc>) -> Changeset {
        serde_json::from_value::<UpdateEnrollmentPayload>(body)
            .unwrap()
            .into_changeset(current, now)
            .unwrap()
    }

    #[test]
    fn full_progress_completes_once() {
        let changes = update(json!({ "progress": 100 }), "in_progress", at(9));
        assert_eq!(changes.text("status"), Some("completed"));
        assert_eq!(changes.get("completed_at"), Some(&SqlValue::Timestamp(Some(at(9)))));

        let again = update(json!({ "progress": 100 }), "completed", at(10));
        assert!(!again.contains("completed_at"));
        assert!(!again.contains("status"));
        assert!(again.contains("last_accessed"));
    }

    #[test]
    fn progress_is_clamped_and_starts_course() {
        let changes = update(json!({ "progress": 140 }), "enrolled", at(9));
        assert_eq!(changes.get("progress").and_then(|v| v.as_int()), Some(100));

        let changes = update(json!({ "progress": 30 }), "enrolled", at(9));
        assert_eq!(changes.text("status"), Some("in_progress"));
        assert!(!changes.contains("completed_at"));

        let changes = update(json!({ "progress": -5 }), "enrolled", at(9));
        assert_eq!(changes.get("progress").and_then(|v| v.as_int()), Some(0));
        assert!(!changes.contains("status"));
    }

    #[test]
    fn explicit_completion_sets_timestamp() {
        let changes = update(json!({ "status": "completed" }), "in_progress", at(11));
        assert!(changes.contains("completed_at"));
        assert!(!changes.contains("last_accessed"));
    }

    #[test]
    fn progress_overrides_stale_explicit_status() {
        let changes = update(json!({ "status": "enrolled", "progress": 40 }), "in_progress", at(9));
        assert_eq!(changes.text("status"), Some("in_progress"));
    }

    #[test]
    fn untouched_status_stays_out_of_changeset() {
        let changes = update(json!({ "notes": "call back" }), "suspended", at(9));
        assert_eq!(changes.columns().collect::<Vec<_>>(), vec!["notes"]);
    }

    #[test]
    fn create_defaults_fees_from_course_price() {
        let payload: CreateEnrollmentPayload =
            serde_json::from_value(json!({ "course_id": 2, "candidate_id": 7 })).unwrap();
        let changes = payload.into_changeset(3, 499, at(9)).unwrap();
        assert_eq!(changes.get("total_fees").and_then(|v| v.as_int()), Some(49_900));
        assert_eq!(changes.text("status"), Some("enrolled"));
        assert!(!changes.contains("completed_at"));
    }

    #[test]
    fn create_without_progress_binds_no_nulls_to_required_columns() {
        let payload: CreateEnrollmentPayload =
            serde_json::from_value(json!({ "course_id": 2, "candidate_id": 7 })).unwrap();
        let changes = payload.into_changeset(3, 499, at(9)).unwrap();
        assert!(!changes.contains("progress"));
        assert!(!changes.contains("last_accessed"));
        for column in ["course_id", "candidate_id", "status", "total_fees", "paid_amount", "payment_status"] {
            let value = changes.get(column).unwrap_or_else(|| panic!("{} missing", column));
            assert!(!value.is_null(), "{} bound as NULL", column);
        }
    }

    #[test]
    fn create_with_full_progress_is_completed() {
        let payload: CreateEnrollmentPayload = serde_json::from_value(
            json!({ "course_id": 2, "candidate_id": 7, "progress": 100, "total_fees": 0 }),
        )
        .unwrap();
        let changes = payload.into_changeset(3, 499, at(9)).unwrap();
        assert_eq!(changes.text("status"), Some("completed"));
        assert!(changes.contains("completed_at"));
    }
}
