use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::{Error, Result};
use crate::models::enquiry::Enquiry;
use crate::utils::json_field::{self, StringList};
use crate::utils::validation::{
    ensure_email, ensure_optional_one_of, ensure_range, ENQUIRY_STATUSES, PRIORITIES,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEnquiryPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 20))]
    pub mobile: String,
    #[validate(range(min = 1900, max = 2100))]
    pub pass_out_year: i32,
    pub technology: Option<StringList>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl CreateEnquiryPayload {
    pub fn into_changeset(self) -> Result<Changeset> {
        ensure_optional_one_of("status", self.status.as_deref(), ENQUIRY_STATUSES)?;
        ensure_optional_one_of("priority", self.priority.as_deref(), PRIORITIES)?;
        ensure_range("pass_out_year", self.pass_out_year, 1900, 2100)?;

        let mut changes = Changeset::new();
        changes.value("name", self.name);
        changes.value("email", self.email.trim().to_lowercase());
        changes.value("mobile", self.mobile);
        changes.value("pass_out_year", self.pass_out_year);
        changes.list("technology", self.technology)?;
        changes.value("status", self.status.unwrap_or_else(|| "pending".to_string()));
        changes.value("priority", self.priority.unwrap_or_else(|| "medium".to_string()));
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateEnquiryPayload {
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub mobile: Patch<String>,
    pub pass_out_year: Patch<i32>,
    pub technology: Patch<StringList>,
    pub status: Patch<String>,
    pub priority: Patch<String>,
}

impl UpdateEnquiryPayload {
    pub fn into_changeset(self) -> Result<Changeset> {
        ensure_optional_one_of("status", self.status.value().map(String::as_str), ENQUIRY_STATUSES)?;
        ensure_optional_one_of("priority", self.priority.value().map(String::as_str), PRIORITIES)?;
        if let Some(year) = self.pass_out_year.value() {
            ensure_range("pass_out_year", *year, 1900, 2100)?;
        }
        if let Some(email) = self.email.value() {
            ensure_email("email", email)?;
        }

        let mut changes = Changeset::new();
        changes.patch_required("name", self.name)?;
        changes.patch_required("email", self.email.map(|e| e.trim().to_lowercase()))?;
        changes.patch_required("mobile", self.mobile)?;
        changes.patch_required("pass_out_year", self.pass_out_year)?;
        changes.patch_list("technology", self.technology)?;
        changes.patch_required("status", self.status)?;
        changes.patch_required("priority", self.priority)?;
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnquiryListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub technology: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl EnquiryListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub pass_out_year: i32,
    pub technology: Option<StringList>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Enquiry> for EnquiryResponse {
    type Error = Error;

    fn try_from(e: Enquiry) -> Result<Self> {
        Ok(Self {
            technology: json_field::decode("technology", e.technology.as_deref())?,
            id: e.id,
            name: e.name,
            email: e.email,
            mobile: e.mobile,
            pass_out_year: e.pass_out_year,
            status: e.status,
            priority: e.priority,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn create_validates_year_and_email() {
        let payload: CreateEnquiryPayload = serde_json::from_value(json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "mobile": "9876543210",
            "pass_out_year": 1850,
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn status_patch_is_checked() {
        let payload: UpdateEnquiryPayload =
            serde_json::from_value(json!({ "status": "contacted" })).unwrap();
        let changes = payload.into_changeset().unwrap();
        assert_eq!(changes.text("status"), Some("contacted"));

        let payload: UpdateEnquiryPayload =
            serde_json::from_value(json!({ "status": "ghosted" })).unwrap();
        assert!(payload.into_changeset().is_err());
    }
}
