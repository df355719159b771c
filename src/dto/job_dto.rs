use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::utils::json_field::{self, ObjectList, StringList};
use crate::utils::validation::{
    ensure_min, ensure_non_blank, ensure_one_of, ensure_optional_one_of, JOB_STATUSES, JOB_TYPES,
    PRIORITIES, SHIFT_TIMINGS, WORK_MODES,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 255))]
    pub job_title: String,
    #[validate(length(min = 1))]
    pub job_description: String,
    pub job_type: String,
    pub work_mode: String,
    #[validate(length(min = 1, max = 100))]
    pub industry: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
    pub company_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    pub company_location: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub required_skills: Option<StringList>,
    pub preferred_skills: Option<StringList>,
    pub experience_min_years: Option<i32>,
    pub experience_max_years: Option<i32>,
    pub education_required: Option<String>,
    pub certifications: Option<StringList>,
    pub languages: Option<ObjectList>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    pub additional_benefits: Option<StringList>,
    pub number_of_openings: Option<i32>,
    pub employment_start_date: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub shift_timing: Option<String>,
    pub notice_period_preference: Option<String>,
    pub work_authorization_requirements: Option<StringList>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub posted_by: Option<String>,
}

fn check_bounds(min: Option<i32>, max: Option<i32>, what: &str) -> Result<()> {
    if let Some(min) = min {
        ensure_min(&format!("{}_min", what), min, 0)?;
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(Error::Invalid(format!(
                "{} minimum cannot exceed {} maximum",
                what, what
            )));
        }
    }
    Ok(())
}

impl CreateJobPayload {
    /// `caller_id` becomes `posted_by` when the payload does not name a poster.
    pub fn into_changeset(self, caller_id: i32) -> Result<Changeset> {
        ensure_one_of("job_type", &self.job_type, JOB_TYPES)?;
        ensure_one_of("work_mode", &self.work_mode, WORK_MODES)?;
        ensure_optional_one_of("shift_timing", self.shift_timing.as_deref(), SHIFT_TIMINGS)?;
        ensure_optional_one_of("status", self.status.as_deref(), JOB_STATUSES)?;
        ensure_optional_one_of("priority", self.priority.as_deref(), PRIORITIES)?;
        check_bounds(self.salary_min, self.salary_max, "salary")?;
        check_bounds(self.experience_min_years, self.experience_max_years, "experience")?;
        if let Some(openings) = self.number_of_openings {
            ensure_min("number_of_openings", openings, 1)?;
        }

        let mut changes = Changeset::new();
        changes.value("job_title", self.job_title);
        changes.value("job_description", self.job_description);
        changes.value("job_type", self.job_type);
        changes.value("work_mode", self.work_mode);
        changes.value("industry", self.industry);
        changes.value("department", self.department);
        changes.value("role", self.role);
        changes.optional("company_id", self.company_id);
        changes.value("company_name", self.company_name);
        changes.optional("company_location", self.company_location);
        changes.value("location", self.location);
        changes.value("city", self.city);
        changes.optional("state", self.state);
        changes.optional("country", self.country);
        changes.optional("pincode", self.pincode);
        changes.list("required_skills", self.required_skills)?;
        changes.list("preferred_skills", self.preferred_skills)?;
        changes.optional("experience_min_years", self.experience_min_years);
        changes.optional("experience_max_years", self.experience_max_years);
        changes.optional("education_required", self.education_required);
        changes.list("certifications", self.certifications)?;
        changes.list("languages", self.languages)?;
        changes.optional("salary_min", self.salary_min);
        changes.optional("salary_max", self.salary_max);
        changes.value("currency", self.currency.unwrap_or_else(|| "USD".to_string()));
        changes.list("additional_benefits", self.additional_benefits)?;
        changes.value("number_of_openings", self.number_of_openings.unwrap_or(1));
        changes.optional("employment_start_date", self.employment_start_date);
        changes.optional("application_deadline", self.application_deadline);
        changes.optional("shift_timing", self.shift_timing);
        changes.optional("notice_period_preference", self.notice_period_preference);
        changes.list("work_authorization_requirements", self.work_authorization_requirements)?;
        changes.value("status", self.status.unwrap_or_else(|| "active".to_string()));
        changes.value("priority", self.priority.unwrap_or_else(|| "medium".to_string()));
        changes.value("posted_by", self.posted_by.unwrap_or_else(|| caller_id.to_string()));
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateJobPayload {
    pub job_title: Patch<String>,
    pub job_description: Patch<String>,
    pub job_type: Patch<String>,
    pub work_mode: Patch<String>,
    pub industry: Patch<String>,
    pub department: Patch<String>,
    pub role: Patch<String>,
    pub company_id: Patch<String>,
    pub company_name: Patch<String>,
    pub company_location: Patch<String>,
    pub location: Patch<String>,
    pub city: Patch<String>,
    pub state: Patch<String>,
    pub country: Patch<String>,
    pub pincode: Patch<String>,
    pub required_skills: Patch<StringList>,
    pub preferred_skills: Patch<StringList>,
    pub experience_min_years: Patch<i32>,
    pub experience_max_years: Patch<i32>,
    pub education_required: Patch<String>,
    pub certifications: Patch<StringList>,
    pub languages: Patch<ObjectList>,
    pub salary_min: Patch<i32>,
    pub salary_max: Patch<i32>,
    pub currency: Patch<String>,
    pub additional_benefits: Patch<StringList>,
    pub number_of_openings: Patch<i32>,
    pub employment_start_date: Patch<DateTime<Utc>>,
    pub application_deadline: Patch<DateTime<Utc>>,
    pub shift_timing: Patch<String>,
    pub notice_period_preference: Patch<String>,
    pub work_authorization_requirements: Patch<StringList>,
    pub status: Patch<String>,
    pub priority: Patch<String>,
    pub posted_by: Patch<String>,
}

impl UpdateJobPayload {
    pub fn into_changeset(self) -> Result<Changeset> {
        ensure_optional_one_of("job_type", self.job_type.value().map(String::as_str), JOB_TYPES)?;
        ensure_optional_one_of("work_mode", self.work_mode.value().map(String::as_str), WORK_MODES)?;
        ensure_optional_one_of(
            "shift_timing",
            self.shift_timing.value().map(String::as_str),
            SHIFT_TIMINGS,
        )?;
        ensure_optional_one_of("status", self.status.value().map(String::as_str), JOB_STATUSES)?;
        ensure_optional_one_of("priority", self.priority.value().map(String::as_str), PRIORITIES)?;
        check_bounds(self.salary_min.value().copied(), self.salary_max.value().copied(), "salary")?;
        check_bounds(
            self.experience_min_years.value().copied(),
            self.experience_max_years.value().copied(),
            "experience",
        )?;
        if let Some(openings) = self.number_of_openings.value() {
            ensure_min("number_of_openings", *openings, 1)?;
        }
        if let Some(title) = self.job_title.value() {
            ensure_non_blank("job_title", title)?;
        }

        let mut changes = Changeset::new();
        changes.patch_required("job_title", self.job_title)?;
        changes.patch_required("job_description", self.job_description)?;
        changes.patch_required("job_type", self.job_type)?;
        changes.patch_required("work_mode", self.work_mode)?;
        changes.patch_required("industry", self.industry)?;
        changes.patch_required("department", self.department)?;
        changes.patch_required("role", self.role)?;
        changes.patch("company_id", self.company_id);
        changes.patch_required("company_name", self.company_name)?;
        changes.patch("company_location", self.company_location);
        changes.patch_required("location", self.location)?;
        changes.patch_required("city", self.city)?;
        changes.patch("state", self.state);
        changes.patch("country", self.country);
        changes.patch("pincode", self.pincode);
        changes.patch_list("required_skills", self.required_skills)?;
        changes.patch_list("preferred_skills", self.preferred_skills)?;
        changes.patch("experience_min_years", self.experience_min_years);
        changes.patch("experience_max_years", self.experience_max_years);
        changes.patch("education_required", self.education_required);
        changes.patch_list("certifications", self.certifications)?;
        changes.patch_list("languages", self.languages)?;
        changes.patch("salary_min", self.salary_min);
        changes.patch("salary_max", self.salary_max);
        changes.patch_required("currency", self.currency)?;
        changes.patch_list("additional_benefits", self.additional_benefits)?;
        changes.patch_required("number_of_openings", self.number_of_openings)?;
        changes.patch("employment_start_date", self.employment_start_date);
        changes.patch("application_deadline", self.application_deadline);
        changes.patch("shift_timing", self.shift_timing);
        changes.patch("notice_period_preference", self.notice_period_preference);
        changes.patch_list("work_authorization_requirements", self.work_authorization_requirements)?;
        changes.patch_required("status", self.status)?;
        changes.patch_required("priority", self.priority)?;
        changes.patch_required("posted_by", self.posted_by)?;
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub company_name: Option<String>,
    pub city: Option<String>,
    pub job_type: Option<String>,
    pub work_mode: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
}

impl JobListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
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
    pub required_skills: Option<StringList>,
    pub preferred_skills: Option<StringList>,
    pub experience_min_years: Option<i32>,
    pub experience_max_years: Option<i32>,
    pub education_required: Option<String>,
    pub certifications: Option<StringList>,
    pub languages: Option<ObjectList>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: String,
    pub additional_benefits: Option<StringList>,
    pub number_of_openings: i32,
    pub employment_start_date: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub shift_timing: Option<String>,
    pub notice_period_preference: Option<String>,
    pub work_authorization_requirements: Option<StringList>,
    pub status: String,
    pub priority: String,
    pub date_posted: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub posted_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Job> for JobResponse {
    type Error = Error;

    fn try_from(j: Job) -> Result<Self> {
        Ok(Self {
            required_skills: json_field::decode("required_skills", j.required_skills.as_deref())?,
            preferred_skills: json_field::decode("preferred_skills", j.preferred_skills.as_deref())?,
            certifications: json_field::decode("certifications", j.certifications.as_deref())?,
            languages: json_field::decode("languages", j.languages.as_deref())?,
            additional_benefits: json_field::decode(
                "additional_benefits",
                j.additional_benefits.as_deref(),
            )?,
            work_authorization_requirements: json_field::decode(
                "work_authorization_requirements",
                j.work_authorization_requirements.as_deref(),
            )?,
            id: j.id,
            job_title: j.job_title,
            job_description: j.job_description,
            job_type: j.job_type,
            work_mode: j.work_mode,
            industry: j.industry,
            department: j.department,
            role: j.role,
            company_id: j.company_id,
            company_name: j.company_name,
            company_location: j.company_location,
            location: j.location,
            city: j.city,
            state: j.state,
            country: j.country,
            pincode: j.pincode,
            experience_min_years: j.experience_min_years,
            experience_max_years: j.experience_max_years,
            education_required: j.education_required,
            salary_min: j.salary_min,
            salary_max: j.salary_max,
            currency: j.currency,
            number_of_openings: j.number_of_openings,
            employment_start_date: j.employment_start_date,
            application_deadline: j.application_deadline,
            shift_timing: j.shift_timing,
            notice_period_preference: j.notice_period_preference,
            status: j.status,
            priority: j.priority,
            date_posted: j.date_posted,
            last_updated: j.last_updated,
            posted_by: j.posted_by,
            created_at: j.created_at,
            updated_at: j.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "job_title": "Backend Engineer",
            "job_description": "Build APIs",
            "job_type": "full-time",
            "work_mode": "hybrid",
            "industry": "Software",
            "department": "Engineering",
            "role": "Developer",
            "company_name": "Acme",
            "location": "Bengaluru, KA",
            "city": "Bengaluru",
        })
    }

    #[test]
    fn create_fills_defaults_from_caller() {
        let payload: CreateJobPayload = serde_json::from_value(create_body()).unwrap();
        let changes = payload.into_changeset(42).unwrap();
        assert_eq!(changes.text("posted_by"), Some("42"));
        assert_eq!(changes.text("currency"), Some("USD"));
        assert_eq!(changes.text("status"), Some("active"));
    }

    #[test]
    fn create_rejects_inverted_salary_range() {
        let mut body = create_body();
        body["salary_min"] = json!(90000);
        body["salary_max"] = json!(50000);
        let payload: CreateJobPayload = serde_json::from_value(body).unwrap();
        assert!(matches!(payload.into_changeset(1), Err(Error::Invalid(_))));
    }

    #[test]
    fn update_rejects_unknown_work_mode() {
        let payload: UpdateJobPayload =
            serde_json::from_value(json!({ "work_mode": "moon" })).unwrap();
        assert!(payload.into_changeset().is_err());
    }
}
