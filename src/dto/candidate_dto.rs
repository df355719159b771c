use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::utils::json_field::{self, ObjectList, StringList};
use crate::utils::validation::{
    ensure_email, ensure_min, ensure_non_blank, ensure_optional_one_of, ensure_range,
    CANDIDATE_STATUSES, GENDERS, JOB_STATUSES_OF_CANDIDATE, PREFERRED_JOB_TYPES, PRIORITIES,
    SKILL_LEVELS, WORK_MODES,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 20))]
    pub phone_number: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub gender: Option<String>,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 3, max = 10))]
    pub pincode: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub course: Option<String>,
    pub joining_date: Option<DateTime<Utc>>,
    pub fees_transaction_number: Option<String>,
    pub job_admission: Option<bool>,
    pub profile_title: Option<String>,
    pub current_job_status: Option<String>,
    pub total_experience_years: Option<i32>,
    pub total_experience_months: Option<i32>,
    pub current_employer: Option<String>,
    pub current_job_title: Option<String>,
    pub primary_skills: Option<StringList>,
    pub secondary_skills: Option<StringList>,
    pub skill_proficiency_level: Option<String>,
    pub certifications: Option<StringList>,
    pub highest_qualification: Option<String>,
    pub specialization: Option<String>,
    pub university: Option<String>,
    pub year_of_passing: Option<i32>,
    pub grades: Option<String>,
    pub preferred_job_type: Option<String>,
    pub preferred_industry: Option<String>,
    pub preferred_roles: Option<StringList>,
    pub expected_salary: Option<String>,
    pub work_mode_preference: Option<String>,
    pub notice_period: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub languages: Option<ObjectList>,
    pub work_authorization: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

struct ChoiceFields<'a> {
    gender: Option<&'a str>,
    current_job_status: Option<&'a str>,
    skill_proficiency_level: Option<&'a str>,
    preferred_job_type: Option<&'a str>,
    work_mode_preference: Option<&'a str>,
    status: Option<&'a str>,
    priority: Option<&'a str>,
    total_experience_years: Option<i32>,
    total_experience_months: Option<i32>,
    year_of_passing: Option<i32>,
}

fn check_choices(f: ChoiceFields<'_>) -> Result<()> {
    ensure_optional_one_of("gender", f.gender, GENDERS)?;
    ensure_optional_one_of("current_job_status", f.current_job_status, JOB_STATUSES_OF_CANDIDATE)?;
    ensure_optional_one_of("skill_proficiency_level", f.skill_proficiency_level, SKILL_LEVELS)?;
    ensure_optional_one_of("preferred_job_type", f.preferred_job_type, PREFERRED_JOB_TYPES)?;
    ensure_optional_one_of("work_mode_preference", f.work_mode_preference, WORK_MODES)?;
    ensure_optional_one_of("status", f.status, CANDIDATE_STATUSES)?;
    ensure_optional_one_of("priority", f.priority, PRIORITIES)?;
    if let Some(years) = f.total_experience_years {
        ensure_min("total_experience_years", years, 0)?;
    }
    if let Some(months) = f.total_experience_months {
        ensure_range("total_experience_months", months, 0, 11)?;
    }
    if let Some(year) = f.year_of_passing {
        ensure_range("year_of_passing", year, 1900, 2100)?;
    }
    Ok(())
}

impl CreateCandidatePayload {
    /// `hashed_password` replaces the plaintext `password` of the payload.
    pub fn into_changeset(self, hashed_password: String) -> Result<Changeset> {
        check_choices(ChoiceFields {
            gender: self.gender.as_deref(),
            current_job_status: self.current_job_status.as_deref(),
            skill_proficiency_level: self.skill_proficiency_level.as_deref(),
            preferred_job_type: self.preferred_job_type.as_deref(),
            work_mode_preference: self.work_mode_preference.as_deref(),
            status: self.status.as_deref(),
            priority: self.priority.as_deref(),
            total_experience_years: self.total_experience_years,
            total_experience_months: self.total_experience_months,
            year_of_passing: self.year_of_passing,
        })?;

        let mut changes = Changeset::new();
        changes.value("full_name", self.full_name);
        changes.value("email", self.email.trim().to_lowercase());
        changes.value("phone_number", self.phone_number);
        changes.optional("date_of_birth", self.date_of_birth);
        changes.optional("gender", self.gender);
        changes.value("address", self.address);
        changes.value("pincode", self.pincode);
        changes.value("hashed_password", hashed_password);
        changes.optional("course", self.course);
        changes.optional("joining_date", self.joining_date);
        changes.optional("fees_transaction_number", self.fees_transaction_number);
        changes.value("job_admission", self.job_admission.unwrap_or(false));
        changes.optional("profile_title", self.profile_title);
        changes.optional("current_job_status", self.current_job_status);
        changes.optional("total_experience_years", self.total_experience_years);
        changes.optional("total_experience_months", self.total_experience_months);
        changes.optional("current_employer", self.current_employer);
        changes.optional("current_job_title", self.current_job_title);
        changes.list("primary_skills", self.primary_skills)?;
        changes.list("secondary_skills", self.secondary_skills)?;
        changes.optional("skill_proficiency_level", self.skill_proficiency_level);
        changes.list("certifications", self.certifications)?;
        changes.optional("highest_qualification", self.highest_qualification);
        changes.optional("specialization", self.specialization);
        changes.optional("university", self.university);
        changes.optional("year_of_passing", self.year_of_passing);
        changes.optional("grades", self.grades);
        changes.optional("preferred_job_type", self.preferred_job_type);
        changes.optional("preferred_industry", self.preferred_industry);
        changes.list("preferred_roles", self.preferred_roles)?;
        changes.optional("expected_salary", self.expected_salary);
        changes.optional("work_mode_preference", self.work_mode_preference);
        changes.optional("notice_period", self.notice_period);
        changes.optional("linkedin_url", self.linkedin_url);
        changes.optional("portfolio_url", self.portfolio_url);
        changes.list("languages", self.languages)?;
        changes.optional("work_authorization", self.work_authorization);
        changes.value("status", self.status.unwrap_or_else(|| "pending".to_string()));
        changes.value("priority", self.priority.unwrap_or_else(|| "medium".to_string()));
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateCandidatePayload {
    pub full_name: Patch<String>,
    pub email: Patch<String>,
    pub phone_number: Patch<String>,
    pub date_of_birth: Patch<DateTime<Utc>>,
    pub gender: Patch<String>,
    pub address: Patch<String>,
    pub pincode: Patch<String>,
    pub password: Patch<String>,
    pub course: Patch<String>,
    pub joining_date: Patch<DateTime<Utc>>,
    pub fees_transaction_number: Patch<String>,
    pub job_admission: Patch<bool>,
    pub profile_title: Patch<String>,
    pub current_job_status: Patch<String>,
    pub total_experience_years: Patch<i32>,
    pub total_experience_months: Patch<i32>,
    pub current_employer: Patch<String>,
    pub current_job_title: Patch<String>,
    pub primary_skills: Patch<StringList>,
    pub secondary_skills: Patch<StringList>,
    pub skill_proficiency_level: Patch<String>,
    pub certifications: Patch<StringList>,
    pub highest_qualification: Patch<String>,
    pub specialization: Patch<String>,
    pub university: Patch<String>,
    pub year_of_passing: Patch<i32>,
    pub grades: Patch<String>,
    pub preferred_job_type: Patch<String>,
    pub preferred_industry: Patch<String>,
    pub preferred_roles: Patch<StringList>,
    pub expected_salary: Patch<String>,
    pub work_mode_preference: Patch<String>,
    pub notice_period: Patch<String>,
    pub linkedin_url: Patch<String>,
    pub portfolio_url: Patch<String>,
    pub languages: Patch<ObjectList>,
    pub work_authorization: Patch<String>,
    pub status: Patch<String>,
    pub priority: Patch<String>,
}

impl UpdateCandidatePayload {
    pub fn new_password(&self) -> Result<Option<&str>> {
        match &self.password {
            Patch::Missing => Ok(None),
            Patch::Null => Err(Error::Invalid("password cannot be null".to_string())),
            Patch::Value(p) if p.len() < 6 => Err(Error::Invalid(
                "password must be at least 6 characters".to_string(),
            )),
            Patch::Value(p) => Ok(Some(p.as_str())),
        }
    }

    /// `hashed_password` must be the hash of [`Self::new_password`], if any.
    pub fn into_changeset(self, hashed_password: Option<String>) -> Result<Changeset> {
        check_choices(ChoiceFields {
            gender: self.gender.value().map(String::as_str),
            current_job_status: self.current_job_status.value().map(String::as_str),
            skill_proficiency_level: self.skill_proficiency_level.value().map(String::as_str),
            preferred_job_type: self.preferred_job_type.value().map(String::as_str),
            work_mode_preference: self.work_mode_preference.value().map(String::as_str),
            status: self.status.value().map(String::as_str),
            priority: self.priority.value().map(String::as_str),
            total_experience_years: self.total_experience_years.value().copied(),
            total_experience_months: self.total_experience_months.value().copied(),
            year_of_passing: self.year_of_passing.value().copied(),
        })?;
        if let Some(email) = self.email.value() {
            ensure_email("email", email)?;
        }
        if let Some(name) = self.full_name.value() {
            ensure_non_blank("full_name", name)?;
        }

        let mut changes = Changeset::new();
        changes.patch_required("full_name", self.full_name)?;
        changes.patch_required("email", self.email.map(|e| e.trim().to_lowercase()))?;
        changes.patch_required("phone_number", self.phone_number)?;
        changes.patch("date_of_birth", self.date_of_birth);
        changes.patch("gender", self.gender);
        changes.patch_required("address", self.address)?;
        changes.patch_required("pincode", self.pincode)?;
        if let Some(hash) = hashed_password {
            changes.value("hashed_password", hash);
        }
        changes.patch("course", self.course);
        changes.patch("joining_date", self.joining_date);
        changes.patch("fees_transaction_number", self.fees_transaction_number);
        changes.patch_required("job_admission", self.job_admission)?;
        changes.patch("profile_title", self.profile_title);
        changes.patch("current_job_status", self.current_job_status);
        changes.patch("total_experience_years", self.total_experience_years);
        changes.patch("total_experience_months", self.total_experience_months);
        changes.patch("current_employer", self.current_employer);
        changes.patch("current_job_title", self.current_job_title);
        changes.patch_list("primary_skills", self.primary_skills)?;
        changes.patch_list("secondary_skills", self.secondary_skills)?;
        changes.patch("skill_proficiency_level", self.skill_proficiency_level);
        changes.patch_list("certifications", self.certifications)?;
        changes.patch("highest_qualification", self.highest_qualification);
        changes.patch("specialization", self.specialization);
        changes.patch("university", self.university);
        changes.patch("year_of_passing", self.year_of_passing);
        changes.patch("grades", self.grades);
        changes.patch("preferred_job_type", self.preferred_job_type);
        changes.patch("preferred_industry", self.preferred_industry);
        changes.patch_list("preferred_roles", self.preferred_roles)?;
        changes.patch("expected_salary", self.expected_salary);
        changes.patch("work_mode_preference", self.work_mode_preference);
        changes.patch("notice_period", self.notice_period);
        changes.patch("linkedin_url", self.linkedin_url);
        changes.patch("portfolio_url", self.portfolio_url);
        changes.patch_list("languages", self.languages)?;
        changes.patch("work_authorization", self.work_authorization);
        changes.patch_required("status", self.status)?;
        changes.patch_required("priority", self.priority)?;
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
}

impl CandidateListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub gender: Option<String>,
    pub address: String,
    pub pincode: String,
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
    pub primary_skills: Option<StringList>,
    pub secondary_skills: Option<StringList>,
    pub skill_proficiency_level: Option<String>,
    pub certifications: Option<StringList>,
    pub highest_qualification: Option<String>,
    pub specialization: Option<String>,
    pub university: Option<String>,
    pub year_of_passing: Option<i32>,
    pub grades: Option<String>,
    pub preferred_job_type: Option<String>,
    pub preferred_industry: Option<String>,
    pub preferred_roles: Option<StringList>,
    pub expected_salary: Option<String>,
    pub work_mode_preference: Option<String>,
    pub notice_period: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub languages: Option<ObjectList>,
    pub work_authorization: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Candidate> for CandidateResponse {
    type Error = Error;

    fn try_from(c: Candidate) -> Result<Self> {
        Ok(Self {
            primary_skills: json_field::decode("primary_skills", c.primary_skills.as_deref())?,
            secondary_skills: json_field::decode("secondary_skills", c.secondary_skills.as_deref())?,
            certifications: json_field::decode("certifications", c.certifications.as_deref())?,
            preferred_roles: json_field::decode("preferred_roles", c.preferred_roles.as_deref())?,
            languages: json_field::decode("languages", c.languages.as_deref())?,
            id: c.id,
            full_name: c.full_name,
            email: c.email,
            phone_number: c.phone_number,
            date_of_birth: c.date_of_birth,
            gender: c.gender,
            address: c.address,
            pincode: c.pincode,
            course: c.course,
            joining_date: c.joining_date,
            fees_transaction_number: c.fees_transaction_number,
            job_admission: c.job_admission,
            profile_title: c.profile_title,
            current_job_status: c.current_job_status,
            total_experience_years: c.total_experience_years,
            total_experience_months: c.total_experience_months,
            current_employer: c.current_employer,
            current_job_title: c.current_job_title,
            skill_proficiency_level: c.skill_proficiency_level,
            highest_qualification: c.highest_qualification,
            specialization: c.specialization,
            university: c.university,
            year_of_passing: c.year_of_passing,
            grades: c.grades,
            preferred_job_type: c.preferred_job_type,
            preferred_industry: c.preferred_industry,
            expected_salary: c.expected_salary,
            work_mode_preference: c.work_mode_preference,
            notice_period: c.notice_period,
            linkedin_url: c.linkedin_url,
            portfolio_url: c.portfolio_url,
            work_authorization: c.work_authorization,
            status: c.status,
            priority: c.priority,
            created_at: c.created_at,
            updated_at: c.updated_at,
        })
    }
}
