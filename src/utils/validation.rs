use validator::ValidateEmail;

use crate::error::{Error, Result};

pub const PRIORITIES: &[&str] = &["low", "medium", "high"];

pub const COURSE_STATUSES: &[&str] = &["draft", "published", "archived"];
pub const COURSE_CATEGORIES: &[&str] = &[
    "frontend", "web", "business", "data", "devops", "database", "support",
];
pub const COURSE_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];

pub const CANDIDATE_STATUSES: &[&str] = &["pending", "approved", "rejected"];
pub const GENDERS: &[&str] = &["male", "female", "other", "prefer-not-to-say"];
pub const JOB_STATUSES_OF_CANDIDATE: &[&str] = &["employed", "unemployed", "student"];
pub const SKILL_LEVELS: &[&str] = &["beginner", "intermediate", "advanced", "expert"];
pub const PREFERRED_JOB_TYPES: &[&str] = &["full-time", "part-time", "internship", "remote"];

pub const JOB_STATUSES: &[&str] = &["active", "closed", "draft"];
pub const JOB_TYPES: &[&str] = &["full-time", "part-time", "contract", "internship", "freelance"];
pub const WORK_MODES: &[&str] = &["on-site", "hybrid", "remote"];
pub const SHIFT_TIMINGS: &[&str] = &["day", "night", "rotational"];

pub const ENQUIRY_STATUSES: &[&str] = &["pending", "contacted", "enrolled", "rejected"];

pub const APPLICATION_STATUSES: &[&str] = &[
    "applied",
    "under_review",
    "shortlisted",
    "interviewed",
    "offered",
    "rejected",
    "withdrawn",
];

pub const ENROLLMENT_STATUSES: &[&str] = &["enrolled", "in_progress", "completed", "dropped", "suspended"];
pub const PAYMENT_STATUSES: &[&str] = &["pending", "partial", "paid", "refunded"];

pub fn ensure_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(Error::Invalid(format!(
            "Invalid {}: {}. Must be one of: {}",
            field,
            value,
            allowed.join(", ")
        )))
    }
}

pub fn ensure_optional_one_of(field: &str, value: Option<&str>, allowed: &[&str]) -> Result<()> {
    match value {
        Some(v) => ensure_one_of(field, v, allowed),
        None => Ok(()),
    }
}

pub fn ensure_range(field: &str, value: i32, min: i32, max: i32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::Invalid(format!(
            "{} must be between {} and {}",
            field, min, max
        )))
    }
}

pub fn ensure_min(field: &str, value: i32, min: i32) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(Error::Invalid(format!("{} must be at least {}", field, min)))
    }
}

pub fn ensure_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Invalid(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

pub fn ensure_email(field: &str, value: &str) -> Result<()> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(Error::Invalid(format!("{} is not a valid email address", field)))
    }
}

/// Progress is stored as a percentage; anything outside 0..=100 is pulled to the nearest bound.
pub fn clamp_progress(progress: i32) -> i32 {
    progress.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn closed_sets_reject_unknown_values() {
        assert_ok!(ensure_one_of("status", "published", COURSE_STATUSES));
        let err = assert_err!(ensure_one_of("status", "deleted", COURSE_STATUSES));
        assert!(matches!(err, Error::Invalid(ref msg) if msg.contains("draft, published, archived")));
        assert_ok!(ensure_optional_one_of("priority", None, PRIORITIES));
        assert_err!(ensure_optional_one_of("priority", Some("urgent"), PRIORITIES));
    }

    #[test]
    fn numeric_bounds() {
        assert_ok!(ensure_range("pass_out_year", 2021, 1900, 2100));
        assert_err!(ensure_range("pass_out_year", 1800, 1900, 2100));
        assert_err!(ensure_min("price", -1, 0));
        assert_eq!(clamp_progress(140), 100);
        assert_eq!(clamp_progress(-3), 0);
        assert_eq!(clamp_progress(55), 55);
    }

    #[test]
    fn email_and_blank_checks() {
        assert_ok!(ensure_email("email", "student@codexa.dev"));
        assert_err!(ensure_email("email", "not-an-email"));
        assert_err!(ensure_non_blank("name", "   "));
    }
}
