use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::changeset::Changeset;
use crate::database::listing::PageParams;
use crate::dto::patch::Patch;
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::validation::{ensure_email, ensure_non_blank};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateUserPayload {
    pub email: Patch<String>,
    pub mobile: Patch<String>,
    pub full_name: Patch<String>,
    pub password: Patch<String>,
    pub is_active: Patch<bool>,
    pub is_admin: Patch<bool>,
}

impl UpdateUserPayload {
    /// True when the payload tries to change account flags only admins may set.
    pub fn touches_privileges(&self) -> bool {
        !self.is_active.is_missing() || !self.is_admin.is_missing()
    }

    pub fn new_password(&self) -> Result<Option<&str>> {
        match &self.password {
            Patch::Missing => Ok(None),
            Patch::Null => Err(Error::Invalid("password cannot be null".to_string())),
            Patch::Value(p) if p.len() < MIN_PASSWORD_LEN => Err(Error::Invalid(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ))),
            Patch::Value(p) => Ok(Some(p.as_str())),
        }
    }

    pub fn into_changeset(self, hashed_password: Option<String>) -> Result<Changeset> {
        if let Some(email) = self.email.value() {
            ensure_email("email", email)?;
        }
        if let Some(mobile) = self.mobile.value() {
            ensure_non_blank("mobile", mobile)?;
        }

        let mut changes = Changeset::new();
        changes.patch_required("email", self.email.map(|e| e.trim().to_lowercase()))?;
        changes.patch_required("mobile", self.mobile)?;
        changes.patch("full_name", self.full_name);
        if let Some(hash) = hashed_password {
            changes.value("hashed_password", hash);
        }
        changes.patch_required("is_active", self.is_active)?;
        changes.patch_required("is_admin", self.is_admin)?;
        Ok(changes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl UserListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub mobile: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            mobile: u.mobile,
            full_name: u.full_name,
            is_active: u.is_active,
            is_admin: u.is_admin,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn privilege_flags_are_detected() {
        let payload: UpdateUserPayload = serde_json::from_value(json!({ "full_name": "A" })).unwrap();
        assert!(!payload.touches_privileges());
        let payload: UpdateUserPayload = serde_json::from_value(json!({ "is_admin": true })).unwrap();
        assert!(payload.touches_privileges());
    }

    #[test]
    fn password_is_replaced_by_hash() {
        let payload: UpdateUserPayload =
            serde_json::from_value(json!({ "password": "longenough" })).unwrap();
        assert_eq!(payload.new_password().unwrap(), Some("longenough"));
        let changes = payload.into_changeset(Some("hashed".into())).unwrap();
        assert_eq!(changes.text("hashed_password"), Some("hashed"));
        assert!(!changes.contains("password"));

        let payload: UpdateUserPayload = serde_json::from_value(json!({ "password": "abc" })).unwrap();
        assert!(payload.new_password().is_err());
    }

    #[test]
    fn required_flags_cannot_be_cleared() {
        let payload: UpdateUserPayload = serde_json::from_value(json!({ "is_active": null })).unwrap();
        assert!(payload.into_changeset(None).is_err());
    }
}
