use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::changeset::Changeset;
use crate::dto::user_dto::UserResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 20))]
    pub mobile: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

impl RegisterPayload {
    /// Self-registered accounts are always active, non-admin users.
    pub fn into_changeset(self, hashed_password: String) -> Changeset {
        let mut changes = Changeset::new();
        changes.value("email", self.email.trim().to_lowercase());
        changes.value("mobile", self.mobile);
        changes.value("hashed_password", hashed_password);
        changes.optional("full_name", self.full_name);
        changes.value("is_active", true);
        changes.value("is_admin", false);
        changes
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[serde(alias = "email", alias = "mobile")]
    #[validate(length(min = 1))]
    pub email_or_mobile: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_accepts_email_or_mobile_keys() {
        let by_email: LoginPayload =
            serde_json::from_value(json!({ "email": "a@b.io", "password": "x" })).unwrap();
        assert_eq!(by_email.email_or_mobile, "a@b.io");
        let by_mobile: LoginPayload =
            serde_json::from_value(json!({ "mobile": "9000000001", "password": "x" })).unwrap();
        assert_eq!(by_mobile.email_or_mobile, "9000000001");
    }

    #[test]
    fn registration_never_grants_admin() {
        let payload: RegisterPayload = serde_json::from_value(json!({
            "email": " New@Example.com ",
            "mobile": "9000000002",
            "password": "secret1",
        }))
        .unwrap();
        let changes = payload.into_changeset("hash".into());
        assert_eq!(changes.text("email"), Some("new@example.com"));
        assert_eq!(
            changes.get("is_admin"),
            Some(&crate::database::changeset::SqlValue::Bool(Some(false)))
        );
    }
}
