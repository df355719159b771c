//! Bearer-token extractors.
//!
//! Handlers take [`AuthUser`] to require any signed-in, active user and
//! [`AdminUser`] to require the admin role. The account is re-loaded on
//! every request, so deactivation and demotion apply to live tokens.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::Error;
use crate::utils::token::verify_token;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub is_admin: bool,
}

impl AuthUser {
    /// Admins may act on any record; everyone else only on their own.
    pub fn ensure_self_or_admin(&self, user_id: i32) -> Result<(), Error> {
        if self.is_admin || self.user_id == user_id {
            Ok(())
        } else {
            tracing::warn!(caller = self.user_id, target = user_id, "Rejected access to another user");
            Err(Error::Forbidden("Not enough permissions".to_string()))
        }
    }

    /// Like [`Self::ensure_self_or_admin`] for records with an optional owner;
    /// unowned records are admin-only.
    pub fn ensure_owner_or_admin(&self, owner: Option<i32>) -> Result<(), Error> {
        match owner {
            Some(user_id) => self.ensure_self_or_admin(user_id),
            None if self.is_admin => Ok(()),
            None => Err(Error::Forbidden("Not enough permissions".to_string())),
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, Error> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("Malformed Authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("Expected: Bearer <token>".to_string()))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
            tracing::warn!(path = %parts.uri.path(), "Rejected bearer token");
            e
        })?;
        let user_id = claims.user_id()?;

        // Roles and activation are read from the account, not the token.
        let user = match state.user_service.get_by_id(user_id).await {
            Ok(user) => user,
            Err(Error::NotFound(_)) => {
                tracing::warn!(user_id, "Token subject no longer exists");
                return Err(Error::Unauthorized("Could not validate credentials".to_string()));
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            tracing::warn!(user_id, "Inactive account presented a token");
            return Err(Error::Unauthorized("Inactive user".to_string()));
        }
        if claims.is_admin() != user.is_admin {
            tracing::info!(user_id, is_admin = user.is_admin, "Role changed since token was issued");
        }

        Ok(AuthUser {
            user_id: user.id,
            is_admin: user.is_admin,
        })
    }
}

pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = user.user_id, path = %parts.uri.path(), "Admin role required");
            return Err(Error::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}
