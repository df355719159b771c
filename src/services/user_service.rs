use sqlx::PgPool;

use crate::config::AdminBootstrap;
use crate::database::changeset::{insert_returning, update_returning, Changeset};
use crate::database::listing::{fetch_page, ListQuery, Page};
use crate::database::records::{delete_by_id, find_by_id, find_for_update};
use crate::database::uniqueness::{ensure_unique, UniqueKey};
use crate::dto::auth_dto::RegisterPayload;
use crate::dto::stats_dto::UserStats;
use crate::dto::user_dto::{UpdateUserPayload, UserListQuery};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::time::{days_ago, now};

const TABLE: &str = "users";
const ENTITY: &str = "User";
const UNIQUE_COLUMNS: &[&str] = &["email", "mobile"];
const BAD_CREDENTIALS: &str = "Incorrect email/mobile or password";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let hashed = hash_password(&payload.password)?;
        let changes = payload.into_changeset(hashed);
        let user = self.insert(changes).await?;
        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Looks the account up by email (case-insensitive) or mobile.
    pub async fn authenticate(&self, email_or_mobile: &str, password: &str) -> Result<User> {
        let login = email_or_mobile.trim();
        let user: Option<User> =
            sqlx::query_as("SELECT * FROM users WHERE email = $1 OR mobile = $2 LIMIT 1")
                .bind(login.to_lowercase())
                .bind(login)
                .fetch_optional(&self.pool)
                .await?;

        let user = match user {
            Some(u) if verify_password(password, &u.hashed_password) => u,
            _ => {
                tracing::warn!("Login rejected: bad credentials");
                return Err(Error::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
        };
        if !user.is_active {
            tracing::warn!(user_id = user.id, "Login rejected: account inactive");
            return Err(Error::Unauthorized("Account is inactive".to_string()));
        }
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))
    }

    pub async fn list(&self, query: UserListQuery) -> Result<Page<User>> {
        let list = ListQuery::new(query.page())
            .search(&["full_name", "email", "mobile"], query.search)
            .bool_eq("is_active", query.is_active)
            .bool_eq("is_admin", query.is_admin);
        fetch_page(&self.pool, TABLE, "created_at DESC, id DESC", &list).await
    }

    pub async fn update(&self, id: i32, payload: UpdateUserPayload) -> Result<User> {
        let hashed = match payload.new_password()? {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        let mut changes = payload.into_changeset(hashed)?;
        changes.touch(now());

        let mut tx = self.pool.begin().await?;
        find_for_update::<User>(&mut tx, TABLE, id)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        ensure_unique(&mut tx, TABLE, &UniqueKey::from_changes(&changes, UNIQUE_COLUMNS), Some(id)).await?;
        let user = update_returning::<User>(&mut tx, TABLE, id, &changes)
            .await?
            .ok_or_else(|| Error::not_found(ENTITY))?;
        tx.commit().await?;

        tracing::info!(user_id = id, columns = changes.len(), "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !delete_by_id(&mut tx, TABLE, id).await? {
            return Err(Error::not_found(ENTITY));
        }
        tx.commit().await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                COUNT(*) AS total_users,
                COUNT(*) FILTER (WHERE is_active) AS active_users,
                COUNT(*) FILTER (WHERE NOT is_active) AS inactive_users,
                COUNT(*) FILTER (WHERE is_admin) AS admin_users,
                COUNT(*) FILTER (WHERE NOT is_admin) AS regular_users,
                COUNT(*) FILTER (WHERE created_at >= $1) AS recent_registrations
            FROM users
            "#,
        )
        .bind(days_ago(30))
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    /// Creates the configured admin account, or promotes and reactivates an
    /// existing account with the same email. The stored password is left as is
    /// for an existing account.
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> Result<User> {
        let email = admin.email.trim().to_lowercase();
        let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        match existing {
            Some(user) if user.is_admin && user.is_active => Ok(user),
            Some(user) => {
                let mut changes = Changeset::new();
                changes.value("is_admin", true);
                changes.value("is_active", true);
                changes.touch(now());
                let mut tx = self.pool.begin().await?;
                let promoted = update_returning::<User>(&mut tx, TABLE, user.id, &changes)
                    .await?
                    .ok_or_else(|| Error::not_found(ENTITY))?;
                tx.commit().await?;
                tracing::info!(user_id = promoted.id, "Existing user promoted to admin");
                Ok(promoted)
            }
            None => {
                let mut changes = Changeset::new();
                changes.value("email", email);
                changes.value("mobile", admin.mobile.clone());
                changes.value("hashed_password", hash_password(&admin.password)?);
                changes.value("full_name", "Administrator".to_string());
                changes.value("is_active", true);
                changes.value("is_admin", true);
                let user = self.insert(changes).await?;
                tracing::info!(user_id = user.id, "Admin account created");
                Ok(user)
            }
        }
    }

    async fn insert(&self, changes: Changeset) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        ensure_unique(&mut tx, TABLE, &UniqueKey::from_changes(&changes, UNIQUE_COLUMNS), None).await?;
        let user: User = insert_returning(&mut tx, TABLE, &changes).await?;
        tx.commit().await?;
        Ok(user)
    }
}
