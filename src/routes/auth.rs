use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        auth_dto::{LoginPayload, RegisterPayload, TokenResponse},
        user_dto::{UpdateUserPayload, UserResponse},
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    utils::token::issue_token,
    AppState,
};

const TOKEN_TYPE: &str = "bearer";

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User registered", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email or mobile already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Access token issued", body = Json<TokenResponse>),
        (status = 401, description = "Bad credentials or inactive account")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email_or_mobile, &payload.password)
        .await?;

    let expiry = state.config.jwt_expiry_minutes;
    let access_token = issue_token(user.id, user.is_admin, &state.config.jwt_secret, expiry)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: expiry * 60,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = Json<UserResponse>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(caller.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/auth/me",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<UserResponse>),
        (status = 403, description = "Tried to change account flags"),
        (status = 409, description = "Email or mobile taken")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_me(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    if payload.touches_privileges() {
        tracing::warn!(user_id = caller.user_id, "Self-update tried to change account flags");
        return Err(Error::Forbidden(
            "is_active and is_admin can only be changed by an admin".to_string(),
        ));
    }
    let user = state.user_service.update(caller.user_id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}
