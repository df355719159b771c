use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    database::listing::ListResponse,
    dto::{
        single_field_update,
        user_dto::{UpdateUserPayload, UserListQuery, UserResponse},
        FieldPatchPayload, MessageResponse,
    },
    error::{Error, Result},
    middleware::auth::{AdminUser, AuthUser},
    AppState,
};

#[utoipa::path(
    get,
    path = "/users",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("search" = Option<String>, Query, description = "Matches name, email or mobile"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("is_admin" = Option<bool>, Query, description = "Filter by admin flag")
    ),
    responses(
        (status = 200, description = "Page of users", body = Json<ListResponse<UserResponse>>),
        (status = 403, description = "Admin access required")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.user_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, |u| Ok(UserResponse::from(u)))?))
}

#[axum::debug_handler(state = AppState)]
pub async fn user_stats(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse> {
    Ok(Json(state.user_service.stats().await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = Json<UserResponse>),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    caller.ensure_self_or_admin(id)?;
    let user = state.user_service.get_by_id(id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = Json<UserResponse>),
        (status = 403, description = "Not the caller's account, or account flags changed by a non-admin"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email or mobile taken")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    caller.ensure_self_or_admin(id)?;
    if payload.touches_privileges() && !caller.is_admin {
        return Err(Error::Forbidden(
            "is_active and is_admin can only be changed by an admin".to_string(),
        ));
    }
    let user = state.user_service.update(id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}

/// `PATCH /users/{id}/{field}`, e.g. `is_active` or `is_admin`.
#[axum::debug_handler(state = AppState)]
pub async fn patch_user_field(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateUserPayload = single_field_update(&field, body.value)?;
    let user = state.user_service.update(id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = Json<MessageResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    if admin.user_id == id {
        return Err(Error::BadRequest("Admins cannot delete their own account".to_string()));
    }
    state.user_service.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
