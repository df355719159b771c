use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    database::listing::ListResponse,
    dto::{
        application_dto::{
            ApplicationListQuery, ApplicationResponse, CreateApplicationPayload,
            UpdateApplicationPayload,
        },
        single_field_update, FieldPatchPayload, MessageResponse,
    },
    error::Result,
    middleware::auth::{AdminUser, AuthUser},
    AppState,
};

#[utoipa::path(
    post,
    path = "/applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<ApplicationResponse>),
        (status = 404, description = "Job or candidate not found"),
        (status = 409, description = "Candidate already applied to this job")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_application(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state.application_service.create(payload, caller.user_id).await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

#[utoipa::path(
    get,
    path = "/applications",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("job_id" = Option<i32>, Query, description = "Filter by job"),
        ("candidate_id" = Option<i32>, Query, description = "Filter by candidate")
    ),
    responses(
        (status = 200, description = "Page of applications", body = Json<ListResponse<ApplicationResponse>>)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_applications(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.application_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, |a| Ok(ApplicationResponse::from(a)))?))
}

#[axum::debug_handler(state = AppState)]
pub async fn application_stats(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse> {
    Ok(Json(state.application_service.stats().await?))
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application found", body = Json<ApplicationResponse>),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_application(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get_by_id(id).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    put,
    path = "/applications/{id}",
    params(("id" = i32, Path, description = "Application ID")),
    request_body = UpdateApplicationPayload,
    responses(
        (status = 200, description = "Application updated", body = Json<ApplicationResponse>),
        (status = 403, description = "Not the caller's application"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Candidate already applied to this job")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_application(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateApplicationPayload>,
) -> Result<impl IntoResponse> {
    let existing = state.application_service.get_by_id(id).await?;
    caller.ensure_owner_or_admin(existing.user_id)?;
    let application = state.application_service.update(id, payload).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[axum::debug_handler(state = AppState)]
pub async fn patch_application_field(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateApplicationPayload = single_field_update(&field, body.value)?;
    let existing = state.application_service.get_by_id(id).await?;
    caller.ensure_owner_or_admin(existing.user_id)?;
    let application = state.application_service.update(id, payload).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    delete,
    path = "/applications/{id}",
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application deleted", body = Json<MessageResponse>),
        (status = 403, description = "Not the caller's application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_application(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let existing = state.application_service.get_by_id(id).await?;
    caller.ensure_owner_or_admin(existing.user_id)?;
    state.application_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Job application deleted successfully")))
}
