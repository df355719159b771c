use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    database::listing::ListResponse,
    dto::{
        enrollment_dto::{
            CreateEnrollmentPayload, EnrollmentListQuery, EnrollmentResponse,
            UpdateEnrollmentPayload,
        },
        single_field_update, FieldPatchPayload, MessageResponse,
    },
    error::Result,
    middleware::auth::{AdminUser, AuthUser},
    AppState,
};

#[utoipa::path(
    post,
    path = "/enrollments",
    request_body = CreateEnrollmentPayload,
    responses(
        (status = 201, description = "Candidate enrolled", body = Json<EnrollmentResponse>),
        (status = 404, description = "Course or candidate not found"),
        (status = 409, description = "Candidate already enrolled in this course")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_enrollment(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<CreateEnrollmentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let enrollment = state.enrollment_service.create(payload, caller.user_id).await?;
    Ok((StatusCode::CREATED, Json(EnrollmentResponse::try_from(enrollment)?)))
}

#[utoipa::path(
    get,
    path = "/enrollments",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("payment_status" = Option<String>, Query, description = "Filter by payment status"),
        ("course_id" = Option<i32>, Query, description = "Filter by course"),
        ("candidate_id" = Option<i32>, Query, description = "Filter by candidate")
    ),
    responses(
        (status = 200, description = "Page of enrollments", body = Json<ListResponse<EnrollmentResponse>>)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(query): Query<EnrollmentListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.enrollment_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, EnrollmentResponse::try_from)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn enrollment_stats(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse> {
    Ok(Json(state.enrollment_service.stats().await?))
}

#[utoipa::path(
    get,
    path = "/enrollments/{id}",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment found", body = Json<EnrollmentResponse>),
        (status = 404, description = "Enrollment not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_enrollment(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let enrollment = state.enrollment_service.get_by_id(id).await?;
    Ok(Json(EnrollmentResponse::try_from(enrollment)?))
}

#[utoipa::path(
    put,
    path = "/enrollments/{id}",
    params(("id" = i32, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentPayload,
    responses(
        (status = 200, description = "Enrollment updated", body = Json<EnrollmentResponse>),
        (status = 403, description = "Not the caller's enrollment"),
        (status = 404, description = "Enrollment not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_enrollment(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEnrollmentPayload>,
) -> Result<impl IntoResponse> {
    let existing = state.enrollment_service.get_by_id(id).await?;
    caller.ensure_owner_or_admin(existing.user_id)?;
    let enrollment = state.enrollment_service.update(id, payload).await?;
    Ok(Json(EnrollmentResponse::try_from(enrollment)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn patch_enrollment_field(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateEnrollmentPayload = single_field_update(&field, body.value)?;
    let existing = state.enrollment_service.get_by_id(id).await?;
    caller.ensure_owner_or_admin(existing.user_id)?;
    let enrollment = state.enrollment_service.update(id, payload).await?;
    Ok(Json(EnrollmentResponse::try_from(enrollment)?))
}

#[utoipa::path(
    delete,
    path = "/enrollments/{id}",
    params(("id" = i32, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment deleted", body = Json<MessageResponse>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Enrollment not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.enrollment_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Enrollment deleted successfully")))
}
