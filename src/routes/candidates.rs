use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    database::listing::ListResponse,
    dto::{
        candidate_dto::{
            CandidateListQuery, CandidateResponse, CreateCandidatePayload, UpdateCandidatePayload,
        },
        single_field_update, FieldPatchPayload, MessageResponse,
    },
    error::Result,
    middleware::auth::AdminUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/candidates",
    request_body = CreateCandidatePayload,
    responses(
        (status = 201, description = "Candidate created", body = Json<CandidateResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email or phone number already registered")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_candidate(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state.candidate_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(CandidateResponse::try_from(candidate)?)))
}

#[utoipa::path(
    get,
    path = "/candidates",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("search" = Option<String>, Query, description = "Matches name, email or phone number"),
        ("experience_min" = Option<i32>, Query, description = "Fewest years of experience"),
        ("experience_max" = Option<i32>, Query, description = "Most years of experience")
    ),
    responses(
        (status = 200, description = "Page of candidates", body = Json<ListResponse<CandidateResponse>>)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_candidates(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.candidate_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, CandidateResponse::try_from)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn candidate_stats(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse> {
    Ok(Json(state.candidate_service.stats().await?))
}

#[utoipa::path(
    get,
    path = "/candidates/{id}",
    params(("id" = i32, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Candidate found", body = Json<CandidateResponse>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_candidate(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get_by_id(id).await?;
    Ok(Json(CandidateResponse::try_from(candidate)?))
}

#[utoipa::path(
    put,
    path = "/candidates/{id}",
    params(("id" = i32, Path, description = "Candidate ID")),
    request_body = UpdateCandidatePayload,
    responses(
        (status = 200, description = "Candidate updated", body = Json<CandidateResponse>),
        (status = 404, description = "Candidate not found"),
        (status = 409, description = "Email or phone number taken")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_candidate(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCandidatePayload>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.update(id, payload).await?;
    Ok(Json(CandidateResponse::try_from(candidate)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn patch_candidate_field(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateCandidatePayload = single_field_update(&field, body.value)?;
    let candidate = state.candidate_service.update(id, payload).await?;
    Ok(Json(CandidateResponse::try_from(candidate)?))
}

#[utoipa::path(
    delete,
    path = "/candidates/{id}",
    params(("id" = i32, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Candidate deleted", body = Json<MessageResponse>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_candidate(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.candidate_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Candidate deleted successfully")))
}
