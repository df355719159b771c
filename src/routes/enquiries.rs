use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    database::listing::ListResponse,
    dto::{
        enquiry_dto::{CreateEnquiryPayload, EnquiryListQuery, EnquiryResponse, UpdateEnquiryPayload},
        single_field_update, FieldPatchPayload, MessageResponse,
    },
    error::Result,
    middleware::auth::AdminUser,
    AppState,
};

/// Public: anyone may leave an enquiry.
#[utoipa::path(
    post,
    path = "/enquiries",
    request_body = CreateEnquiryPayload,
    responses(
        (status = 201, description = "Enquiry received", body = Json<EnquiryResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "An enquiry with this email or mobile exists")
    )
)]
#[axum::debug_handler]
pub async fn create_enquiry(
    State(state): State<AppState>,
    Json(payload): Json<CreateEnquiryPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let enquiry = state.enquiry_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(EnquiryResponse::try_from(enquiry)?)))
}

#[utoipa::path(
    get,
    path = "/enquiries",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("search" = Option<String>, Query, description = "Matches name, email or mobile"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("technology" = Option<String>, Query, description = "Substring of the technology list"),
        ("year_min" = Option<i32>, Query, description = "Earliest pass-out year"),
        ("year_max" = Option<i32>, Query, description = "Latest pass-out year")
    ),
    responses(
        (status = 200, description = "Page of enquiries", body = Json<ListResponse<EnquiryResponse>>)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_enquiries(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<EnquiryListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.enquiry_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, EnquiryResponse::try_from)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn enquiry_stats(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse> {
    Ok(Json(state.enquiry_service.stats().await?))
}

#[utoipa::path(
    get,
    path = "/enquiries/{id}",
    params(("id" = i32, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry found", body = Json<EnquiryResponse>),
        (status = 404, description = "Enquiry not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_enquiry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let enquiry = state.enquiry_service.get_by_id(id).await?;
    Ok(Json(EnquiryResponse::try_from(enquiry)?))
}

#[utoipa::path(
    put,
    path = "/enquiries/{id}",
    params(("id" = i32, Path, description = "Enquiry ID")),
    request_body = UpdateEnquiryPayload,
    responses(
        (status = 200, description = "Enquiry updated", body = Json<EnquiryResponse>),
        (status = 404, description = "Enquiry not found"),
        (status = 409, description = "Email or mobile taken")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_enquiry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEnquiryPayload>,
) -> Result<impl IntoResponse> {
    let enquiry = state.enquiry_service.update(id, payload).await?;
    Ok(Json(EnquiryResponse::try_from(enquiry)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn patch_enquiry_field(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateEnquiryPayload = single_field_update(&field, body.value)?;
    let enquiry = state.enquiry_service.update(id, payload).await?;
    Ok(Json(EnquiryResponse::try_from(enquiry)?))
}

#[utoipa::path(
    delete,
    path = "/enquiries/{id}",
    params(("id" = i32, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry deleted", body = Json<MessageResponse>),
        (status = 404, description = "Enquiry not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_enquiry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    state.enquiry_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Enquiry deleted successfully")))
}
