use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    database::listing::ListResponse,
    dto::{
        job_dto::{CreateJobPayload, JobListQuery, JobResponse, UpdateJobPayload},
        single_field_update, FieldPatchPayload,
    },
    error::Result,
    middleware::auth::AdminUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job posted", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Admin access required")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_job(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(payload, admin.user_id).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::try_from(job)?)))
}

#[utoipa::path(
    get,
    path = "/jobs",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("status" = Option<String>, Query, description = "Defaults to active; `all` lists every status"),
        ("company_name" = Option<String>, Query, description = "Substring of the company name"),
        ("city" = Option<String>, Query, description = "Substring of the city"),
        ("job_type" = Option<String>, Query, description = "Filter by job type"),
        ("work_mode" = Option<String>, Query, description = "Filter by work mode"),
        ("search" = Option<String>, Query, description = "Matches title, description, company or role"),
        ("salary_min" = Option<i32>, Query, description = "Lowest acceptable minimum salary"),
        ("salary_max" = Option<i32>, Query, description = "Highest acceptable maximum salary")
    ),
    responses(
        (status = 200, description = "Page of jobs", body = Json<ListResponse<JobResponse>>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.job_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, JobResponse::try_from)?))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job found", body = Json<JobResponse>),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<i32>) -> Result<impl IntoResponse> {
    let job = state.job_service.get_by_id(id).await?;
    Ok(Json(JobResponse::try_from(job)?))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = Json<JobResponse>),
        (status = 400, description = "Invalid value"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_job(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.update(id, payload).await?;
    Ok(Json(JobResponse::try_from(job)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn patch_job_field(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateJobPayload = single_field_update(&field, body.value)?;
    let job = state.job_service.update(id, payload).await?;
    Ok(Json(JobResponse::try_from(job)?))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job closed", body = Json<JobResponse>),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_job(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.delete(id).await?;
    Ok(Json(JobResponse::try_from(job)?))
}
