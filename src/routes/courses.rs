use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    database::listing::ListResponse,
    dto::{
        course_dto::{CourseListQuery, CourseResponse, CreateCoursePayload, UpdateCoursePayload},
        single_field_update, FieldPatchPayload,
    },
    error::Result,
    middleware::auth::AdminUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Course created", body = Json<CourseResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Admin access required")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state.course_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(CourseResponse::try_from(course)?)))
}

#[utoipa::path(
    get,
    path = "/courses",
    params(
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("status" = Option<String>, Query, description = "Defaults to published; `all` lists every status"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("level" = Option<String>, Query, description = "Filter by level"),
        ("search" = Option<String>, Query, description = "Matches name, description or instructor"),
        ("price_min" = Option<i32>, Query, description = "Lowest price"),
        ("price_max" = Option<i32>, Query, description = "Highest price")
    ),
    responses(
        (status = 200, description = "Page of courses", body = Json<ListResponse<CourseResponse>>)
    )
)]
#[axum::debug_handler]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.course_service.list(query).await?;
    Ok(Json(ListResponse::try_from_page(page, CourseResponse::try_from)?))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = Json<CourseResponse>),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_by_id(id).await?;
    Ok(Json(CourseResponse::try_from(course)?))
}

#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = UpdateCoursePayload,
    responses(
        (status = 200, description = "Course updated", body = Json<CourseResponse>),
        (status = 400, description = "Invalid value"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCoursePayload>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.update(id, payload).await?;
    Ok(Json(CourseResponse::try_from(course)?))
}

#[axum::debug_handler(state = AppState)]
pub async fn patch_course_field(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, field)): Path<(i32, String)>,
    Json(body): Json<FieldPatchPayload>,
) -> Result<impl IntoResponse> {
    let payload: UpdateCoursePayload = single_field_update(&field, body.value)?;
    let course = state.course_service.update(id, payload).await?;
    Ok(Json(CourseResponse::try_from(course)?))
}

#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course archived", body = Json<CourseResponse>),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.delete(id).await?;
    Ok(Json(CourseResponse::try_from(course)?))
}
