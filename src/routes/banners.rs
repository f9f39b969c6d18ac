use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::banners::{BannerResponse, CreateBannerRequest, UpdateBannerRequest},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{ApiJson, ApiPath},
    },
    response::ApiResponse,
    services::banner_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_banners).post(create_banner))
        .route("/{id}", put(update_banner).delete(delete_banner))
}

#[utoipa::path(
    get,
    path = "/api/banners",
    responses((status = 200, description = "Active banners in display order", body = ApiResponse<Vec<BannerResponse>>)),
    tag = "Banners"
)]
pub async fn list_banners(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<BannerResponse>>>> {
    let resp = banner_service::list_active_banners(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/banners",
    request_body = CreateBannerRequest,
    responses(
        (status = 201, description = "Banner created", body = ApiResponse<BannerResponse>),
        (status = 400, description = "At least one image is required")
    ),
    security(("bearer_auth" = [])),
    tag = "Banners"
)]
pub async fn create_banner(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateBannerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BannerResponse>>)> {
    let resp = banner_service::create_banner(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner id")),
    request_body = UpdateBannerRequest,
    responses(
        (status = 200, description = "Banner updated", body = ApiResponse<BannerResponse>),
        (status = 404, description = "Banner not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Banners"
)]
pub async fn update_banner(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBannerRequest>,
) -> AppResult<Json<ApiResponse<BannerResponse>>> {
    let resp = banner_service::update_banner(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner id")),
    responses(
        (status = 200, description = "Banner removed"),
        (status = 404, description = "Banner not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Banners"
)]
pub async fn delete_banner(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = banner_service::delete_banner(&state, &user, id).await?;
    Ok(Json(resp))
}
