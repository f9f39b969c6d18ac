use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{
    dto::admin::DashboardStats,
    error::AppResult,
    middleware::{auth::AuthUser, origin::RequestOrigin},
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/reports/orders.csv", get(orders_csv))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard aggregates", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Not authorized as an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = admin_service::dashboard_stats(&state, &user, &origin).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/orders.csv",
    responses(
        (status = 200, description = "Orders report", content_type = "text/csv", body = String),
        (status = 401, description = "Not authorized as an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn orders_csv(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let csv = admin_service::orders_csv(&state, &user).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"orders-report.csv\"",
            ),
        ],
        csv,
    ))
}
