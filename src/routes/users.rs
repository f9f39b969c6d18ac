use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::users::{UserList, UserListQuery},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{ApiPath, ApiQuery},
    },
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", delete(delete_user))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 20, max 100"),
        ("q" = Option<String>, Query, description = "Name or e-mail substring"),
    ),
    responses(
        (status = 200, description = "Users, newest first", body = ApiResponse<UserList>),
        (status = 401, description = "Not authorized as an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User removed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = user_service::delete_user(&state, &user, id).await?;
    Ok(Json(resp))
}
