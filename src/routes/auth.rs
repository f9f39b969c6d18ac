use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{
        AuthResponse, DirectResetRequest, ForgotPasswordRequest, ForgotPasswordResponse,
        LoginRequest, ProfileResponse, RegisterRequest, ResetPasswordRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{ApiJson, ApiPath},
        origin::RequestOrigin,
    },
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/forgot", post(forgot_password))
        .route("/reset/{token}", post(reset_password))
        .route("/reset-password", post(direct_reset_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<AuthResponse>),
        (status = 400, description = "User already exists")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let resp = auth_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link generated", body = ApiResponse<ForgotPasswordResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<ForgotPasswordResponse>>> {
    let resp = auth_service::forgot_password(&state, &origin, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset/{token}",
    params(("token" = String, Path, description = "Raw reset token")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successful"),
        (status = 400, description = "Invalid or expired reset token")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::reset_password(&state, &token, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = DirectResetRequest,
    responses(
        (status = 200, description = "Password updated successfully"),
        (status = 404, description = "User not found with this email")
    ),
    tag = "Auth"
)]
pub async fn direct_reset_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DirectResetRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = auth_service::direct_reset_password(&state, payload).await?;
    Ok(Json(resp))
}
