use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    domain::order::RequestKind,
    dto::orders::{
        CreateOrderRequest, OrderList, OrderListQuery, OrderResponse, OrderStats,
        OrderStatsQuery, RequestReasonBody, UpdateRequestStatus, UpdateStatusRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{ApiJson, ApiPath, ApiQuery},
        origin::RequestOrigin,
    },
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/stats", get(order_stats))
        .route("/myorders", get(my_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_status))
        .route("/{id}/pay", put(mark_paid))
        .route("/{id}/return", post(request_return).delete(cancel_return))
        .route(
            "/{id}/replacement",
            post(request_replacement).delete(cancel_replacement),
        )
        .route("/{id}/return-status", put(update_return_status))
        .route("/{id}/replacement-status", put(update_replacement_status))
}

type OrderJson = Json<ApiResponse<OrderResponse>>;

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 400, description = "No order items")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiJson(payload): ApiJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, OrderJson)> {
    let resp = order_service::create_order(&state, &user, &origin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/myorders",
    responses((status = 200, description = "Caller's orders, newest first", body = ApiResponse<Vec<OrderResponse>>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
) -> AppResult<Json<ApiResponse<Vec<OrderResponse>>>> {
    let resp = order_service::my_orders(&state, &user, &origin).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Not authorized to view this order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<OrderJson> {
    let resp = order_service::get_order(&state, &user, &origin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 20, max 100"),
        ("status" = Option<String>, Query, description = "Pending, Shipped, Delivered or Cancelled"),
        ("paid" = Option<String>, Query, description = "true or false"),
        ("user" = Option<String>, Query, description = "Owner id or e-mail"),
        ("dateFrom" = Option<String>, Query, description = "Created at or after"),
        ("dateTo" = Option<String>, Query, description = "Created at or before"),
        ("q" = Option<String>, Query, description = "Order id, status, payment method or owner"),
        ("sort" = Option<String>, Query, description = "createdAt, totalPrice or status"),
        ("sortDir" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "Orders with status counts", body = ApiResponse<OrderList>),
        (status = 401, description = "Not authorized as an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, &origin, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/stats",
    params(
        ("dateFrom" = Option<String>, Query, description = "Created at or after"),
        ("dateTo" = Option<String>, Query, description = "Created at or before"),
    ),
    responses((status = 200, description = "Order aggregates", body = ApiResponse<OrderStats>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_stats(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<OrderStatsQuery>,
) -> AppResult<Json<ApiResponse<OrderStats>>> {
    let resp = order_service::order_stats(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid status or missing courier details")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> AppResult<OrderJson> {
    let resp = order_service::update_status(&state, &user, &origin, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/pay",
    params(("id" = Uuid, Path, description = "Order id")),
    responses((status = 200, description = "Order marked as paid", body = ApiResponse<OrderResponse>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<OrderJson> {
    let resp = order_service::mark_paid(&state, &user, &origin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/return",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = RequestReasonBody,
    responses(
        (status = 200, description = "Return requested", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order not delivered, already requested or missing reason")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn request_return(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
    payload: Option<ApiJson<RequestReasonBody>>,
) -> AppResult<OrderJson> {
    let payload = payload.map(|ApiJson(body)| body).unwrap_or_default();
    let resp =
        order_service::open_request(&state, &user, &origin, id, RequestKind::Return, payload)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/return",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Return request cancelled", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Request missing or already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_return(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<OrderJson> {
    let resp =
        order_service::cancel_request(&state, &user, &origin, id, RequestKind::Return).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/replacement",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = RequestReasonBody,
    responses(
        (status = 200, description = "Replacement requested", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order not delivered, already requested or missing reason")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn request_replacement(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
    payload: Option<ApiJson<RequestReasonBody>>,
) -> AppResult<OrderJson> {
    let payload = payload.map(|ApiJson(body)| body).unwrap_or_default();
    let resp = order_service::open_request(
        &state,
        &user,
        &origin,
        id,
        RequestKind::Replacement,
        payload,
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/replacement",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Replacement request cancelled", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Request missing or already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_replacement(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<OrderJson> {
    let resp =
        order_service::cancel_request(&state, &user, &origin, id, RequestKind::Replacement)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/return-status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Return status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "No return request found or invalid status")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_return_status(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRequestStatus>,
) -> AppResult<OrderJson> {
    let resp = order_service::update_request_status(
        &state,
        &user,
        &origin,
        id,
        RequestKind::Return,
        payload,
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/replacement-status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Replacement status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "No replacement request found or invalid status")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_replacement_status(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRequestStatus>,
) -> AppResult<OrderJson> {
    let resp = order_service::update_request_status(
        &state,
        &user,
        &origin,
        id,
        RequestKind::Replacement,
        payload,
    )
    .await?;
    Ok(Json(resp))
}
