use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    domain::review::Review,
    dto::products::{
        CreateProductRequest, ProductList, ProductListQuery, ProductResponse, ReviewRequest,
        UpdateProductRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{ApiJson, ApiPath, ApiQuery},
    },
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/reviews", post(create_review))
        .route(
            "/{id}/reviews/{review_id}",
            put(update_review).delete(delete_review),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("keyword" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("category" = Option<String>, Query, description = "Category id or exact name"),
        ("featured" = Option<String>, Query, description = "Only featured products"),
        ("trending" = Option<String>, Query, description = "Only trending products"),
        ("minPrice" = Option<f64>, Query, description = "Lower price bound"),
        ("maxPrice" = Option<f64>, Query, description = "Upper price bound"),
        ("pageNumber" = Option<u64>, Query, description = "Page number, 12 per page"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<ProductResponse>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Missing fields or invalid category")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductResponse>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductResponse>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product removed"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review added", body = ApiResponse<Review>),
        (status = 400, description = "Product already reviewed")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = product_service::add_review(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/reviews/{review_id}",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("review_id" = Uuid, Path, description = "Review id"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 401, description = "Not authorized to edit this review"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((id, review_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = product_service::update_review(&state, &user, id, review_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/reviews/{review_id}",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("review_id" = Uuid, Path, description = "Review id"),
    ),
    responses(
        (status = 200, description = "Review removed"),
        (status = 401, description = "Not authorized to delete this review"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((id, review_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = product_service::delete_review(&state, &user, id, review_id).await?;
    Ok(Json(resp))
}
