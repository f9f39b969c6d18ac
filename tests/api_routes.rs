use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use vastra_store_api::{
    config::AppConfig,
    entity::{
        json::{IdList, SavedAddresses},
        users,
    },
    routes::build_router,
    services::auth_service::issue_token,
    state::AppState,
};

// Every case here is rejected before the database is touched.
fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "router-test-secret".into(),
        jwt_ttl_hours: 1,
        frontend_url: "http://localhost:3000".into(),
        uploads_dir: "uploads".into(),
    }
}

fn app() -> Router {
    let state = AppState::new(DatabaseConnection::Disconnected, test_config());
    build_router(state).expect("router")
}

fn customer() -> users::Model {
    let now = Utc::now();
    users::Model {
        id: Uuid::new_v4(),
        name: "Asha".into(),
        email: "asha@example.com".into(),
        password_hash: String::new(),
        is_admin: false,
        addresses: SavedAddresses::default(),
        wishlist: IdList::default(),
        reset_password_token: None,
        reset_password_expires: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_is_served_with_a_request_id() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let response = app()
        .oneshot(
            Request::get("/api/orders/myorders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Not authorized, no token");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let response = app()
        .oneshot(
            Request::get("/api/auth/profile")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn customers_cannot_open_the_dashboard() {
    let token = issue_token(&test_config(), &customer()).expect("token");
    let response = app()
        .oneshot(
            Request::get("/api/admin/dashboard/stats")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Not authorized as an admin");
}

#[tokio::test]
async fn empty_order_is_a_bad_request() {
    let token = issue_token(&test_config(), &customer()).expect("token");
    let response = app()
        .oneshot(
            Request::post("/api/orders")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"orderItems":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "No order items");
}

#[tokio::test]
async fn unknown_path_falls_back_to_not_found() {
    let response = app()
        .oneshot(Request::get("/api/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["path"], "/api/nowhere");
}

async fn assert_bad_request(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body = json_body(response).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn malformed_order_id_is_a_bad_request() {
    let token = issue_token(&test_config(), &customer()).expect("token");
    let response = app()
        .oneshot(
            Request::get("/api/orders/not-a-uuid")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_bad_request(response).await;
}

#[tokio::test]
async fn unparsable_status_body_is_a_bad_request() {
    let mut admin = customer();
    admin.is_admin = true;
    let token = issue_token(&test_config(), &admin).expect("token");
    let response = app()
        .oneshot(
            Request::put(format!("/api/orders/{}/status", Uuid::new_v4()))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_bad_request(response).await;
}

#[tokio::test]
async fn status_body_without_json_content_type_is_a_bad_request() {
    let mut admin = customer();
    admin.is_admin = true;
    let token = issue_token(&test_config(), &admin).expect("token");
    let response = app()
        .oneshot(
            Request::put(format!("/api/orders/{}/status", Uuid::new_v4()))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(r#"{"status":"Shipped"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_bad_request(response).await;
}

#[tokio::test]
async fn non_numeric_page_is_a_bad_request() {
    let response = app()
        .oneshot(
            Request::get("/api/products?pageNumber=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_bad_request(response).await;
}
