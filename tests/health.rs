use axum::extract::State;
use sea_orm::DatabaseConnection;
use vastra_store_api::{config::AppConfig, routes::health::health_check, state::AppState};

#[tokio::test]
async fn health_reports_a_missing_database_as_down() {
    let config = AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "health-secret".into(),
        jwt_ttl_hours: 1,
        frontend_url: "http://localhost:3000".into(),
        uploads_dir: "uploads".into(),
    };
    let state = AppState::new(DatabaseConnection::Disconnected, config);

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Vastra store API is running");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "down");
}
