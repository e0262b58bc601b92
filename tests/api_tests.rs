use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use taxi_rank_backend::{
    config::Config,
    entities::user::{self, UserRole},
    routes::create_router,
    utils::jwt::create_token,
    AppState,
};

const SECRET: &str = "integration-test-secret";

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: SECRET.to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        cors_allowed_origins: vec!["http://localhost:4200".to_string()],
        admin_email: "admin@taxirank.local".to_string(),
        admin_password: "admin123".to_string(),
    }
}

fn create_test_app(db: DatabaseConnection) -> Router {
    create_router(AppState {
        db: Arc::new(db),
        config: test_config(),
    })
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn token_for(role: UserRole) -> String {
    create_token(
        Uuid::new_v4(),
        "someone@example.com",
        role,
        Some(Uuid::new_v4()),
        SECRET,
        1,
    )
    .unwrap()
}

/// IP keyed governors read the peer address from the request extensions
fn from_peer(mut request: Request<Body>) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let response = create_test_app(db)
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let response = create_test_app(empty_db())
        .oneshot(Request::get("/api/vehicles").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let response = create_test_app(empty_db())
        .oneshot(
            Request::get("/api/trips/00000000-0000-0000-0000-000000000001")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_non_admin() {
    let token = token_for(UserRole::Staff);

    let response = create_test_app(empty_db())
        .oneshot(
            Request::get("/api/admin/tenants")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_user_management_requires_manager() {
    let token = token_for(UserRole::Driver);

    let response = create_test_app(empty_db())
        .oneshot(
            Request::get("/api/users")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let payload = json!({
        "email": "new@example.com",
        "password": "short",
        "firstName": "Thandi",
        "lastName": "Mokoena"
    });

    let request = Request::post("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = create_test_app(empty_db())
        .oneshot(from_peer(request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let payload = json!({ "email": "ghost@example.com", "password": "whatever1" });
    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = create_test_app(db).oneshot(from_peer(request)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = create_test_app(empty_db())
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
