use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use lawdesk::config::AppConfig;
use lawdesk::database::{self, user_repo};
use lawdesk::models::Role;
use lawdesk::web::{self, middleware::auth::AccessClaims, AppState};

const SECRET: &str = "test-secret";
const CLIENT: &str = "client-c";
const LAWYER: &str = "lawyer-l";

async fn seeded_pool() -> SqlitePool {
    let pool = database::connect("sqlite::memory:", 1).await.unwrap();
    let now = database::now_timestamp();
    for (id, role, name, specialization) in [
        (CLIENT, Role::Client, "Casey Client", None),
        (LAWYER, Role::Lawyer, "Lee Lawyer", Some("Tenancy")),
    ] {
        let email = format!("{}@example.test", id);
        user_repo::insert_user(
            &pool,
            user_repo::NewUser {
                id,
                role,
                full_name: name,
                email: &email,
                specialization,
                city: Some("Pune"),
                bio: None,
                created_at: &now,
            },
        )
        .await
        .unwrap();
    }
    pool
}

fn app_with(pool: SqlitePool, config: AppConfig) -> Router {
    web::router(AppState::new(pool, config))
}

async fn app() -> Router {
    app_with(
        seeded_pool().await,
        AppConfig::for_database("sqlite::memory:", SECRET),
    )
}

fn token_for(user_id: &str) -> String {
    let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
    encode(
        &Header::default(),
        &AccessClaims {
            sub: user_id.to_string(),
            exp,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn call(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn open_request(app: &Router) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/messages",
        Some(CLIENT),
        Some(json!({
            "target_lawyer_id": LAWYER,
            "text": "Need help with a lease dispute",
            "is_case_request": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["conversation_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/api/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    // Valid signature, but no user row behind the subject.
    let (status, _) = call(&app, "GET", "/api/conversations", Some("ghost"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_token_is_accepted() {
    let app = app().await;
    let request = Request::builder()
        .uri("/api/conversations")
        .header(header::COOKIE, format!("theme=dark; access_token={}", token_for(CLIENT)))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn request_accept_and_chat_flow() {
    let app = app().await;
    let conversation_id = open_request(&app).await;

    let (status, requests) = call(&app, "GET", "/api/requests", Some(LAWYER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(requests[0]["conversation_id"], conversation_id.as_str());
    assert_eq!(requests[0]["request_content"], "Need help with a lease dispute");

    let (status, outcome) = call(
        &app,
        "POST",
        "/api/requests/decide",
        Some(LAWYER),
        Some(json!({
            "conversation_id": conversation_id,
            "accepted": true,
            "title": "Lease Dispute",
            "description": "Deposit withheld"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", outcome);
    assert_eq!(outcome["status"], "active");
    let case_id = outcome["case_id"].as_str().unwrap().to_string();

    let (status, sent) = call(
        &app,
        "POST",
        "/api/messages",
        Some(CLIENT),
        Some(json!({ "conversation_id": conversation_id, "text": "Thanks!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["message"]["is_case_request"], false);

    let (status, messages) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}/messages", conversation_id),
        Some(LAWYER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["is_case_request"], true);
    assert_eq!(messages[1]["is_system"], true);
    assert_eq!(messages[2]["content"], "Thanks!");

    let (status, case) = call(&app, "GET", &format!("/api/cases/{}", case_id), Some(CLIENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "pending");

    let (status, case) = call(
        &app,
        "POST",
        &format!("/api/cases/{}/status", case_id),
        Some(LAWYER),
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "active");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/cases/{}/status", case_id),
        Some(LAWYER),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn reject_then_accept_conflicts() {
    let app = app().await;
    let conversation_id = open_request(&app).await;

    let (status, outcome) = call(
        &app,
        "POST",
        "/api/requests/decide",
        Some(LAWYER),
        Some(json!({ "conversation_id": conversation_id, "accepted": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "archived");
    assert!(outcome.get("case_id").is_none());

    let (status, _) = call(
        &app,
        "POST",
        "/api/requests/decide",
        Some(LAWYER),
        Some(json!({
            "conversation_id": conversation_id,
            "accepted": true,
            "title": "Lease Dispute",
            "description": "Deposit withheld"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn error_taxonomy_over_http() {
    let app = app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/messages",
        Some(CLIENT),
        Some(json!({ "target_lawyer_id": LAWYER, "text": "", "attachments": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");

    let (status, _) = call(
        &app,
        "POST",
        "/api/messages",
        Some(CLIENT),
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/api/messages",
        Some(CLIENT),
        Some(json!({ "target_lawyer_id": "nobody", "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let conversation_id = open_request(&app).await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/requests/decide",
        Some(CLIENT),
        Some(json!({ "conversation_id": conversation_id, "accepted": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "POST",
        "/api/requests/decide",
        Some(LAWYER),
        Some(json!({ "conversation_id": conversation_id, "accepted": true, "title": "Lease" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let app = app().await;
    let conversation_id = open_request(&app).await;

    let cases = [
        (
            "/api/requests/decide",
            LAWYER,
            json!({ "conversation_id": conversation_id }),
        ),
        ("/api/requests/decide", LAWYER, json!({ "accepted": true })),
        ("/api/cases/some-case/status", LAWYER, json!({ "status": "appealed" })),
        (
            "/api/messages",
            CLIENT,
            json!({ "target_lawyer_id": LAWYER, "text": 5 }),
        ),
    ];
    for (uri, user, body) in cases {
        let (status, response) = call(&app, "POST", uri, Some(user), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", uri, response);
        assert_eq!(response["error"], "validation_failed", "{}", uri);
        assert!(response["detail"].is_string(), "{}", uri);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(CLIENT)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_deciding_is_forbidden_before_payload_checks() {
    let app = app().await;
    let conversation_id = open_request(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/requests/decide",
        Some(CLIENT),
        Some(json!({ "conversation_id": conversation_id, "accepted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn oversized_upload_is_refused_before_any_message() {
    let app = app().await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/attachments/upload-path",
        Some(CLIENT),
        Some(json!({ "recipient_id": LAWYER, "file_name": "scan.pdf", "size": 12 * 1024 * 1024 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, target) = call(
        &app,
        "POST",
        "/api/attachments/upload-path",
        Some(CLIENT),
        Some(json!({ "recipient_id": LAWYER, "file_name": "scan.pdf", "size": 1024 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let path = target["path"].as_str().unwrap();
    assert!(path.starts_with("client-c/lawyer-l/"));

    let (status, sent) = call(
        &app,
        "POST",
        "/api/messages",
        Some(CLIENT),
        Some(json!({
            "target_lawyer_id": LAWYER,
            "attachments": [{
                "name": "scan.pdf",
                "url": target["public_url"],
                "type": "application/pdf",
                "size": 1024
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", sent);
    assert_eq!(sent["message"]["attachments"][0]["type"], "application/pdf");
    assert_eq!(sent["message"]["is_case_request"], true);
}

#[tokio::test]
async fn lawyer_directory_search() {
    let app = app().await;
    let (status, lawyers) = call(
        &app,
        "GET",
        "/api/lawyers?specialization=tenancy&city=pune",
        Some(CLIENT),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let lawyers = lawyers.as_array().unwrap();
    assert_eq!(lawyers.len(), 1);
    assert_eq!(lawyers[0]["id"], LAWYER);
    assert!(lawyers[0].get("email").is_none());
}

async fn fake_auth_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "correct horse" {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "access_token": "acc-123", "refresh_token": "ref-456" }
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "invalid credentials" })),
        )
    }
}

#[tokio::test]
async fn login_proxies_to_auth_provider_and_sets_cookies() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let provider = Router::new().route("/api/v1/auth/login", post(fake_auth_login));
    tokio::spawn(async move {
        axum::serve(listener, provider).await.unwrap();
    });

    let mut config = AppConfig::for_database("sqlite::memory:", SECRET);
    config.auth_api_url = format!("http://{}", addr);
    let app = app_with(seeded_pool().await, config);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "c@example.test", "password": "correct horse" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=acc-123") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=ref-456")));

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "c@example.test", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
}
