pub mod extract;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::SqlitePool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services::attachment_service::AttachmentPolicy;
use routes::{attachments, auth, cases, conversations, health, lawyers, messages, requests};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub attachments: Arc<AttachmentPolicy>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let attachments = AttachmentPolicy::from_config(&config);
        Self {
            pool,
            config: Arc::new(config),
            attachments: Arc::new(attachments),
            http: reqwest::Client::new(),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/messages", post(messages::send_message_handler))
        .route(
            "/api/conversations",
            get(conversations::list_conversations_handler),
        )
        .route(
            "/api/conversations/:conversation_id/messages",
            get(conversations::list_messages_handler),
        )
        .route(
            "/api/conversations/:conversation_id/read",
            post(conversations::mark_read_handler),
        )
        .route("/api/requests", get(requests::list_pending_handler))
        .route("/api/requests/decide", post(requests::decide_request_handler))
        .route("/api/cases", get(cases::list_cases_handler))
        .route("/api/cases/:case_id", get(cases::get_case_handler))
        .route(
            "/api/cases/:case_id/status",
            post(cases::update_case_status_handler),
        )
        .route("/api/lawyers", get(lawyers::search_lawyers_handler))
        .route(
            "/api/attachments/upload-path",
            post(attachments::upload_path_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        // Public routes
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        // Protected routes
        .merge(protected_routes)
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
