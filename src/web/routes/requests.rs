use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::models::PendingRequestRow;
use crate::services::conversation_service::{self, DecisionOutcome};
use crate::web::extract::ApiJson;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct DecideRequestBody {
    pub conversation_id: String,
    pub accepted: bool,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub async fn decide_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<DecideRequestBody>,
) -> Result<Json<DecisionOutcome>, AppError> {
    conversation_service::decide_submitted_request(
        &pool,
        auth_user.actor(),
        &body.conversation_id,
        body.accepted,
        body.title.as_deref(),
        body.description.as_deref(),
    )
    .await
    .map(Json)
    .map_err(|e| {
        warn!(
            user_id = %auth_user.id,
            conversation_id = %body.conversation_id,
            error = %e,
            "decide_request rejected"
        );
        e
    })
}

pub async fn list_pending_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<PendingRequestRow>>, AppError> {
    conversation_service::list_pending_requests(&pool, auth_user.actor())
        .await
        .map(Json)
}
