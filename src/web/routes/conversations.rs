use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{ConversationSummaryRow, MessageRow};
use crate::services::conversation_service;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    limit: Option<i64>,
    before: Option<String>,
}

pub async fn list_conversations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ConversationSummaryRow>>, AppError> {
    conversation_service::list_conversations(&pool, auth_user.actor())
        .await
        .map(Json)
}

pub async fn list_messages_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<String>,
    Query(q): Query<ListMessagesQuery>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<MessageRow>>, AppError> {
    conversation_service::list_messages(
        &pool,
        auth_user.actor(),
        &conversation_id,
        q.limit,
        q.before.as_deref(),
    )
    .await
    .map(Json)
}

pub async fn mark_read_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(conversation_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Value>, AppError> {
    let updated =
        conversation_service::mark_read(&pool, auth_user.actor(), &conversation_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
