use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::error;

use crate::database;

pub async fn health_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let build = option_env!("LAWDESK_BUILD_ID").unwrap_or("dev");
    match database::ping(&pool).await {
        Ok(()) => Ok(Json(serde_json::json!({ "status": "ok", "build": build }))),
        Err(e) => {
            error!(error = %e, "health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "database_unavailable", "build": build })),
            ))
        }
    }
}
