use axum::{
    extract::{Query, State},
    Json,
};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::LawyerRow;
use crate::services::lawyer_service::{self, LawyerQuery};

pub async fn search_lawyers_handler(
    Query(query): Query<LawyerQuery>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<LawyerRow>>, AppError> {
    lawyer_service::search_lawyers(&pool, &query).await.map(Json)
}
