use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::models::{CaseRow, CaseStatus};
use crate::services::case_service;
use crate::web::extract::ApiJson;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ListCasesQuery {
    pub status: Option<CaseStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCaseStatusBody {
    pub status: CaseStatus,
}

pub async fn list_cases_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(q): Query<ListCasesQuery>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<CaseRow>>, AppError> {
    case_service::list_cases(&pool, auth_user.actor(), q.status)
        .await
        .map(Json)
}

pub async fn get_case_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(case_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<CaseRow>, AppError> {
    case_service::get_case(&pool, auth_user.actor(), &case_id)
        .await
        .map(Json)
}

pub async fn update_case_status_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(case_id): Path<String>,
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<UpdateCaseStatusBody>,
) -> Result<Json<CaseRow>, AppError> {
    case_service::update_case_status(&pool, auth_user.actor(), &case_id, body.status)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(user_id = %auth_user.id, case_id = %case_id, error = %e, "case status update rejected");
            e
        })
}
