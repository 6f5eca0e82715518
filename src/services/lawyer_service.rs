use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::user_repo::{self, LawyerSearch};
use crate::error::AppResult;
use crate::models::LawyerRow;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct LawyerQuery {
    pub q: Option<String>,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub limit: Option<i64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub async fn search_lawyers(pool: &SqlitePool, query: &LawyerQuery) -> AppResult<Vec<LawyerRow>> {
    let search = LawyerSearch {
        text: non_empty(&query.q),
        specialization: non_empty(&query.specialization),
        city: non_empty(&query.city),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
    };
    Ok(user_repo::search_lawyers(pool, search).await?)
}
