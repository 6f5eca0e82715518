use sqlx::SqlitePool;
use tracing::info;

use crate::database::{self, cases_repo};
use crate::error::{AppError, AppResult};
use crate::models::{CaseRow, CaseStatus};
use crate::services::Actor;

/// Moves a case forward along pending -> active -> {won | lost} -> closed.
/// Only the case's lawyer may do this.
pub async fn update_case_status(
    pool: &SqlitePool,
    lawyer: Actor<'_>,
    case_id: &str,
    next: CaseStatus,
) -> AppResult<CaseRow> {
    let case = cases_repo::get_case_by_id(pool, case_id)
        .await?
        .ok_or(AppError::NotFound("case"))?;

    if !lawyer.is_lawyer() || case.lawyer_id != lawyer.id {
        return Err(AppError::forbidden("only the case's lawyer can change its status"));
    }
    if !case.status.can_transition_to(next) {
        return Err(AppError::conflict(format!(
            "case cannot move from {} to {}",
            case.status.as_str(),
            next.as_str()
        )));
    }

    let now = database::now_timestamp();
    if cases_repo::update_case_status(pool, case_id, case.status, next, &now).await? == 0 {
        return Err(AppError::conflict("case status changed concurrently"));
    }
    info!(
        case_id,
        from = case.status.as_str(),
        to = next.as_str(),
        "case status updated"
    );

    cases_repo::get_case_by_id(pool, case_id)
        .await?
        .ok_or(AppError::NotFound("case"))
}

pub async fn list_cases(
    pool: &SqlitePool,
    actor: Actor<'_>,
    status: Option<CaseStatus>,
) -> AppResult<Vec<CaseRow>> {
    Ok(cases_repo::list_cases_for_user(pool, actor.id, status).await?)
}

pub async fn get_case(pool: &SqlitePool, actor: Actor<'_>, case_id: &str) -> AppResult<CaseRow> {
    let case = cases_repo::get_case_by_id(pool, case_id)
        .await?
        .ok_or(AppError::NotFound("case"))?;
    if case.lawyer_id != actor.id && case.client_id != actor.id {
        return Err(AppError::forbidden("not a party to this case"));
    }
    Ok(case)
}
