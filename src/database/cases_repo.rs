use sqlx::{types::Json, Executor, Sqlite, SqlitePool};

use crate::models::{AttachmentDescriptor, CaseRow, CaseStatus};

const CASE_COLUMNS: &str = r#"
  id,
  lawyer_id,
  client_id,
  title,
  description,
  status,
  attachments_json,
  created_at,
  updated_at,
  closed_at
"#;

pub struct NewCase<'a> {
    pub id: &'a str,
    pub lawyer_id: &'a str,
    pub client_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub attachments: &'a [AttachmentDescriptor],
    pub created_at: &'a str,
}

const SQL_INSERT_CASE: &str = r#"
INSERT INTO cases (
  id,
  lawyer_id,
  client_id,
  title,
  description,
  status,
  attachments_json,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?7)
"#;

pub async fn insert_case<'e, E>(exec: E, case: NewCase<'_>) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(SQL_INSERT_CASE)
        .bind(case.id)
        .bind(case.lawyer_id)
        .bind(case.client_id)
        .bind(case.title)
        .bind(case.description)
        .bind(Json(case.attachments))
        .bind(case.created_at)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn get_case_by_id<'e, E>(exec: E, case_id: &str) -> sqlx::Result<Option<CaseRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM cases WHERE id = ?1 LIMIT 1", CASE_COLUMNS);
    sqlx::query_as::<_, CaseRow>(&sql)
        .bind(case_id)
        .fetch_optional(exec)
        .await
}

// Compare-and-set on the status we validated against; a concurrent update
// makes this affect zero rows.
const SQL_UPDATE_CASE_STATUS: &str = r#"
UPDATE cases
SET status = ?3,
    updated_at = ?4,
    closed_at = CASE WHEN ?3 = 'closed' THEN ?4 ELSE closed_at END
WHERE id = ?1
  AND status = ?2
"#;

pub async fn update_case_status(
    pool: &SqlitePool,
    case_id: &str,
    expected: CaseStatus,
    next: CaseStatus,
    at: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_CASE_STATUS)
        .bind(case_id)
        .bind(expected)
        .bind(next)
        .bind(at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_cases_for_user(
    pool: &SqlitePool,
    user_id: &str,
    status: Option<CaseStatus>,
) -> sqlx::Result<Vec<CaseRow>> {
    let sql = format!(
        r#"
SELECT {}
FROM cases
WHERE (lawyer_id = ?1 OR client_id = ?1)
  AND (?2 IS NULL OR status = ?2)
ORDER BY updated_at DESC
"#,
        CASE_COLUMNS
    );
    sqlx::query_as::<_, CaseRow>(&sql)
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await
}
