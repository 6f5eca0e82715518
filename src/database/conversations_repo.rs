use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{ConversationRow, ConversationSummaryRow, PendingRequestRow};

const CONVERSATION_COLUMNS: &str = r#"
  id,
  client_id,
  lawyer_id,
  case_id,
  status,
  last_message_at,
  created_at
"#;

pub struct NewConversation<'a> {
    pub id: &'a str,
    pub client_id: &'a str,
    pub lawyer_id: &'a str,
    pub created_at: &'a str,
}

// Racing first contacts both land here; the (client_id, lawyer_id) unique key
// lets exactly one insert through.
const SQL_INSERT_CONVERSATION_IF_ABSENT: &str = r#"
INSERT INTO conversations (
  id,
  client_id,
  lawyer_id,
  status,
  last_message_at,
  created_at
) VALUES (?1, ?2, ?3, 'pending', ?4, ?4)
ON CONFLICT (client_id, lawyer_id) DO NOTHING
"#;

/// Returns true when a new row was created.
pub async fn insert_conversation_if_absent<'e, E>(
    exec: E,
    conv: NewConversation<'_>,
) -> sqlx::Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_CONVERSATION_IF_ABSENT)
        .bind(conv.id)
        .bind(conv.client_id)
        .bind(conv.lawyer_id)
        .bind(conv.created_at)
        .execute(exec)
        .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn get_conversation_by_id<'e, E>(
    exec: E,
    conversation_id: &str,
) -> sqlx::Result<Option<ConversationRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM conversations WHERE id = ?1 LIMIT 1",
        CONVERSATION_COLUMNS
    );
    sqlx::query_as::<_, ConversationRow>(&sql)
        .bind(conversation_id)
        .fetch_optional(exec)
        .await
}

pub async fn get_conversation_by_pair<'e, E>(
    exec: E,
    client_id: &str,
    lawyer_id: &str,
) -> sqlx::Result<Option<ConversationRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM conversations WHERE client_id = ?1 AND lawyer_id = ?2 LIMIT 1",
        CONVERSATION_COLUMNS
    );
    sqlx::query_as::<_, ConversationRow>(&sql)
        .bind(client_id)
        .bind(lawyer_id)
        .fetch_optional(exec)
        .await
}

const SQL_TOUCH_LAST_MESSAGE: &str = r#"
UPDATE conversations
SET last_message_at = ?2
WHERE id = ?1
"#;

pub async fn touch_last_message<'e, E>(
    exec: E,
    conversation_id: &str,
    at: &str,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_TOUCH_LAST_MESSAGE)
        .bind(conversation_id)
        .bind(at)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

const SQL_ACTIVATE_PENDING: &str = r#"
UPDATE conversations
SET status = 'active',
    case_id = ?2
WHERE id = ?1
  AND status = 'pending'
"#;

/// Zero rows affected means someone else already decided.
pub async fn activate_pending<'e, E>(
    exec: E,
    conversation_id: &str,
    case_id: &str,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_ACTIVATE_PENDING)
        .bind(conversation_id)
        .bind(case_id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

const SQL_ARCHIVE_PENDING: &str = r#"
UPDATE conversations
SET status = 'archived'
WHERE id = ?1
  AND status = 'pending'
"#;

pub async fn archive_pending<'e, E>(exec: E, conversation_id: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_ARCHIVE_PENDING)
        .bind(conversation_id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

pub const SQL_LIST_CONVERSATIONS_FOR_USER: &str = r#"
SELECT
  c.id,
  c.client_id,
  c.lawyer_id,
  c.case_id,
  c.status,
  c.last_message_at,
  c.created_at,
  u.id AS counterpart_id,
  u.full_name AS counterpart_name,
  (
    SELECT m.content
    FROM messages m
    WHERE m.conversation_id = c.id
    ORDER BY m.created_at DESC, m.rowid DESC
    LIMIT 1
  ) AS last_message_preview,
  (
    SELECT COUNT(*)
    FROM messages m
    WHERE m.conversation_id = c.id
      AND m.sender_id != ?1
      AND m.read = 0
  ) AS unread_count
FROM conversations c
JOIN users u
  ON u.id = CASE WHEN c.client_id = ?1 THEN c.lawyer_id ELSE c.client_id END
WHERE c.client_id = ?1
   OR c.lawyer_id = ?1
ORDER BY c.last_message_at DESC
"#;

pub async fn list_conversations_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<ConversationSummaryRow>> {
    sqlx::query_as::<_, ConversationSummaryRow>(SQL_LIST_CONVERSATIONS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub const SQL_LIST_PENDING_REQUESTS: &str = r#"
SELECT
  c.id AS conversation_id,
  c.client_id,
  u.full_name AS client_name,
  m.id AS request_message_id,
  m.content AS request_content,
  c.created_at,
  c.last_message_at
FROM conversations c
JOIN users u ON u.id = c.client_id
LEFT JOIN messages m
  ON m.conversation_id = c.id
 AND m.is_case_request = 1
WHERE c.lawyer_id = ?1
  AND c.status = 'pending'
ORDER BY c.created_at ASC
"#;

pub async fn list_pending_requests(
    pool: &SqlitePool,
    lawyer_id: &str,
) -> sqlx::Result<Vec<PendingRequestRow>> {
    sqlx::query_as::<_, PendingRequestRow>(SQL_LIST_PENDING_REQUESTS)
        .bind(lawyer_id)
        .fetch_all(pool)
        .await
}
