use sqlx::{types::Json, Executor, Sqlite, SqlitePool};

use crate::models::{AttachmentDescriptor, MessageRow};

const MESSAGE_COLUMNS: &str = r#"
  id,
  conversation_id,
  sender_id,
  content,
  attachments_json,
  is_case_request,
  is_system,
  delivered,
  read,
  created_at
"#;

pub struct NewMessage<'a> {
    pub id: &'a str,
    pub conversation_id: &'a str,
    pub sender_id: &'a str,
    pub content: &'a str,
    pub attachments: &'a [AttachmentDescriptor],
    pub is_system: bool,
    pub created_at: &'a str,
}

// The case-request flag is decided inside the statement, so two racing first
// messages cannot both claim it.
const SQL_INSERT_MESSAGE: &str = r#"
INSERT INTO messages (
  id,
  conversation_id,
  sender_id,
  content,
  attachments_json,
  is_case_request,
  is_system,
  delivered,
  read,
  created_at
)
SELECT
  ?1,
  ?2,
  ?3,
  ?4,
  ?5,
  CASE
    WHEN ?6 = 0 AND NOT EXISTS (SELECT 1 FROM messages WHERE conversation_id = ?2) THEN 1
    ELSE 0
  END,
  ?6,
  0,
  0,
  ?7
"#;

pub async fn insert_message<'e, E>(exec: E, msg: NewMessage<'_>) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(SQL_INSERT_MESSAGE)
        .bind(msg.id)
        .bind(msg.conversation_id)
        .bind(msg.sender_id)
        .bind(msg.content)
        .bind(Json(msg.attachments))
        .bind(msg.is_system)
        .bind(msg.created_at)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn get_message_by_id<'e, E>(exec: E, message_id: &str) -> sqlx::Result<Option<MessageRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM messages WHERE id = ?1 LIMIT 1", MESSAGE_COLUMNS);
    sqlx::query_as::<_, MessageRow>(&sql)
        .bind(message_id)
        .fetch_optional(exec)
        .await
}

/// Newest `limit` messages (optionally strictly before a timestamp), returned
/// oldest first.
pub async fn list_messages(
    pool: &SqlitePool,
    conversation_id: &str,
    limit: i64,
    before: Option<&str>,
) -> sqlx::Result<Vec<MessageRow>> {
    let sql = format!(
        r#"
SELECT {cols}
FROM (
  SELECT rowid AS seq, {cols}
  FROM messages
  WHERE conversation_id = ?1
    AND (?2 IS NULL OR created_at < ?2)
  ORDER BY created_at DESC, rowid DESC
  LIMIT ?3
)
ORDER BY created_at ASC, seq ASC
"#,
        cols = MESSAGE_COLUMNS
    );
    sqlx::query_as::<_, MessageRow>(&sql)
        .bind(conversation_id)
        .bind(before)
        .bind(limit)
        .fetch_all(pool)
        .await
}

const SQL_MARK_DELIVERED: &str = r#"
UPDATE messages
SET delivered = 1
WHERE conversation_id = ?1
  AND sender_id != ?2
  AND delivered = 0
"#;

/// Marks everything the other participant sent as delivered to `reader_id`.
pub async fn mark_delivered(
    pool: &SqlitePool,
    conversation_id: &str,
    reader_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_DELIVERED)
        .bind(conversation_id)
        .bind(reader_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_MARK_READ: &str = r#"
UPDATE messages
SET read = 1,
    delivered = 1
WHERE conversation_id = ?1
  AND sender_id != ?2
  AND read = 0
"#;

pub async fn mark_read(pool: &SqlitePool, conversation_id: &str, reader_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_READ)
        .bind(conversation_id)
        .bind(reader_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn get_case_request<'e, E>(exec: E, conversation_id: &str) -> sqlx::Result<Option<MessageRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM messages WHERE conversation_id = ?1 AND is_case_request = 1 LIMIT 1",
        MESSAGE_COLUMNS
    );
    sqlx::query_as::<_, MessageRow>(&sql)
        .bind(conversation_id)
        .fetch_optional(exec)
        .await
}
