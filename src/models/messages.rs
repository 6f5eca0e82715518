use serde::Serialize;
use sqlx::{types::Json, FromRow};

use super::AttachmentDescriptor;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[sqlx(rename = "attachments_json")]
    pub attachments: Json<Vec<AttachmentDescriptor>>,
    pub is_case_request: bool,
    pub is_system: bool,
    pub delivered: bool,
    pub read: bool,
    pub created_at: String,
}
