use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationStatus {
    Pending,
    Active,
    Archived,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Pending => "pending",
            ConversationStatus::Active => "active",
            ConversationStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationRow {
    pub id: String,
    pub client_id: String,
    pub lawyer_id: String,
    pub case_id: Option<String>,
    pub status: ConversationStatus,
    pub last_message_at: String,
    pub created_at: String,
}

impl ConversationRow {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.client_id == user_id || self.lawyer_id == user_id
    }
}

/// Inbox entry as seen by one participant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationSummaryRow {
    pub id: String,
    pub client_id: String,
    pub lawyer_id: String,
    pub case_id: Option<String>,
    pub status: ConversationStatus,
    pub last_message_at: String,
    pub created_at: String,
    pub counterpart_id: String,
    pub counterpart_name: String,
    pub last_message_preview: Option<String>,
    pub unread_count: i64,
}

/// A lawyer's pending request together with the client's opening message.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingRequestRow {
    pub conversation_id: String,
    pub client_id: String,
    pub client_name: String,
    pub request_message_id: Option<String>,
    pub request_content: Option<String>,
    pub created_at: String,
    pub last_message_at: String,
}
