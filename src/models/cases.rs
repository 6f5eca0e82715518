use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

use super::AttachmentDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CaseStatus {
    Pending,
    Active,
    Won,
    Lost,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Active => "active",
            CaseStatus::Won => "won",
            CaseStatus::Lost => "lost",
            CaseStatus::Closed => "closed",
        }
    }

    /// Forward-only: pending -> active -> {won | lost} -> closed.
    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        matches!(
            (self, next),
            (Pending, Active) | (Active, Won) | (Active, Lost) | (Won, Closed) | (Lost, Closed)
        )
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseRow {
    pub id: String,
    pub lawyer_id: String,
    pub client_id: String,
    pub title: String,
    pub description: String,
    pub status: CaseStatus,
    #[sqlx(rename = "attachments_json")]
    pub attachments: Json<Vec<AttachmentDescriptor>>,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
}
