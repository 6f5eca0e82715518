use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Assigned at signup; never changes as far as the workflow is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Client,
    Lawyer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Lawyer => "lawyer",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UsersRow {
    pub id: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

/// Public directory entry; no contact details.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LawyerRow {
    pub id: String,
    pub full_name: String,
    pub specialization: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
}
