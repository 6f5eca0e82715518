use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::models::AttachmentDescriptor;
use crate::services::conversation_service::{self, MessageTarget, SentMessage};
use crate::web::extract::ApiJson;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

/// `is_case_request` may be sent by older clients; it is ignored because the
/// server decides which message opens the request.
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub target_lawyer_id: Option<String>,
    pub conversation_id: Option<String>,
    #[serde(default, alias = "content")]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentDescriptor>,
}

pub async fn send_message_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendMessageBody>,
) -> Result<Json<SentMessage>, AppError> {
    let target = MessageTarget::resolve(
        body.conversation_id.as_deref(),
        body.target_lawyer_id.as_deref(),
    )?;

    conversation_service::send_message(
        &state.pool,
        &state.attachments,
        auth_user.actor(),
        target,
        body.text.as_deref().unwrap_or_default(),
        &body.attachments,
    )
    .await
    .map(Json)
    .map_err(|e| {
        warn!(user_id = %auth_user.id, target = ?target, error = %e, "send_message rejected");
        e
    })
}
