use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{self, cases_repo, conversations_repo, messages_repo, user_repo};
use crate::error::{conflict_on_unique, AppError, AppResult};
use crate::models::{
    AttachmentDescriptor, ConversationRow, ConversationStatus, ConversationSummaryRow,
    MessageRow, PendingRequestRow, Role,
};
use crate::services::attachment_service::{self, AttachmentPolicy};
use crate::services::Actor;

pub const DEFAULT_MESSAGE_LIMIT: i64 = 50;
pub const MAX_MESSAGE_LIMIT: i64 = 200;

/// Where a message goes: an existing conversation, or the lawyer a client is
/// contacting (located or created on the fly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget<'a> {
    Conversation(&'a str),
    Lawyer(&'a str),
}

impl<'a> MessageTarget<'a> {
    /// A conversation id wins when both are supplied.
    pub fn resolve(conversation_id: Option<&'a str>, lawyer_id: Option<&'a str>) -> AppResult<Self> {
        let non_empty = |s: Option<&'a str>| s.map(str::trim).filter(|s| !s.is_empty());
        match (non_empty(conversation_id), non_empty(lawyer_id)) {
            (Some(id), _) => Ok(Self::Conversation(id)),
            (None, Some(id)) => Ok(Self::Lawyer(id)),
            (None, None) => Err(AppError::validation(
                "conversation_id or target_lawyer_id is required",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    pub conversation_id: String,
    pub conversation_created: bool,
    pub message: MessageRow,
}

pub async fn send_message(
    pool: &SqlitePool,
    policy: &AttachmentPolicy,
    sender: Actor<'_>,
    target: MessageTarget<'_>,
    text: &str,
    attachments: &[AttachmentDescriptor],
) -> AppResult<SentMessage> {
    let text = text.trim();
    if text.is_empty() && attachments.is_empty() {
        return Err(AppError::validation(
            "message needs text or at least one attachment",
        ));
    }
    attachment_service::validate_attachments(policy, attachments)?;

    if let MessageTarget::Lawyer(lawyer_id) = target {
        if sender.role != Role::Client {
            return Err(AppError::forbidden(
                "only clients can open a request with a lawyer",
            ));
        }
        if lawyer_id == sender.id {
            return Err(AppError::validation("cannot message yourself"));
        }
        match user_repo::load_user(pool, lawyer_id).await? {
            Some(user) if user.role == Role::Lawyer => {}
            _ => return Err(AppError::NotFound("lawyer")),
        }
    }

    let now = database::now_timestamp();
    let mut tx = pool.begin().await?;

    let (conversation, created) = match target {
        MessageTarget::Conversation(conversation_id) => {
            // Write first so the transaction holds the lock before we read status.
            if conversations_repo::touch_last_message(&mut *tx, conversation_id, &now).await? == 0
            {
                return Err(AppError::NotFound("conversation"));
            }
            let conversation = conversations_repo::get_conversation_by_id(&mut *tx, conversation_id)
                .await?
                .ok_or(AppError::NotFound("conversation"))?;
            if !conversation.is_participant(sender.id) {
                return Err(AppError::forbidden("not a participant of this conversation"));
            }
            (conversation, false)
        }
        MessageTarget::Lawyer(lawyer_id) => {
            let new_id = Uuid::new_v4().to_string();
            let created = conversations_repo::insert_conversation_if_absent(
                &mut *tx,
                conversations_repo::NewConversation {
                    id: &new_id,
                    client_id: sender.id,
                    lawyer_id,
                    created_at: &now,
                },
            )
            .await?;
            let conversation =
                conversations_repo::get_conversation_by_pair(&mut *tx, sender.id, lawyer_id)
                    .await?
                    .ok_or(AppError::NotFound("conversation"))?;
            conversations_repo::touch_last_message(&mut *tx, &conversation.id, &now).await?;
            (conversation, created)
        }
    };

    admit(&conversation, sender)?;

    let message_id = Uuid::new_v4().to_string();
    messages_repo::insert_message(
        &mut *tx,
        messages_repo::NewMessage {
            id: &message_id,
            conversation_id: &conversation.id,
            sender_id: sender.id,
            content: text,
            attachments,
            is_system: false,
            created_at: &now,
        },
    )
    .await
    .map_err(|e| conflict_on_unique(e, "conversation already has a case request"))?;

    let message = messages_repo::get_message_by_id(&mut *tx, &message_id)
        .await?
        .ok_or(AppError::NotFound("message"))?;
    tx.commit().await?;

    if created {
        info!(
            conversation_id = %conversation.id,
            client_id = %conversation.client_id,
            lawyer_id = %conversation.lawyer_id,
            "case request opened"
        );
    }
    info!(
        conversation_id = %conversation.id,
        message_id = %message.id,
        is_case_request = message.is_case_request,
        attachments = attachments.len(),
        "message sent"
    );

    Ok(SentMessage {
        conversation_id: conversation.id,
        conversation_created: created,
        message,
    })
}

/// Message admission by conversation status.
///
/// A pending conversation takes follow-ups from the client who opened it; the
/// lawyer has to decide before replying. Archived conversations are closed.
fn admit(conversation: &ConversationRow, sender: Actor<'_>) -> AppResult<()> {
    match conversation.status {
        ConversationStatus::Active => Ok(()),
        ConversationStatus::Pending if conversation.client_id == sender.id => Ok(()),
        ConversationStatus::Pending => Err(AppError::conflict(
            "request is awaiting a decision; accept it before replying",
        )),
        ConversationStatus::Archived => Err(AppError::conflict("conversation is archived")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    Accept {
        title: &'a str,
        description: &'a str,
    },
    Reject,
}

impl<'a> Decision<'a> {
    pub fn from_request(
        accepted: bool,
        title: Option<&'a str>,
        description: Option<&'a str>,
    ) -> AppResult<Self> {
        if !accepted {
            return Ok(Self::Reject);
        }
        let title = title.map(str::trim).unwrap_or_default();
        let description = description.map(str::trim).unwrap_or_default();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::validation(
                "title and description are required to accept a request",
            ));
        }
        Ok(Self::Accept { title, description })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub status: ConversationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
}

pub async fn decide_request(
    pool: &SqlitePool,
    lawyer: Actor<'_>,
    conversation_id: &str,
    decision: Decision<'_>,
) -> AppResult<DecisionOutcome> {
    let conversation = load_decidable(pool, lawyer, conversation_id).await?;
    apply_decision(pool, lawyer, &conversation, decision).await
}

/// Decides from unvalidated input. Ownership and state are checked before the
/// accept payload, so a caller who may not decide never sees a 400.
pub async fn decide_submitted_request(
    pool: &SqlitePool,
    lawyer: Actor<'_>,
    conversation_id: &str,
    accepted: bool,
    title: Option<&str>,
    description: Option<&str>,
) -> AppResult<DecisionOutcome> {
    let conversation = load_decidable(pool, lawyer, conversation_id).await?;
    let decision = Decision::from_request(accepted, title, description)?;
    apply_decision(pool, lawyer, &conversation, decision).await
}

async fn load_decidable(
    pool: &SqlitePool,
    lawyer: Actor<'_>,
    conversation_id: &str,
) -> AppResult<ConversationRow> {
    let conversation = conversations_repo::get_conversation_by_id(pool, conversation_id)
        .await?
        .ok_or(AppError::NotFound("conversation"))?;

    if !lawyer.is_lawyer() || conversation.lawyer_id != lawyer.id {
        return Err(AppError::forbidden(
            "only the conversation's lawyer can decide this request",
        ));
    }
    if conversation.status != ConversationStatus::Pending {
        return Err(AppError::conflict(format!(
            "request was already decided (conversation is {})",
            conversation.status.as_str()
        )));
    }
    Ok(conversation)
}

async fn apply_decision(
    pool: &SqlitePool,
    lawyer: Actor<'_>,
    conversation: &ConversationRow,
    decision: Decision<'_>,
) -> AppResult<DecisionOutcome> {
    let conversation_id = conversation.id.as_str();
    match decision {
        Decision::Reject => {
            if conversations_repo::archive_pending(pool, conversation_id).await? == 0 {
                return Err(AppError::conflict("request was already decided"));
            }
            info!(conversation_id, lawyer_id = lawyer.id, "case request rejected");
            Ok(DecisionOutcome {
                status: ConversationStatus::Archived,
                case_id: None,
            })
        }
        Decision::Accept { title, description } => {
            let now = database::now_timestamp();
            let case_id = Uuid::new_v4().to_string();
            let attachments = messages_repo::get_case_request(pool, conversation_id)
                .await?
                .map(|m| m.attachments.0)
                .unwrap_or_default();

            let mut tx = pool.begin().await?;

            cases_repo::insert_case(
                &mut *tx,
                cases_repo::NewCase {
                    id: &case_id,
                    lawyer_id: &conversation.lawyer_id,
                    client_id: &conversation.client_id,
                    title,
                    description,
                    attachments: &attachments,
                    created_at: &now,
                },
            )
            .await?;

            // Dropping the transaction rolls the case back.
            if conversations_repo::activate_pending(&mut *tx, conversation_id, &case_id).await? == 0
            {
                return Err(AppError::conflict("request was already decided"));
            }

            let notice = format!("Request accepted. Case \"{}\" has been opened.", title);
            messages_repo::insert_message(
                &mut *tx,
                messages_repo::NewMessage {
                    id: &Uuid::new_v4().to_string(),
                    conversation_id,
                    sender_id: lawyer.id,
                    content: &notice,
                    attachments: &[],
                    is_system: true,
                    created_at: &now,
                },
            )
            .await?;
            conversations_repo::touch_last_message(&mut *tx, conversation_id, &now).await?;

            tx.commit().await?;
            info!(conversation_id, case_id = %case_id, lawyer_id = lawyer.id, "case request accepted");

            Ok(DecisionOutcome {
                status: ConversationStatus::Active,
                case_id: Some(case_id),
            })
        }
    }
}

pub async fn list_conversations(
    pool: &SqlitePool,
    actor: Actor<'_>,
) -> AppResult<Vec<ConversationSummaryRow>> {
    Ok(conversations_repo::list_conversations_for_user(pool, actor.id).await?)
}

pub async fn list_pending_requests(
    pool: &SqlitePool,
    actor: Actor<'_>,
) -> AppResult<Vec<PendingRequestRow>> {
    if !actor.is_lawyer() {
        return Err(AppError::forbidden("only lawyers receive case requests"));
    }
    Ok(conversations_repo::list_pending_requests(pool, actor.id).await?)
}

async fn load_for_participant(
    pool: &SqlitePool,
    actor: Actor<'_>,
    conversation_id: &str,
) -> AppResult<ConversationRow> {
    let conversation = conversations_repo::get_conversation_by_id(pool, conversation_id)
        .await?
        .ok_or(AppError::NotFound("conversation"))?;
    if !conversation.is_participant(actor.id) {
        return Err(AppError::forbidden("not a participant of this conversation"));
    }
    Ok(conversation)
}

/// Lists messages for a participant and marks the counterpart's messages as
/// delivered.
pub async fn list_messages(
    pool: &SqlitePool,
    actor: Actor<'_>,
    conversation_id: &str,
    limit: Option<i64>,
    before: Option<&str>,
) -> AppResult<Vec<MessageRow>> {
    let conversation = load_for_participant(pool, actor, conversation_id).await?;
    messages_repo::mark_delivered(pool, &conversation.id, actor.id).await?;

    let limit = limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .clamp(1, MAX_MESSAGE_LIMIT);
    Ok(messages_repo::list_messages(pool, &conversation.id, limit, before).await?)
}

pub async fn mark_read(pool: &SqlitePool, actor: Actor<'_>, conversation_id: &str) -> AppResult<u64> {
    let conversation = load_for_participant(pool, actor, conversation_id).await?;
    Ok(messages_repo::mark_read(pool, &conversation.id, actor.id).await?)
}
