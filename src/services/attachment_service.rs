use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::AttachmentDescriptor;

pub const MAX_ATTACHMENTS_PER_MESSAGE: usize = 10;
const MAX_FILE_NAME_CHARS: usize = 120;

#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    pub storage_public_url: String,
    pub max_bytes: u64,
}

impl AttachmentPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            storage_public_url: config.storage_public_url.trim_end_matches('/').to_string(),
            max_bytes: config.attachment_max_bytes,
        }
    }
}

pub fn validate_attachments(
    policy: &AttachmentPolicy,
    attachments: &[AttachmentDescriptor],
) -> AppResult<()> {
    if attachments.len() > MAX_ATTACHMENTS_PER_MESSAGE {
        return Err(AppError::validation(format!(
            "at most {} attachments per message",
            MAX_ATTACHMENTS_PER_MESSAGE
        )));
    }
    for a in attachments {
        if a.name.trim().is_empty() {
            return Err(AppError::validation("attachment name is required"));
        }
        if a.media_type.trim().is_empty() {
            return Err(AppError::validation("attachment type is required"));
        }
        let prefix = format!("{}/", policy.storage_public_url);
        if !a.url.starts_with(&prefix) {
            return Err(AppError::validation(format!(
                "attachment {} does not point at the attachment bucket",
                a.name
            )));
        }
        check_size(policy, a.size.unwrap_or(0))?;
    }
    Ok(())
}

fn check_size(policy: &AttachmentPolicy, size: u64) -> AppResult<()> {
    if size > policy.max_bytes {
        return Err(AppError::validation(format!(
            "attachment exceeds the {} MB limit",
            policy.max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadTarget {
    pub path: String,
    pub public_url: String,
}

/// Object path for a new upload: `<sender>/<recipient>/<millis>-<suffix>-<name>`.
/// Paths are never reused, so concurrent uploads from one user can't collide.
pub fn upload_target(
    policy: &AttachmentPolicy,
    sender_id: &str,
    recipient_id: &str,
    file_name: &str,
    size: u64,
) -> AppResult<UploadTarget> {
    if recipient_id.trim().is_empty() {
        return Err(AppError::validation("recipient_id is required"));
    }
    check_size(policy, size)?;
    let name = sanitize_file_name(file_name);
    if name.is_empty() {
        return Err(AppError::validation("file_name is required"));
    }

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    let path = format!(
        "{}/{}/{}-{}-{}",
        sender_id,
        recipient_id.trim(),
        chrono::Utc::now().timestamp_millis(),
        suffix,
        name
    );
    let public_url = format!("{}/{}", policy.storage_public_url, path);
    Ok(UploadTarget { path, public_url })
}

fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_CHARS)
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
