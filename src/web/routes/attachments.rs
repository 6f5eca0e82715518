use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::attachment_service::{self, UploadTarget};
use crate::web::extract::ApiJson;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadPathBody {
    pub recipient_id: String,
    pub file_name: String,
    pub size: u64,
}

pub async fn upload_path_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UploadPathBody>,
) -> Result<Json<UploadTarget>, AppError> {
    attachment_service::upload_target(
        &state.attachments,
        &auth_user.id,
        &body.recipient_id,
        &body.file_name,
        body.size,
    )
    .map(Json)
}
