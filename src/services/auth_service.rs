use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure talking to the auth collaborator, carrying its status and body.
#[derive(Debug, Clone)]
pub struct AuthUpstreamError {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl AuthUpstreamError {
    fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self { status, body }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct AuthServiceResponse {
    data: TokenPair,
}

fn connect_failed(url: &str, err: impl ToString) -> AuthUpstreamError {
    AuthUpstreamError::new(
        StatusCode::BAD_GATEWAY,
        Some(serde_json::json!({
            "error": "connect_failed",
            "detail": err.to_string(),
            "url": url
        })),
    )
}

/// Exchanges credentials for a token pair at `<base>/api/v1/auth/login`.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<TokenPair, AuthUpstreamError> {
    let url = format!("{}/api/v1/auth/login", base_url.trim_end_matches('/'));

    let resp = client
        .post(&url)
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| connect_failed(&url, e))?;

    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    if !status.is_success() {
        let body = resp.json::<Value>().await.ok();
        // Anything the provider rejects is a failed login from our side.
        let status = if status.is_client_error() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::BAD_GATEWAY
        };
        return Err(AuthUpstreamError::new(status, body));
    }

    let parsed: AuthServiceResponse = resp.json().await.map_err(|e| connect_failed(&url, e))?;
    Ok(parsed.data)
}
