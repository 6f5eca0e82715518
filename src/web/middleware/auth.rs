use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::database::user_repo;
use crate::error::{AppError, AppResult};
use crate::models::Role;
use crate::services::Actor;
use crate::web::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Verified caller identity, injected into request extensions by
/// [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor<'_> {
        Actor::new(&self.id, self.role)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: usize,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix("access_token="))
        })
        .filter(|t| !t.is_empty())
}

pub fn verify_access_token(secret: &str, token: &str) -> AppResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // The provider stamps an audience we don't care about.
    validation.validate_aud = false;
    decode::<AccessClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            warn!(error = %e, "access token rejected");
            AppError::Unauthenticated
        })
}

/// Resolves the caller from a bearer header or the `access_token` cookie. The
/// role comes from our own user row, never from the token.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
    let token = bearer_token(headers)
        .or_else(|| cookie_token(headers))
        .ok_or(AppError::Unauthenticated)?;
    let claims = verify_access_token(&state.config.jwt_secret, token)?;

    let user = user_repo::load_user(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "token subject has no user row");
            AppError::Unauthenticated
        })?;

    Ok(AuthenticatedUser {
        id: user.id,
        role: user.role,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, exp: usize) -> String {
        encode(
            &Header::default(),
            &AccessClaims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; access_token=xyz"));
        assert_eq!(bearer_token(&headers).or_else(|| cookie_token(&headers)), Some("abc"));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(cookie_token(&headers), Some("xyz"));
    }

    #[test]
    fn verifies_signature_and_expiry() {
        let good = token("s3cret", "user-1", in_an_hour());
        assert_eq!(verify_access_token("s3cret", &good).unwrap().sub, "user-1");

        assert!(matches!(
            verify_access_token("other", &good),
            Err(AppError::Unauthenticated)
        ));

        let expired = token("s3cret", "user-1", 1_000);
        assert!(matches!(
            verify_access_token("s3cret", &expired),
            Err(AppError::Unauthenticated)
        ));
    }
}
