use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cookie::{Cookie, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::services::auth_service;
use crate::web::middleware::auth::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::web::AppState;

#[derive(Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn with_cookies(mut response: Response, cookies: [Cookie<'static>; 2]) -> Response {
    for cookie in cookies {
        if let Ok(value) = cookie.to_string().parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Proxies credentials to the auth provider and stores the issued tokens as
/// http-only cookies.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let tokens = auth_service::login(
        &state.http,
        &state.config.auth_api_url,
        &body.email,
        &body.password,
    )
    .await
    .map_err(|e| {
        warn!(status = %e.status, body = ?e.body, "auth_login_failed");
        let error = if e.status == StatusCode::UNAUTHORIZED {
            "invalid_credentials"
        } else {
            "auth_unavailable"
        };
        (e.status, Json(json!({ "error": error })))
    })?;

    info!("login succeeded");
    let response = Json(json!({ "ok": true })).into_response();
    Ok(with_cookies(
        response,
        [
            session_cookie(ACCESS_COOKIE, tokens.access_token),
            session_cookie(REFRESH_COOKIE, tokens.refresh_token),
        ],
    ))
}

pub async fn logout_handler() -> Response {
    let clear = |name: &'static str| {
        let mut cookie = session_cookie(name, String::new());
        cookie.set_max_age(cookie::time::Duration::ZERO);
        cookie
    };
    with_cookies(
        Json(json!({ "ok": true })).into_response(),
        [clear(ACCESS_COOKIE), clear(REFRESH_COOKIE)],
    )
}
