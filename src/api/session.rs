//! Admin login and logout.

use axum::{body::Bytes, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiResponse;
use crate::auth;
use crate::errors::AppError;
use crate::models::lenient_string;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    /// Non-string passwords are compared in their JSON text form
    #[serde(default, deserialize_with = "lenient_string")]
    password: String,
}

/// POST /api/admin/login - Check the password and set the admin cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiResponse<()>), AppError> {
    let request: LoginRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Bad request.".to_string()))?;

    let token = auth::issue_token(&request.password, &state.config, auth::now_millis())
        .map_err(|e| {
            tracing::warn!("Admin login refused: {}", e);
            AppError::from(e)
        })?;

    tracing::info!("Admin logged in");
    let cookie = auth::session_cookie(
        token,
        state.config.session_ttl_secs,
        state.config.secure_cookies,
    );
    Ok((jar.add(cookie), ApiResponse::done()))
}

/// POST /api/admin/logout - Clear the admin cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    (jar.remove(auth::removal_cookie()), ApiResponse::done())
}
