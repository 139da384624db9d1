//! Signed admin token authentication.
//!
//! A successful login issues `"<issued_ms>:<expires_ms>:<nonce>.<signature>"`
//! where the signature is the hex HMAC-SHA256 of everything before the last
//! `.`, keyed by the configured cookie secret. Nothing is stored server-side:
//! a token is valid while its signature checks out and it has not expired.
//! Signatures are compared in constant time to mitigate timing attacks.

use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::Config;
use crate::errors::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the admin token.
pub const ADMIN_COOKIE: &str = "admin_token";

/// Random bytes in the token nonce.
const NONCE_BYTES: usize = 16;

/// Reasons a login attempt is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("admin password or cookie secret is not configured")]
    ServerMisconfigured,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid password.".to_string()),
            AuthError::ServerMisconfigured => {
                AppError::ServerMisconfigured("Server missing ADMIN env vars.".to_string())
            }
        }
    }
}

/// Reasons a presented token is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("signing key rejected")]
    InvalidKey,
}

/// Decoded payload of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub issued_ms: i64,
    pub expires_ms: i64,
    pub nonce: String,
}

impl TokenClaims {
    fn parse(payload: &str) -> Result<Self, TokenError> {
        let mut parts = payload.splitn(3, ':');
        let issued_ms = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or(TokenError::Malformed)?;
        let expires_ms = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or(TokenError::Malformed)?;
        let nonce = parts.next().ok_or(TokenError::Malformed)?;
        if nonce.is_empty() || !nonce.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::Malformed);
        }

        Ok(Self {
            issued_ms,
            expires_ms,
            nonce: nonce.to_string(),
        })
    }
}

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Check a submitted password and mint a signed token.
///
/// The password itself is compared directly; only signatures get the
/// constant-time treatment.
pub fn issue_token(password: &str, config: &Config, now_ms: i64) -> Result<String, AuthError> {
    let (Some(expected), Some(secret)) = (&config.admin_password, &config.admin_secret) else {
        return Err(AuthError::ServerMisconfigured);
    };

    if password != expected {
        return Err(AuthError::InvalidCredentials);
    }

    let mut nonce = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ttl_ms = i64::try_from(config.session_ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    let payload = format!(
        "{}:{}:{}",
        now_ms,
        now_ms.saturating_add(ttl_ms),
        hex::encode(nonce)
    );
    let signature = sign(&payload, secret).map_err(|_| AuthError::ServerMisconfigured)?;

    Ok(format!("{}.{}", payload, signature))
}

/// Verify a token's signature and expiry.
pub fn verify_token(token: &str, secret: &str, now_ms: i64) -> Result<TokenClaims, TokenError> {
    let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
    let expected = sign(payload, secret)?;

    if !constant_time_compare(signature, &expected) {
        return Err(TokenError::BadSignature);
    }

    let claims = TokenClaims::parse(payload)?;
    if now_ms >= claims.expires_ms {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// Hex HMAC-SHA256 of `payload` keyed by `secret`.
fn sign(payload: &str, secret: &str) -> Result<String, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

/// Whether the request carries a valid admin cookie.
pub fn is_admin(jar: &CookieJar, secret: Option<&str>, now_ms: i64) -> bool {
    let (Some(secret), Some(cookie)) = (secret, jar.get(ADMIN_COOKIE)) else {
        return false;
    };

    match verify_token(cookie.value(), secret, now_ms) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Rejected admin token: {}", e);
            false
        }
    }
}

/// Cookie that stores a freshly issued token.
pub fn session_cookie(token: String, ttl_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(
            i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

/// Cookie used to clear the admin token on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(ADMIN_COOKIE).path("/").build()
}

/// Admin authentication layer function that takes the cookie secret as a parameter.
pub async fn admin_auth_layer(secret: Option<String>, request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());

    if is_admin(&jar, secret.as_deref(), now_millis()) {
        next.run(request).await
    } else {
        AppError::unauthorized().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::config::StorageConfig;

    const NOW: i64 = 1_700_000_000_000;

    fn config(password: Option<&str>, secret: Option<&str>) -> Config {
        Config {
            admin_password: password.map(str::to_string),
            admin_secret: secret.map(str::to_string),
            session_ttl_secs: 3600,
            secure_cookies: false,
            storage: StorageConfig::Local {
                content_dir: PathBuf::from("./data"),
            },
            public_dir: PathBuf::from("./public"),
            upload_max_bytes: 1024,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let token = issue_token("correct", &cfg, NOW).unwrap();

        let claims = verify_token(&token, "s3cret", NOW + 1).unwrap();
        assert_eq!(claims.issued_ms, NOW);
        assert_eq!(claims.expires_ms, NOW + 3_600_000);
        assert_eq!(claims.nonce.len(), NONCE_BYTES * 2);
    }

    #[test]
    fn test_tokens_are_unique() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let a = issue_token("correct", &cfg, NOW).unwrap();
        let b = issue_token("correct", &cfg, NOW).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_password() {
        let cfg = config(Some("correct"), Some("s3cret"));
        assert_eq!(
            issue_token("wrong", &cfg, NOW),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(issue_token("", &cfg, NOW), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn test_missing_configuration() {
        assert_eq!(
            issue_token("x", &config(None, Some("s3cret")), NOW),
            Err(AuthError::ServerMisconfigured)
        );
        assert_eq!(
            issue_token("x", &config(Some("x"), None), NOW),
            Err(AuthError::ServerMisconfigured)
        );
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let token = issue_token("correct", &cfg, NOW).unwrap();
        assert_eq!(
            verify_token(&token, "other", NOW),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_any_flipped_signature_char() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let token = issue_token("correct", &cfg, NOW).unwrap();
        let dot = token.rfind('.').unwrap();

        for i in dot + 1..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                verify_token(&tampered, "s3cret", NOW).is_err(),
                "tampered at {}",
                i
            );
        }
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let token = issue_token("correct", &cfg, NOW).unwrap();
        let (payload, sig) = token.rsplit_once('.').unwrap();
        let extended = payload.replacen(&(NOW + 3_600_000).to_string(), "9999999999999", 1);
        assert_eq!(
            verify_token(&format!("{}.{}", extended, sig), "s3cret", NOW),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_missing_separator() {
        assert_eq!(
            verify_token("1700000000000:1700000360000:abcdef", "s3cret", NOW),
            Err(TokenError::Malformed)
        );
        assert_eq!(verify_token("", "s3cret", NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn test_rejects_signed_garbage_payload() {
        let payload = "not-a-payload";
        let token = format!("{}.{}", payload, sign(payload, "s3cret").unwrap());
        assert_eq!(
            verify_token(&token, "s3cret", NOW),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_rejects_expired() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let token = issue_token("correct", &cfg, NOW).unwrap();
        assert_eq!(
            verify_token(&token, "s3cret", NOW + 3_600_000),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_is_admin_requires_secret_and_cookie() {
        let cfg = config(Some("correct"), Some("s3cret"));
        let token = issue_token("correct", &cfg, NOW).unwrap();
        let jar = CookieJar::new().add(session_cookie(token, 3600, false));

        assert!(is_admin(&jar, Some("s3cret"), NOW));
        assert!(!is_admin(&jar, None, NOW));
        assert!(!is_admin(&CookieJar::new(), Some("s3cret"), NOW));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("t".to_string(), 60, true);
        assert_eq!(cookie.name(), ADMIN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
        assert!(!constant_time_compare("short", "much-longer-key"));
        assert!(constant_time_compare("", ""));
    }
}
