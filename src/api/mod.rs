//! REST API module.
//!
//! Admin routes live under `/api/admin`, the public read API under `/api`.
//! Every JSON response uses the `{ok, data?}` / `{ok:false, message}` envelope.

mod documents;
mod photos;
mod public;
mod session;
mod slugs;
mod uploads;

pub use documents::*;
pub use photos::*;
pub use public::*;
pub use session::*;
pub use slugs::*;
pub use uploads::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// `{ok:true}` with no payload.
    pub fn done() -> Self {
        Self { ok: true, data: None }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create an empty successful API response.
pub fn done() -> ApiResult<()> {
    Ok(ApiResponse::done())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        assert_eq!(
            serde_json::to_value(ApiResponse::new(vec![1, 2])).unwrap(),
            json!({ "ok": true, "data": [1, 2] })
        );
        assert_eq!(
            serde_json::to_value(ApiResponse::done()).unwrap(),
            json!({ "ok": true })
        );
    }
}
