//! Admin GET/PUT for every JSON document, implemented once over `Document`.

use axum::{body::Bytes, extract::State};
use serde_json::Value;

use super::{done, success, ApiResult};
use crate::errors::AppError;
use crate::models::Document;
use crate::AppState;

/// Read and decode a document; any failure is a 500 naming the document.
pub async fn load_document<D: Document>(state: &AppState) -> Result<D, AppError> {
    let outcome = state.store.read(D::NAME).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", D::NAME, e);
        AppError::Storage(format!("Could not read {}.", D::LABEL))
    })?;

    D::load(&outcome).map_err(|e| {
        tracing::error!("Stored {} is not valid: {}", D::NAME, e);
        AppError::Storage(format!("Could not read {}.", D::LABEL))
    })
}

/// Serialize and write a document, dropping its cached public response.
pub async fn save_document<D: Document>(state: &AppState, document: &D) -> Result<(), AppError> {
    let text = document.encode().map_err(|e| {
        tracing::error!("Failed to encode {}: {}", D::NAME, e);
        AppError::Storage(format!("Could not save {}.", D::LABEL))
    })?;

    state
        .store
        .write(D::NAME, &text)
        .await
        .map_err(|_| AppError::Storage(format!("Could not save {}.", D::LABEL)))?;

    if D::PUBLIC_CACHED {
        state.cache.invalidate(D::NAME).await;
    }
    Ok(())
}

/// Parse a request body as JSON.
pub fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        AppError::BadRequest("Invalid JSON body.".to_string())
    })
}

/// GET /api/admin/<resource> - Current document (fallback when unset).
pub async fn get_document<D: Document>(State(state): State<AppState>) -> ApiResult<D> {
    success(load_document::<D>(&state).await?)
}

/// PUT|POST /api/admin/<resource> - Validate and replace a document.
pub async fn put_document<D: Document>(State(state): State<AppState>, body: Bytes) -> ApiResult<()> {
    let document = D::from_payload(parse_body(&body)?)?;
    save_document(&state, &document).await?;

    tracing::info!("Saved {}", D::NAME);
    done()
}
