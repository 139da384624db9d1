//! Public read API used by the site's pages (no auth).

use axum::extract::{Path, State};
use serde_json::Value;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Document, SlugCollection};
use crate::AppState;

/// Load a document for a visitor. Failures degrade to the fallback; the flag
/// reports whether that happened.
async fn load_public<D: Document>(state: &AppState) -> (D, bool) {
    let outcome = match state.store.read(D::NAME).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Serving fallback {}: {}", D::NAME, e);
            return (D::fallback(), true);
        }
    };

    match D::load(&outcome) {
        Ok(document) => (document, false),
        Err(e) => {
            tracing::warn!("Serving fallback {}: stored JSON is invalid: {}", D::NAME, e);
            (D::fallback(), true)
        }
    }
}

/// GET /api/<resource> - Whole document, cached where the document allows.
pub async fn public_document<D: Document>(State(state): State<AppState>) -> ApiResult<Value> {
    if D::PUBLIC_CACHED {
        if let Some(cached) = state.cache.get(D::NAME).await {
            return success(cached);
        }
    }

    let generation = state.cache.generation(D::NAME).await;
    let (document, degraded) = load_public::<D>(&state).await;
    let value = serde_json::to_value(&document).map_err(|e| {
        tracing::error!("Failed to encode {}: {}", D::NAME, e);
        AppError::Internal(format!("Could not read {}.", D::LABEL))
    })?;

    if D::PUBLIC_CACHED && !degraded {
        state
            .cache
            .insert_if_generation(D::NAME, generation, value.clone())
            .await;
    }
    success(value)
}

/// GET /api/<resource>/{slug} - One entry of a slug collection.
pub async fn public_entry<D: SlugCollection>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Value> {
    let (document, _) = load_public::<D>(&state).await;
    let item = document
        .find(&slug)
        .ok_or_else(|| AppError::NotFound(D::NOT_FOUND.to_string()))?;

    let value = serde_json::to_value(item).map_err(|e| {
        tracing::error!("Failed to encode {} entry {}: {}", D::NAME, slug, e);
        AppError::Internal(format!("Could not read {}.", D::LABEL))
    })?;
    success(value)
}
