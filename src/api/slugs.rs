//! Slug suggestions for new collection entries.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{documents::load_document, success, ApiResult};
use crate::models::SlugCollection;
use crate::slug::{slugify, unique_slug};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SlugSuggestion {
    pub slug: String,
}

/// GET /api/admin/<resource>/slug?title= - Free slug derived from a title.
pub async fn suggest_slug<D: SlugCollection>(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> ApiResult<SlugSuggestion> {
    let document = load_document::<D>(&state).await?;
    let slug = unique_slug(&slugify(&query.title), &document.slugs(), D::SLUG_FALLBACK);
    success(SlugSuggestion { slug })
}
