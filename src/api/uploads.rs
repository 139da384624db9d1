//! Scoped image uploads for projects, contact, upcoming and home posters.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::slug::slugify;
use crate::upload::{
    sanitize_base_name, save_unique_file, ImageUpload, UploadScope, UPLOADS_DIR,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub name: String,
    /// Browser path of the stored file
    pub path: String,
}

/// POST /api/admin/upload - Store an image under `images/uploads/<scope>/<slug>/`.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = ImageUpload::from_multipart(multipart).await?;
    let ext = upload.image_extension()?;

    let scope = UploadScope::parse(upload.scope.as_deref());
    let slug = match slugify(upload.slug.as_deref().unwrap_or_default()) {
        s if s.is_empty() => "misc".to_string(),
        s => s,
    };

    let relative = format!("{}/{}/{}", UPLOADS_DIR, scope.as_str(), slug);
    let dir = state.config.public_dir.join(&relative);
    let base = sanitize_base_name(upload.base_file_name(), "image");

    let name = save_unique_file(&dir, &base, ext, &upload.data).await?;

    tracing::info!("Stored upload {}/{} ({} bytes)", relative, name, upload.data.len());
    Ok(Json(UploadResponse {
        ok: true,
        path: format!("/{}/{}", relative, name),
        name,
    }))
}
