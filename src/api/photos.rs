//! Photo gallery: upload, replace and delete.
//!
//! Each handler holds the photo lock across its read-modify-write of
//! `photos.json` so concurrent uploads cannot drop each other's entries.

use std::io::ErrorKind;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{
    documents::{load_document, parse_body, save_document},
    done, ApiResult,
};
use crate::auth::now_millis;
use crate::errors::AppError;
use crate::models::{is_plain_file_name, Document, Photo, PhotoLibrary};
use crate::upload::{is_image_name, save_file, timestamped_file_name, ImageUpload, PHOTOS_DIR};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub ok: bool,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePhotoQuery {
    #[serde(default)]
    pub name: String,
}

fn upload_failed() -> AppError {
    AppError::Internal("Upload failed.".to_string())
}

/// POST /api/admin/photos - Store a new gallery photo and list it.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let upload = ImageUpload::from_multipart(multipart).await?;
    let ext = upload.image_extension()?;

    let name = timestamped_file_name(ext, now_millis());
    let dir = state.config.public_dir.join(PHOTOS_DIR);
    let path = save_file(&dir, &name, &upload.data).await?;

    let photo = Photo::new(name.clone(), chrono::Utc::now().to_rfc3339());
    let url = photo.url.clone();

    let listed = {
        let _guard = state.photo_lock.lock().await;
        match load_document::<PhotoLibrary>(&state).await {
            Ok(mut library) => {
                library.0.push(photo);
                save_document(&state, &library).await
            }
            Err(e) => Err(e),
        }
    };

    if let Err(e) = listed {
        tracing::error!("Could not list photo {}: {}", name, e);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove orphaned photo {:?}: {}", path, e);
        }
        return Err(upload_failed());
    }

    tracing::info!("Stored photo {} ({} bytes)", name, upload.data.len());
    Ok(Json(PhotoUploadResponse { ok: true, name, url }))
}

/// PUT /api/admin/photos - Replace the photo list.
pub async fn put_photos(State(state): State<AppState>, body: Bytes) -> ApiResult<()> {
    let library = PhotoLibrary::from_payload(parse_body(&body)?)?;

    let _guard = state.photo_lock.lock().await;
    save_document(&state, &library).await?;
    done()
}

/// DELETE /api/admin/photos?name= - Remove a photo from the list and the disk.
pub async fn delete_photo(
    State(state): State<AppState>,
    Query(query): Query<DeletePhotoQuery>,
) -> ApiResult<()> {
    let name = query
        .name
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();
    if !is_plain_file_name(&name) || !is_image_name(&name) {
        return Err(AppError::validation("Invalid name."));
    }

    let listed = {
        let _guard = state.photo_lock.lock().await;
        let mut library = load_document::<PhotoLibrary>(&state).await?;
        let listed = library.remove(&name);
        if listed {
            save_document(&state, &library).await?;
        }
        listed
    };

    let path = state.config.public_dir.join(PHOTOS_DIR).join(&name);
    let removed = match tokio::fs::remove_file(&path).await {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            tracing::error!("Failed to delete photo {:?}: {}", path, e);
            return Err(AppError::Internal("Could not delete photo.".to_string()));
        }
    };

    if !listed && !removed {
        return Err(AppError::NotFound("Photo not found.".to_string()));
    }

    tracing::info!("Deleted photo {}", name);
    done()
}
