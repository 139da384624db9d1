//! Image upload helpers: multipart parsing, type checks and file naming.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::extract::{multipart::MultipartRejection, Multipart};
use bytes::Bytes;
use rand::RngCore;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;
use crate::slug::slugify;

/// Extensions accepted for uploaded images.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Longest sanitized base name kept for uploaded files.
const MAX_BASE_LEN: usize = 80;

/// Directory (relative to the public dir) for scoped uploads.
pub const UPLOADS_DIR: &str = "images/uploads";

/// Directory (relative to the public dir) for gallery photos.
pub const PHOTOS_DIR: &str = "images/photos";

/// Whether a file name ends in an allowed image extension.
pub fn is_image_name(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Lowercase extension of a file name, without the dot.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Extension implied by an image media type.
fn extension_for_media_type(media_type: &str) -> Option<&'static str> {
    let m = media_type.to_ascii_lowercase();
    if m.contains("png") {
        Some("png")
    } else if m.contains("jpeg") || m.contains("jpg") {
        Some("jpg")
    } else if m.contains("webp") {
        Some("webp")
    } else if m.contains("gif") {
        Some("gif")
    } else {
        None
    }
}

/// Base name for stored files: extension dropped, lowercase, runs of other
/// characters collapsed into `-`, at most 80 characters.
pub fn sanitize_base_name(file_name: &str, fallback: &str) -> String {
    let stem = match extension_of(file_name) {
        Some(_) => file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem),
        None => file_name,
    };

    let base: String = slugify(stem).chars().take(MAX_BASE_LEN).collect();
    let base = base.trim_end_matches('-');
    if base.is_empty() {
        fallback.to_string()
    } else {
        base.to_string()
    }
}

/// `<unix_ms>-<16 hex chars>.<ext>`, unique without looking at the directory.
pub fn timestamped_file_name(ext: &str, now_ms: i64) -> String {
    let mut id = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut id);
    format!("{}-{}.{}", now_ms, hex::encode(id), ext)
}

/// Where a scoped upload is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadScope {
    Projects,
    Contact,
    Upcoming,
    Home,
}

impl UploadScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadScope::Projects => "projects",
            UploadScope::Contact => "contact",
            UploadScope::Upcoming => "upcoming",
            UploadScope::Home => "home",
        }
    }

    /// Unknown or missing scopes file under projects.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some("contact") => UploadScope::Contact,
            Some("upcoming") => UploadScope::Upcoming,
            Some("home") => UploadScope::Home,
            _ => UploadScope::Projects,
        }
    }
}

/// A file received in a multipart form, plus the form's text fields.
#[derive(Debug, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub media_type: Option<String>,
    pub data: Bytes,
    pub scope: Option<String>,
    pub slug: Option<String>,
}

impl ImageUpload {
    /// Collect the `file`, `scope` and `slug` fields. A body that is not
    /// multipart or lacks the file is a 400.
    pub async fn from_multipart(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, AppError> {
        let mut multipart = multipart.map_err(|e| {
            tracing::warn!("Rejected upload body: {}", e);
            AppError::BadRequest("Malformed upload.".to_string())
        })?;
        let mut upload = ImageUpload::default();
        let mut has_file = false;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::warn!("Malformed multipart body: {}", e);
            AppError::BadRequest("Malformed upload.".to_string())
        })? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    upload.file_name = field.file_name().unwrap_or_default().to_string();
                    upload.media_type = field.content_type().map(str::to_string);
                    upload.data = field.bytes().await.map_err(|e| {
                        tracing::warn!("Failed to read upload body: {}", e);
                        AppError::BadRequest("Malformed upload.".to_string())
                    })?;
                    has_file = true;
                }
                "scope" | "slug" => {
                    let value = field.text().await.map_err(|e| {
                        tracing::warn!("Failed to read form field {}: {}", name, e);
                        AppError::BadRequest("Malformed upload.".to_string())
                    })?;
                    if name == "scope" {
                        upload.scope = Some(value);
                    } else {
                        upload.slug = Some(value);
                    }
                }
                _ => {}
            }
        }

        if !has_file {
            return Err(AppError::validation("Missing file."));
        }
        Ok(upload)
    }

    /// Checked extension for the stored file (`jpeg` becomes `jpg`).
    pub fn image_extension(&self) -> Result<&'static str, AppError> {
        let ext = match extension_of(&self.file_name) {
            Some(ext) => ALLOWED_EXTENSIONS
                .iter()
                .copied()
                .find(|allowed| *allowed == ext),
            None => self
                .media_type
                .as_deref()
                .and_then(extension_for_media_type),
        }
        .ok_or_else(|| AppError::validation("Unsupported image type."))?;

        if let Some(media_type) = &self.media_type {
            if !media_type.to_ascii_lowercase().starts_with("image/") {
                return Err(AppError::validation("Only image uploads are allowed."));
            }
        }

        Ok(if ext == "jpeg" { "jpg" } else { ext })
    }

    /// File name as sent, reduced to its last path component.
    pub fn base_file_name(&self) -> &str {
        self.file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
    }
}

/// Write `data` to `path`, which must not exist yet. A partly written file is
/// removed again.
async fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = match file.write_all(data).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(e);
    }
    Ok(())
}

async fn create_upload_dir(dir: &Path) -> Result<(), AppError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory {:?}: {}", dir, e);
        AppError::Internal("Upload failed.".to_string())
    })
}

/// Write an uploaded file under a name that is expected to be unused.
pub async fn save_file(dir: &Path, file_name: &str, data: &[u8]) -> Result<PathBuf, AppError> {
    create_upload_dir(dir).await?;

    let path = dir.join(file_name);
    write_new_file(&path, data).await.map_err(|e| {
        tracing::error!("Failed to write upload {:?}: {}", path, e);
        AppError::Internal("Upload failed.".to_string())
    })?;

    Ok(path)
}

/// Write an uploaded file as the first free `base.ext`, `base-2.ext`,
/// `base-3.ext`, ... in `dir` and return the chosen name. Names are claimed by
/// exclusive creation, so concurrent uploads never share one.
pub async fn save_unique_file(
    dir: &Path,
    base: &str,
    ext: &str,
    data: &[u8],
) -> Result<String, AppError> {
    create_upload_dir(dir).await?;

    let mut candidate = format!("{}.{}", base, ext);
    let mut n = 1u32;

    loop {
        let path = dir.join(&candidate);
        match write_new_file(&path, data).await {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = format!("{}-{}.{}", base, n, ext);
            }
            Err(e) => {
                tracing::error!("Failed to write upload {:?}: {}", path, e);
                return Err(AppError::Internal("Upload failed.".to_string()));
            }
        }
    }
}
