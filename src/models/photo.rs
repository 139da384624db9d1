//! Photo gallery model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::{collection_payload, decode_item, ensure_unique, lenient_string, Document};
use crate::errors::AppError;
use crate::upload::is_image_name;

/// Public URL prefix of gallery photos.
pub const PHOTOS_URL_PREFIX: &str = "/images/photos";

const INVALID_NAME: &str = "Each photo must have a valid image file name.";

/// An uploaded gallery photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Photo {
    /// File name inside the photos directory
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    /// Upload time (RFC 3339)
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
}

impl Photo {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            url: photo_url(&name),
            name,
            date: date.into(),
        }
    }
}

/// Browser path of a gallery photo.
pub fn photo_url(name: &str) -> String {
    format!("{}/{}", PHOTOS_URL_PREFIX, name)
}

/// A plain file name: no separators, no parent references.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// The `photos.json` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PhotoLibrary(pub Vec<Photo>);

impl PhotoLibrary {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p.name == name)
    }

    /// Remove a photo by name; returns whether it was listed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|p| p.name != name);
        self.0.len() != before
    }
}

impl Document for PhotoLibrary {
    const NAME: &'static str = "photos.json";
    const LABEL: &'static str = "photos";
    const PUBLIC_CACHED: bool = true;

    fn fallback() -> Self {
        PhotoLibrary(Vec::new())
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        let items = collection_payload(body, "photos")
            .ok_or_else(|| AppError::validation("Expected an array of photos."))?;

        let mut seen = HashSet::new();
        let mut photos = Vec::with_capacity(items.len());
        for item in items {
            let mut photo: Photo = decode_item(item, INVALID_NAME)?;
            photo.name = photo.name.trim().to_string();
            if !is_plain_file_name(&photo.name) || !is_image_name(&photo.name) {
                return Err(AppError::validation(INVALID_NAME));
            }
            ensure_unique(&mut seen, &photo.name, "photo name")?;
            if photo.url.trim().is_empty() {
                photo.url = photo_url(&photo.name);
            }
            photos.push(photo);
        }

        Ok(PhotoLibrary(photos))
    }
}
