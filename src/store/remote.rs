//! Remote backend: documents as objects under a fixed key prefix.
//!
//! A document that is absent from the remote store is seeded from the bundled
//! defaults shipped with the deployment, when a seed directory is configured.
//! Seeding only ever follows a definite "not found"; a failed fetch is an
//! error and leaves the store untouched.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;

use super::{ObjectStore, ReadOutcome, StoreError};

const JSON_CONTENT_TYPE: &str = "application/json";

pub struct RemoteBackend {
    objects: Arc<dyn ObjectStore>,
    prefix: String,
    seed_dir: Option<PathBuf>,
}

impl RemoteBackend {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        seed_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            objects,
            prefix: prefix.into(),
            seed_dir,
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub async fn read(&self, name: &str) -> Result<ReadOutcome, StoreError> {
        let key = self.key(name);

        if let Some(body) = self.objects.get(&key).await? {
            let text = String::from_utf8(body.to_vec()).map_err(|e| StoreError::Remote {
                key: key.clone(),
                message: format!("object is not UTF-8: {}", e),
            })?;
            return Ok(ReadOutcome::Stored(text));
        }

        let Some(seed) = self.bundled_default(name).await? else {
            return Ok(ReadOutcome::Uninitialized);
        };

        match self
            .objects
            .put(&key, Bytes::from(seed.clone()), JSON_CONTENT_TYPE)
            .await
        {
            Ok(()) => tracing::info!("Seeded {} from bundled defaults", key),
            Err(e) => tracing::warn!("Failed to seed {} from bundled defaults: {}", key, e),
        }

        Ok(ReadOutcome::Seeded(seed))
    }

    pub async fn write(&self, name: &str, text: &str) -> Result<(), StoreError> {
        let key = self.key(name);
        self.objects
            .put(&key, Bytes::from(text.to_string()), JSON_CONTENT_TYPE)
            .await
    }

    /// Bundled default document shipped next to the binary, if any.
    async fn bundled_default(&self, name: &str) -> Result<Option<String>, StoreError> {
        let Some(dir) = &self.seed_dir else {
            return Ok(None);
        };

        let path = dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
