//! Content store for the site's JSON documents.
//!
//! Documents are addressed by a logical file name (`projects.json`, ...) and
//! live either as files in a local directory or as objects in a remote object
//! store. The backend is chosen once at start-up from the configuration.

mod local;
mod object;
mod remote;

pub use local::LocalBackend;
#[cfg(test)]
pub use object::MemoryObjectStore;
pub use object::{HttpObjectStore, ObjectStore};
pub use remote::RemoteBackend;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::StorageConfig;

/// Result of reading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The document exists in the backend.
    Stored(String),
    /// The document was absent and has just been copied from the bundled defaults.
    Seeded(String),
    /// Nothing has been saved under this name yet.
    Uninitialized,
}

impl ReadOutcome {
    /// Document text, if there is any.
    pub fn text(&self) -> Option<&str> {
        match self {
            ReadOutcome::Stored(text) | ReadOutcome::Seeded(text) => Some(text),
            ReadOutcome::Uninitialized => None,
        }
    }
}

/// Content store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid document name: {0:?}")]
    InvalidName(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("remote store request for {key} failed: {message}")]
    Remote { key: String, message: String },
    #[error("storage is misconfigured: {0}")]
    Misconfigured(String),
}

enum Backend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

/// Key-value store of JSON documents.
pub struct ContentStore {
    backend: Backend,
}

impl ContentStore {
    /// Store backed by files under `content_dir`.
    pub fn local(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Local(LocalBackend::new(content_dir)),
        }
    }

    /// Store backed by a remote object store.
    pub fn remote(backend: RemoteBackend) -> Self {
        Self {
            backend: Backend::Remote(backend),
        }
    }

    /// Build the store selected by the configuration.
    pub fn from_config(storage: &StorageConfig) -> Result<Self, StoreError> {
        match storage {
            StorageConfig::Local { content_dir } => Ok(Self::local(content_dir.clone())),
            StorageConfig::Remote(remote) => {
                let base_url = remote.base_url.clone().ok_or_else(|| {
                    StoreError::Misconfigured(
                        "BLOB_STORE_URL is required for remote storage".to_string(),
                    )
                })?;
                let objects = HttpObjectStore::new(
                    base_url,
                    remote.token.clone(),
                    Duration::from_secs(remote.timeout_secs),
                )?;
                let seed_dir = remote
                    .seed_dir
                    .clone()
                    .filter(|_| remote.seed_from_bundled);

                Ok(Self::remote(RemoteBackend::new(
                    Arc::new(objects),
                    remote.prefix.clone(),
                    seed_dir,
                )))
            }
        }
    }

    /// Short backend name for logs.
    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Local(_) => "local",
            Backend::Remote(_) => "remote",
        }
    }

    /// Read a document.
    pub async fn read(&self, name: &str) -> Result<ReadOutcome, StoreError> {
        validate_name(name)?;
        tracing::debug!("Reading {} from {} store", name, self.backend_name());

        match &self.backend {
            Backend::Local(local) => local.read(name).await,
            Backend::Remote(remote) => remote.read(name).await,
        }
    }

    /// Replace a document wholesale.
    pub async fn write(&self, name: &str, text: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        tracing::debug!(
            "Writing {} ({} bytes) to {} store",
            name,
            text.len(),
            self.backend_name()
        );

        let result = match &self.backend {
            Backend::Local(local) => local.write(name, text).await,
            Backend::Remote(remote) => remote.write(name, text).await,
        };

        if let Err(e) = &result {
            tracing::error!("Failed to write {}: {}", name, e);
        }
        result
    }
}

/// Logical names are plain `*.json` file names.
fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = name
        .strip_suffix(".json")
        .is_some_and(|stem| {
            !stem.is_empty()
                && stem
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteStorageConfig;
    use tempfile::TempDir;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("projects.json").is_ok());
        assert!(validate_name("homePosters.json").is_ok());
        assert!(validate_name("my_doc-2.json").is_ok());

        assert!(validate_name(".json").is_err());
        assert!(validate_name("projects").is_err());
        assert!(validate_name("../secrets.json").is_err());
        assert!(validate_name("nested/doc.json").is_err());
        assert!(validate_name("doc.txt").is_err());
    }

    #[tokio::test]
    async fn test_local_round_trip_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::local(dir.path().join("content"));
        let text = "[\n  {\n    \"slug\": \"a\",\n    \"title\": \"Ünïcode ✓\"\n  }\n]";

        assert_eq!(
            store.read("projects.json").await.unwrap(),
            ReadOutcome::Uninitialized
        );

        store.write("projects.json", text).await.unwrap();
        assert_eq!(
            store.read("projects.json").await.unwrap(),
            ReadOutcome::Stored(text.to_string())
        );
    }

    #[tokio::test]
    async fn test_remote_round_trip_is_byte_identical() {
        let objects = Arc::new(MemoryObjectStore::default());
        let store = ContentStore::remote(RemoteBackend::new(objects.clone(), "data/", None));
        let text = "{\"left\":{\"image\":\"/a.png\",\"link\":\"\"}}";

        store.write("homePosters.json", text).await.unwrap();
        assert_eq!(
            store.read("homePosters.json").await.unwrap(),
            ReadOutcome::Stored(text.to_string())
        );
        assert!(objects.contains("data/homePosters.json").await);
    }

    #[tokio::test]
    async fn test_rejects_invalid_names() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::local(dir.path());

        assert!(matches!(
            store.read("../etc/passwd.json").await,
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.write("a/b.json", "[]").await,
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_from_config_requires_remote_url() {
        let storage = StorageConfig::Remote(RemoteStorageConfig {
            base_url: None,
            token: None,
            prefix: "data/".to_string(),
            seed_dir: None,
            seed_from_bundled: true,
            timeout_secs: 10,
        });

        assert!(matches!(
            ContentStore::from_config(&storage),
            Err(StoreError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_from_config_selects_backend() {
        let local = ContentStore::from_config(&StorageConfig::Local {
            content_dir: PathBuf::from("./data"),
        })
        .unwrap();
        assert_eq!(local.backend_name(), "local");

        let remote = ContentStore::from_config(&StorageConfig::Remote(RemoteStorageConfig {
            base_url: Some("http://127.0.0.1:9/blobs".to_string()),
            token: Some("token".to_string()),
            prefix: "data/".to_string(),
            seed_dir: None,
            seed_from_bundled: true,
            timeout_secs: 1,
        }))
        .unwrap();
        assert_eq!(remote.backend_name(), "remote");
    }
}
