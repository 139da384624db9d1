//! Filesystem backend: one file per document under the content directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use super::{ReadOutcome, StoreError};

pub struct LocalBackend {
    content_dir: PathBuf,
}

impl LocalBackend {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }

    pub async fn read(&self, name: &str) -> Result<ReadOutcome, StoreError> {
        let path = self.content_dir.join(name);

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(ReadOutcome::Stored(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ReadOutcome::Uninitialized),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    pub async fn write(&self, name: &str, text: &str) -> Result<(), StoreError> {
        let path = self.content_dir.join(name);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&path, text)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path().join("a").join("b"));

        backend.write("about.json", "[]").await.unwrap();
        assert!(dir.path().join("a/b/about.json").exists());
    }

    #[tokio::test]
    async fn test_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());

        backend.write("upcoming.json", "[1, 2, 3]").await.unwrap();
        backend.write("upcoming.json", "[]").await.unwrap();
        assert_eq!(
            backend.read("upcoming.json").await.unwrap(),
            ReadOutcome::Stored("[]".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the document should be cannot be read as text.
        std::fs::create_dir(dir.path().join("photos.json")).unwrap();
        let backend = LocalBackend::new(dir.path());

        assert!(matches!(
            backend.read("photos.json").await,
            Err(StoreError::Io { .. })
        ));
    }
}
