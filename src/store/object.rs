//! Object store clients used by the remote backend.
//!
//! The remote store is addressed purely by key: `GET <base>/<key>` returns the
//! object or `404`, `PUT <base>/<key>` replaces it. Lookups never go through a
//! listing or a secondary index.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, StatusCode};

use super::StoreError;

/// Minimal key-addressed blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object; `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Create or replace an object.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError>;
}

/// Object store spoken to over HTTP.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Misconfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn remote_error(key: &str, message: impl ToString) -> StoreError {
    StoreError::Remote {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let response = self
            .authorize(self.client.get(self.url(key)))
            .send()
            .await
            .map_err(|e| remote_error(key, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .bytes()
                .await
                .map(Some)
                .map_err(|e| remote_error(key, e)),
            status => Err(remote_error(key, format!("unexpected status {}", status))),
        }
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let response = self
            .authorize(self.client.put(self.url(key)))
            .header(header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| remote_error(key, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(remote_error(
                key,
                format!("unexpected status {}", response.status()),
            ))
        }
    }
}

/// In-process object store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: tokio::sync::RwLock<std::collections::HashMap<String, Bytes>>,
    failing: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryObjectStore {
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn insert(&self, key: &str, body: &str) {
        self.objects
            .write()
            .await
            .insert(key.to_string(), Bytes::from(body.to_string()));
    }

    pub async fn remove(&self, key: &str) {
        self.objects.write().await.remove(key);
    }

    /// Make every subsequent request fail as if the store were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            Err(remote_error(key, "store unavailable"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.check(key)?;
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<(), StoreError> {
        self.check(key)?;
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{
        body::Bytes as BodyBytes,
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Router,
    };
    use tokio::sync::RwLock;

    type Objects = Arc<RwLock<HashMap<String, BodyBytes>>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer blob-token")
    }

    async fn get_object(
        State(objects): State<Objects>,
        Path(key): Path<String>,
        headers: HeaderMap,
    ) -> Result<BodyBytes, AxumStatus> {
        if !authorized(&headers) {
            return Err(AxumStatus::FORBIDDEN);
        }
        objects
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(AxumStatus::NOT_FOUND)
    }

    async fn put_object(
        State(objects): State<Objects>,
        Path(key): Path<String>,
        headers: HeaderMap,
        body: BodyBytes,
    ) -> AxumStatus {
        if !authorized(&headers) {
            return AxumStatus::FORBIDDEN;
        }
        objects.write().await.insert(key, body);
        AxumStatus::CREATED
    }

    /// Start a throw-away object store server and return its base URL.
    async fn spawn_blob_server() -> String {
        let objects: Objects = Arc::default();
        let app = Router::new()
            .route("/blobs/{*key}", get(get_object).put(put_object))
            .with_state(objects);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/blobs/", addr)
    }

    #[tokio::test]
    async fn test_http_store_round_trip() {
        let base = spawn_blob_server().await;
        let store =
            HttpObjectStore::new(base, Some("blob-token".into()), Duration::from_secs(5)).unwrap();

        assert_eq!(store.get("data/projects.json").await.unwrap(), None);

        store
            .put(
                "data/projects.json",
                Bytes::from_static(b"[{\"slug\":\"a\"}]"),
                "application/json",
            )
            .await
            .unwrap();

        assert_eq!(
            store.get("data/projects.json").await.unwrap(),
            Some(Bytes::from_static(b"[{\"slug\":\"a\"}]"))
        );
    }

    #[tokio::test]
    async fn test_http_store_error_status_is_not_absence() {
        let base = spawn_blob_server().await;
        let store = HttpObjectStore::new(base, None, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            store.get("data/projects.json").await,
            Err(StoreError::Remote { .. })
        ));
        assert!(matches!(
            store
                .put("data/projects.json", Bytes::new(), "application/json")
                .await,
            Err(StoreError::Remote { .. })
        ));
    }

    #[tokio::test]
    async fn test_http_store_unreachable() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let store =
            HttpObjectStore::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();

        assert!(matches!(
            store.get("data/projects.json").await,
            Err(StoreError::Remote { .. })
        ));
    }
}
