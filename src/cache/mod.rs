//! In-process cache of public JSON responses.
//!
//! Entries are keyed by document name and dropped whenever an admin write
//! touches that document, so visitors never see stale content after a save.
//! Every invalidation bumps the document's generation; a reader that loaded
//! the document under an older generation may not publish its value.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Default)]
struct Entries {
    values: HashMap<&'static str, Value>,
    generations: HashMap<&'static str, u64>,
}

#[derive(Default)]
pub struct PageCache {
    entries: RwLock<Entries>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, name: &str) -> Option<Value> {
        self.entries.read().await.values.get(name).cloned()
    }

    /// Current generation of a document; capture it before reading the store.
    pub async fn generation(&self, name: &str) -> u64 {
        self.entries
            .read()
            .await
            .generations
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Cache `value` unless the document was invalidated since `generation`.
    pub async fn insert_if_generation(
        &self,
        name: &'static str,
        generation: u64,
        value: Value,
    ) -> bool {
        let mut entries = self.entries.write().await;
        let current = entries.generations.get(name).copied().unwrap_or(0);
        if current != generation {
            tracing::debug!("Not caching {}: invalidated during read", name);
            return false;
        }
        entries.values.insert(name, value);
        true
    }

    /// Drop the cached response for a document.
    pub async fn invalidate(&self, name: &'static str) {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(name).or_insert(0) += 1;
        if entries.values.remove(name).is_some() {
            tracing::debug!("Invalidated cached {}", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_invalidate() {
        let cache = PageCache::new();
        assert!(cache.get("projects.json").await.is_none());

        let generation = cache.generation("projects.json").await;
        assert!(
            cache
                .insert_if_generation("projects.json", generation, json!([{ "slug": "a" }]))
                .await
        );
        assert!(cache.insert_if_generation("photos.json", 0, json!([])).await);
        assert_eq!(
            cache.get("projects.json").await,
            Some(json!([{ "slug": "a" }]))
        );

        cache.invalidate("projects.json").await;
        assert!(cache.get("projects.json").await.is_none());
        assert_eq!(cache.get("photos.json").await, Some(json!([])));
    }

    #[tokio::test]
    async fn test_read_started_before_invalidation_is_not_cached() {
        let cache = PageCache::new();
        let before = cache.generation("projects.json").await;

        cache.invalidate("projects.json").await;

        assert!(
            !cache
                .insert_if_generation("projects.json", before, json!([{ "slug": "old" }]))
                .await
        );
        assert!(cache.get("projects.json").await.is_none());

        let after = cache.generation("projects.json").await;
        assert_eq!(after, before + 1);
        assert!(
            cache
                .insert_if_generation("projects.json", after, json!([{ "slug": "new" }]))
                .await
        );
    }
}
