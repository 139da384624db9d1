//! Upcoming screening/event model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{
    collection_payload, decode_item, ensure_unique, lenient_string, Document, SlugCollection,
};
use crate::errors::AppError;

const EMPTY_SLUG: &str = "Each upcoming item must have a non-empty slug.";

/// An upcoming screening, festival or event poster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UpcomingItem {
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `upcoming.json` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UpcomingItems(pub Vec<UpcomingItem>);

impl Document for UpcomingItems {
    const NAME: &'static str = "upcoming.json";
    const LABEL: &'static str = "upcoming";

    fn fallback() -> Self {
        UpcomingItems(Vec::new())
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        let items = collection_payload(body, "items")
            .ok_or_else(|| AppError::validation("Expected an array."))?;

        let mut seen = HashSet::new();
        let mut upcoming = Vec::with_capacity(items.len());
        for item in items {
            let mut item: UpcomingItem = decode_item(item, EMPTY_SLUG)?;
            item.slug = item.slug.trim().to_string();
            if item.slug.is_empty() {
                return Err(AppError::validation(EMPTY_SLUG));
            }
            if item.title.trim().is_empty() {
                return Err(AppError::validation("Each upcoming item must have a title."));
            }
            if item.image.trim().is_empty() {
                return Err(AppError::validation(
                    "Each upcoming item must have an image path.",
                ));
            }
            ensure_unique(&mut seen, &item.slug, "upcoming slug")?;
            upcoming.push(item);
        }

        Ok(UpcomingItems(upcoming))
    }
}

impl SlugCollection for UpcomingItems {
    type Item = UpcomingItem;

    const SLUG_FALLBACK: &'static str = "new-poster";
    const NOT_FOUND: &'static str = "Upcoming item not found.";

    fn items(&self) -> &[UpcomingItem] {
        &self.0
    }

    fn slug_of(item: &UpcomingItem) -> &str {
        &item.slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(slug: &str, title: &str, image: &str) -> Value {
        json!({ "slug": slug, "title": title, "image": image })
    }

    #[test]
    fn test_valid_items() {
        let items = UpcomingItems::from_payload(json!({
            "items": [
                item("premiere", "Premiere", "/images/p.png"),
                item("q-and-a", "Q&A", "/images/q.png")
            ]
        }))
        .unwrap();
        assert_eq!(items.0.len(), 2);
        assert_eq!(items.0[1].title, "Q&A");
    }

    #[test]
    fn test_field_specific_messages() {
        let cases = [
            (item("", "T", "/i.png"), EMPTY_SLUG),
            (item("a", "", "/i.png"), "Each upcoming item must have a title."),
            (item("a", "T", ""), "Each upcoming item must have an image path."),
        ];
        for (payload, message) in cases {
            let err = UpcomingItems::from_payload(json!([payload])).unwrap_err();
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn test_duplicate_slugs() {
        let err = UpcomingItems::from_payload(json!([
            item("a", "One", "/1.png"),
            item("a", "Two", "/2.png")
        ]))
        .unwrap_err();
        assert_eq!(err.message(), "Duplicate upcoming slug: a.");
    }

    #[test]
    fn test_rejects_non_array() {
        let err = UpcomingItems::from_payload(json!(42)).unwrap_err();
        assert_eq!(err.message(), "Expected an array.");
    }
}
