//! Film project model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{
    collection_payload, decode_item, ensure_unique, lenient_string, lenient_string_list, Document,
    SlugCollection,
};
use crate::errors::AppError;

const EMPTY_SLUG: &str = "Each project must have a non-empty slug.";

/// A film in the portfolio.
///
/// Only the fields the site relies on are typed; the remaining descriptive
/// fields (genres, runtime, shooting format, ...) are carried through as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub overview: String,
    #[serde(deserialize_with = "lenient_string")]
    pub director_biography: String,
    #[serde(deserialize_with = "lenient_string")]
    pub director_statement: String,
    #[serde(deserialize_with = "lenient_string")]
    pub credits: String,
    #[serde(deserialize_with = "lenient_string")]
    pub main_picture: String,
    /// Image paths shown in the project carousel
    #[serde(deserialize_with = "lenient_string_list")]
    pub carousel: Vec<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// The `projects.json` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Projects(pub Vec<Project>);

impl Document for Projects {
    const NAME: &'static str = "projects.json";
    const LABEL: &'static str = "projects";
    const PUBLIC_CACHED: bool = true;

    fn fallback() -> Self {
        Projects(Vec::new())
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        let items = collection_payload(body, "projects")
            .ok_or_else(|| AppError::validation("Expected an array of projects."))?;

        let mut seen = HashSet::new();
        let mut projects = Vec::with_capacity(items.len());
        for item in items {
            let mut project: Project = decode_item(item, EMPTY_SLUG)?;
            project.slug = project.slug.trim().to_string();
            if project.slug.is_empty() {
                return Err(AppError::validation(EMPTY_SLUG));
            }
            ensure_unique(&mut seen, &project.slug, "project slug")?;
            projects.push(project);
        }

        Ok(Projects(projects))
    }
}

impl SlugCollection for Projects {
    type Item = Project;

    const SLUG_FALLBACK: &'static str = "new-project";
    const NOT_FOUND: &'static str = "Project not found.";

    fn items(&self) -> &[Project] {
        &self.0
    }

    fn slug_of(item: &Project) -> &str {
        &item.slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_array_and_wrapper() {
        let bare = Projects::from_payload(json!([{ "slug": "a", "title": "A" }])).unwrap();
        let wrapped =
            Projects::from_payload(json!({ "projects": [{ "slug": "a", "title": "A" }] })).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.0[0].title, "A");
    }

    #[test]
    fn test_rejects_non_array() {
        let err = Projects::from_payload(json!({ "slug": "a" })).unwrap_err();
        assert_eq!(err.message(), "Expected an array of projects.");
    }

    #[test]
    fn test_rejects_empty_or_missing_slug() {
        for payload in [
            json!([{ "slug": "a" }, { "slug": "" }]),
            json!([{ "slug": "   " }]),
            json!([{ "title": "No slug" }]),
            json!([null]),
        ] {
            let err = Projects::from_payload(payload).unwrap_err();
            assert_eq!(err.message(), EMPTY_SLUG);
        }
    }

    #[test]
    fn test_rejects_duplicate_slugs() {
        let err =
            Projects::from_payload(json!([{ "slug": "same" }, { "slug": "same" }])).unwrap_err();
        assert_eq!(err.message(), "Duplicate project slug: same.");
    }

    #[test]
    fn test_preserves_descriptive_fields() {
        let projects = Projects::from_payload(json!([{
            "slug": "night-shift",
            "title": "Night Shift",
            "runtime": "12 min",
            "genres": "Horror",
            "carousel": ["/images/a.png", null, "/images/b.png"]
        }]))
        .unwrap();

        let project = &projects.0[0];
        assert_eq!(project.details["runtime"], "12 min");
        assert_eq!(project.carousel, vec!["/images/a.png", "/images/b.png"]);

        let encoded: Value = serde_json::from_str(&projects.encode().unwrap()).unwrap();
        assert_eq!(encoded[0]["genres"], "Horror");
        assert_eq!(encoded[0]["directorBiography"], "");
    }

    #[test]
    fn test_lenient_stored_fields() {
        let stored = r#"[{"slug": "a", "title": null, "credits": 3, "carousel": null}]"#;
        let projects = Projects::decode_stored(stored).unwrap();
        assert_eq!(projects.0[0].title, "");
        assert_eq!(projects.0[0].credits, "3");
        assert!(projects.0[0].carousel.is_empty());
    }

    #[test]
    fn test_find_by_slug() {
        let projects = Projects::from_payload(json!([{ "slug": "a" }, { "slug": "b" }])).unwrap();
        assert!(projects.find("b").is_some());
        assert!(projects.find("c").is_none());
        assert_eq!(projects.slugs().len(), 2);
    }
}
