//! The two posters featured on the home page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::{lenient_string, Document};
use crate::errors::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Poster {
    #[serde(deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link: String,
}

/// The `homePosters.json` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HomePosters {
    pub left: Poster,
    pub right: Poster,
}

impl Document for HomePosters {
    const NAME: &'static str = "homePosters.json";
    const LABEL: &'static str = "home posters";

    fn fallback() -> Self {
        HomePosters::default()
    }

    fn normalize(self) -> Self {
        let trim = |p: Poster| Poster {
            image: p.image.trim().to_string(),
            link: p.link.trim().to_string(),
        };
        HomePosters {
            left: trim(self.left),
            right: trim(self.right),
        }
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        if !body.is_object() {
            return Err(AppError::validation("Invalid payload."));
        }
        serde_json::from_value::<HomePosters>(body)
            .map(Self::normalize)
            .map_err(|_| AppError::validation("Invalid payload."))
    }

    /// Anything other than an object (older deployments stored `[]`) reads as unset.
    fn decode_stored(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::fallback());
        }
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Ok(Self::fallback());
        }
        serde_json::from_value::<Self>(value).map(Self::normalize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_fills_missing_side() {
        let posters = HomePosters::from_payload(json!({
            "left": { "image": " /images/l.png ", "link": "/projects/a" }
        }))
        .unwrap();

        assert_eq!(posters.left.image, "/images/l.png");
        assert_eq!(posters.right, Poster::default());
    }

    #[test]
    fn test_rejects_array_payload() {
        let err = HomePosters::from_payload(json!([])).unwrap_err();
        assert_eq!(err.message(), "Invalid payload.");
    }

    #[test]
    fn test_array_on_disk_reads_as_default() {
        assert_eq!(
            HomePosters::decode_stored("[]").unwrap(),
            HomePosters::fallback()
        );
        assert!(HomePosters::decode_stored("{not json").is_err());
    }
}
