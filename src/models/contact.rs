//! Contact, about and destination-email documents.
//!
//! All three are singletons stored as a one-element list, the shape the
//! admin editor has always saved.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::{lenient_string, singleton_payload, Document};
use crate::errors::AppError;

/// Number of link slots on the about section.
pub const ABOUT_LINK_SLOTS: usize = 4;

/// A labelled outbound link (IMDB, Instagram, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AboutLink {
    #[serde(deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
}

impl AboutLink {
    fn labelled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            url: String::new(),
        }
    }

    fn trimmed(self) -> Self {
        Self {
            label: self.label.trim().to_string(),
            url: self.url.trim().to_string(),
        }
    }
}

/// Pad with empty slots or truncate to exactly four links.
pub fn fit_links(mut links: Vec<AboutLink>) -> Vec<AboutLink> {
    links.truncate(ABOUT_LINK_SLOTS);
    links.resize_with(ABOUT_LINK_SLOTS, AboutLink::default);
    links
}

/// Contact details plus the about-page fields shown next to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub picture: String,
    #[serde(deserialize_with = "lenient_string")]
    pub about_photo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub about_paragraph: String,
    pub about_links: Vec<AboutLink>,
}

impl ContactProfile {
    fn starter() -> Self {
        Self {
            about_links: ["IMDB", "FilmFreeway", "GoFundMe", "Instagram"]
                .into_iter()
                .map(AboutLink::labelled)
                .collect(),
            ..Self::default()
        }
    }
}

/// The `contact.json` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ContactDocument(pub Vec<ContactProfile>);

impl ContactDocument {
    pub fn profile(&self) -> Option<&ContactProfile> {
        self.0.first()
    }
}

impl Document for ContactDocument {
    const NAME: &'static str = "contact.json";
    const LABEL: &'static str = "contact";

    fn fallback() -> Self {
        ContactDocument(vec![ContactProfile::starter()])
    }

    fn normalize(self) -> Self {
        let Some(mut profile) = self.0.into_iter().next() else {
            return Self::fallback();
        };
        profile.about_links = fit_links(profile.about_links);
        ContactDocument(vec![profile])
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        let map = singleton_payload(body)?;
        let raw: ContactProfile = serde_json::from_value(Value::Object(map))
            .map_err(|_| AppError::validation("Invalid payload."))?;

        let email = raw.email.trim().to_string();
        if !email.is_empty() && !is_valid_email(&email) {
            return Err(AppError::validation("Contact email is invalid."));
        }

        let phone = if raw.phone.trim().is_empty() {
            String::new()
        } else {
            normalize_phone(&raw.phone).ok_or_else(|| {
                AppError::validation("Contact phone must be 10 digits (optionally +1).")
            })?
        };

        let profile = ContactProfile {
            name: raw.name.trim().to_string(),
            phone,
            email,
            picture: raw.picture.trim().to_string(),
            about_photo: raw.about_photo.trim().to_string(),
            about_paragraph: raw.about_paragraph.trim().to_string(),
            about_links: fit_links(raw.about_links.into_iter().map(AboutLink::trimmed).collect()),
        };

        Ok(ContactDocument(vec![profile]))
    }
}

/// Photo, paragraph and links for the about page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AboutSection {
    #[serde(deserialize_with = "lenient_string")]
    pub photo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub paragraph: String,
    pub links: Vec<AboutLink>,
}

/// The `about.json` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AboutDocument(pub Vec<AboutSection>);

impl Document for AboutDocument {
    const NAME: &'static str = "about.json";
    const LABEL: &'static str = "about";

    fn fallback() -> Self {
        AboutDocument(vec![AboutSection {
            links: fit_links(Vec::new()),
            ..AboutSection::default()
        }])
    }

    fn normalize(self) -> Self {
        let Some(mut section) = self.0.into_iter().next() else {
            return Self::fallback();
        };
        section.links = fit_links(section.links);
        AboutDocument(vec![section])
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        let map = singleton_payload(body)?;
        let raw: AboutSection = serde_json::from_value(Value::Object(map))
            .map_err(|_| AppError::validation("Invalid payload."))?;

        Ok(AboutDocument(vec![AboutSection {
            photo: raw.photo.trim().to_string(),
            paragraph: raw.paragraph,
            links: fit_links(raw.links.into_iter().map(AboutLink::trimmed).collect()),
        }]))
    }
}

/// Destination address for contact-form messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportantEmail {
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
}

/// The `important.json` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ImportantDocument(pub Vec<ImportantEmail>);

impl Document for ImportantDocument {
    const NAME: &'static str = "important.json";
    const LABEL: &'static str = "important";

    fn fallback() -> Self {
        ImportantDocument(vec![ImportantEmail::default()])
    }

    fn normalize(self) -> Self {
        match self.0.into_iter().next() {
            Some(first) => ImportantDocument(vec![first]),
            None => Self::fallback(),
        }
    }

    fn from_payload(body: Value) -> Result<Self, AppError> {
        let map = singleton_payload(body)?;
        let raw: ImportantEmail = serde_json::from_value(Value::Object(map))
            .map_err(|_| AppError::validation("Invalid payload."))?;

        let email = raw.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(AppError::validation("Email must be a valid email address."));
        }

        Ok(ImportantDocument(vec![ImportantEmail { email }]))
    }
}

/// Practical address check: `local@domain.tld`, no whitespace, one `@`.
pub fn is_valid_email(input: &str) -> bool {
    let s = input.trim();
    if s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot with text on both sides.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Reduce a phone number to 10 digits; a leading country code `1` is dropped.
pub fn normalize_phone(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}
