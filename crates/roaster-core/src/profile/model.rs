//! ProfileRecord domain model.
//!
//! A snapshot of one profile page, produced by the page-side extractor.
//! Records are never mutated after hand-off; a new extraction supersedes the old one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the experience section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub description: String,
}

/// One entry of the education section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub school: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub degree: String,
}

/// Extracted profile data as exchanged on the wire (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub has_profile_picture: bool,
    #[serde(
        default = "unknown_connections",
        deserialize_with = "connections_or_unknown"
    )]
    pub connections: String,
    /// Always within 0..=100.
    #[serde(default, deserialize_with = "crate::wire::percentage")]
    pub completeness_score: u8,
    /// Set by the extractor when scraping partially failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn unknown_connections() -> String {
    "Unknown".to_string()
}

fn connections_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_connections))
}

impl ProfileRecord {
    /// Creates an empty record for `url`, stamped now.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now(),
            name: None,
            headline: None,
            about: None,
            location: None,
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            has_profile_picture: false,
            connections: unknown_connections(),
            completeness_score: 0,
            error: None,
        }
    }

    pub fn with_completeness(mut self, score: f64) -> Self {
        self.completeness_score = crate::wire::clamp_percentage(score);
        self
    }

    /// Returns a copy re-anchored at `url`.
    ///
    /// The panel always trusts the URL it validated over whatever the
    /// extractor reported.
    pub fn anchored_at(&self, url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..self.clone()
        }
    }

    /// Display name, falling back to "Unknown".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Display headline, falling back to "No headline".
    pub fn display_headline(&self) -> &str {
        self.headline.as_deref().unwrap_or("No headline")
    }
}
