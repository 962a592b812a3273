//! Roast and polish payloads exchanged with the generation service.

use serde::{Deserialize, Serialize};

use crate::profile::ProfileRecord;

/// Body of `POST /roast`: the profile fields plus an optional screenshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastRequest<'a> {
    #[serde(flatten)]
    pub profile: &'a ProfileRecord,
    /// `data:` URL of the visible tab, `null` when capture failed.
    pub screenshot: Option<&'a str>,
}

/// Body of `POST /polish`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolishRequest<'a> {
    pub profile: &'a ProfileRecord,
    pub roast: Option<&'a RoastResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoastResult {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub advice: Vec<String>,
    /// Out of ten.
    #[serde(default)]
    pub rating: Option<f64>,
}

impl RoastResult {
    /// Rating as shown to users: whole numbers without a trailing `.0`.
    pub fn rating_label(&self) -> Option<String> {
        self.rating.map(|rating| {
            if rating.fract() == 0.0 {
                format!("{}/10", rating as i64)
            } else {
                format!("{:.1}/10", rating)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolishedExperience {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub original: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub polished: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolishResult {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub branding_tip: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub headline: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub experience: Vec<PolishedExperience>,
}
