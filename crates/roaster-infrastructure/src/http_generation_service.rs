//! HTTP client for the remote roast/polish service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use roaster_core::config::RoasterConfig;
use roaster_core::generation::{
    GenerationService, PolishRequest, PolishResult, RoastRequest, RoastResult,
};
use roaster_core::profile::ProfileRecord;
use roaster_core::{Result, RoasterError};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
struct ProStatusResponse {
    /// Absent or `null` means the backend could not tell.
    #[serde(default)]
    is_pro: Option<bool>,
}

/// Talks to the generation backend over JSON/HTTP.
#[derive(Clone)]
pub struct HttpGenerationService {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGenerationService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &RoasterConfig) -> Self {
        Self::new(config.api_base()).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Decodes a success body, or turns the backend's `{detail}` into an error.
    async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        tracing::error!(
            "[Generation] Request failed with {}: {}",
            status.as_u16(),
            detail
        );
        Err(RoasterError::generation(Some(status.as_u16()), detail))
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn roast(&self, profile: &ProfileRecord, screenshot: Option<&str>) -> Result<RoastResult> {
        tracing::info!(
            "[Generation] Generating roast for: {} (screenshot: {})",
            profile.display_name(),
            screenshot.is_some()
        );

        let response = self
            .client
            .post(self.endpoint("roast"))
            .timeout(self.timeout)
            .json(&RoastRequest {
                profile,
                screenshot,
            })
            .send()
            .await?;

        Self::decode(response, "Backend roast failed").await
    }

    async fn polish(
        &self,
        profile: &ProfileRecord,
        roast: Option<&RoastResult>,
    ) -> Result<PolishResult> {
        tracing::info!(
            "[Generation] Polishing profile using roast context: {}",
            roast.is_some()
        );

        let response = self
            .client
            .post(self.endpoint("polish"))
            .timeout(self.timeout)
            .json(&PolishRequest { profile, roast })
            .send()
            .await?;

        Self::decode(response, "Backend polish failed").await
    }

    async fn pro_status(&self, email: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint("pro-status"))
            .query(&[("email", email)])
            .timeout(self.timeout)
            .send()
            .await?;

        let status: ProStatusResponse = Self::decode(response, "Pro status lookup failed").await?;
        let is_pro = status.is_pro.ok_or_else(|| {
            RoasterError::generation(None, "Pro status reply did not include is_pro")
        })?;
        tracing::info!("[Generation] Pro status from API: {}", is_pro);
        Ok(is_pro)
    }
}
