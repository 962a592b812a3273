//! Remote collaborator traits.

use async_trait::async_trait;

use super::model::{PolishResult, RoastResult};
use crate::error::Result;
use crate::profile::ProfileRecord;
use crate::session::UserInfo;

/// The remote roast/polish service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// `POST /roast` with the profile and an optional screenshot `data:` URL.
    async fn roast(&self, profile: &ProfileRecord, screenshot: Option<&str>) -> Result<RoastResult>;

    /// `POST /polish`, optionally grounded in a previous roast.
    async fn polish(
        &self,
        profile: &ProfileRecord,
        roast: Option<&RoastResult>,
    ) -> Result<PolishResult>;

    /// `GET /pro-status?email=`: the subscription authority's answer.
    async fn pro_status(&self, email: &str) -> Result<bool>;
}

/// Resolves an OAuth access token to the account's profile.
#[async_trait]
pub trait UserInfoService: Send + Sync {
    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo>;
}
