//! Key/value storage repository trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Persisted storage keys shared by every context.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const USER: &str = "user";
    pub const USAGE_STATS: &str = "usageStats";
    pub const LAST_PROFILE_DATA: &str = "lastProfileData";
    pub const LAST_PROFILE_URL: &str = "lastProfileUrl";
}

/// Durable key/value storage holding JSON values.
///
/// Implementations must make each `set` and `remove` call all-or-nothing
/// from the caller's perspective.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Returns the stored values for `keys`. Missing keys are simply absent.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Writes every entry in one step.
    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()>;

    /// Removes `keys`. Removing an absent key is not an error.
    async fn remove(&self, keys: &[&str]) -> Result<()>;
}
