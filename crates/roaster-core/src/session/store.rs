//! Session store: persisted session, usage and profile hand-off state.
//!
//! The store owns the merge and reset rules and nothing else. Every
//! read-modify-write goes through one async mutex so interleaved handlers in
//! the same context can never lose an update.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use super::model::{Clock, Session, SystemClock, UsageStats, User, UserPatch};
use super::repository::{StorageRepository, keys};
use crate::error::Result;
use crate::profile::ProfileRecord;

/// Everything persisted about the current user, read in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    /// Usage as it applies today; a stale day reads as a zero count.
    pub usage: UsageStats,
}

/// Outcome of the daily roast gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoastAllowance {
    /// The roast may proceed; `count` is today's count including this one.
    Permitted { count: u32 },
    /// The daily limit is exhausted; `count` is unchanged.
    Denied { count: u32 },
}

impl RoastAllowance {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted { .. })
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::Permitted { count } | Self::Denied { count } => *count,
        }
    }
}

/// A profile the router parked because no panel was listening.
#[derive(Debug, Clone, PartialEq)]
pub struct StashedProfile {
    pub data: ProfileRecord,
    pub url: String,
}

pub struct SessionStore {
    storage: Arc<dyn StorageRepository>,
    clock: Arc<dyn Clock>,
    /// Serializes mutations.
    mutations: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn StorageRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            mutations: Mutex::new(()),
        }
    }

    /// Creates a store that rolls usage over on the UTC calendar day.
    pub fn with_system_clock(storage: Arc<dyn StorageRepository>) -> Self {
        Self::new(storage, Arc::new(SystemClock))
    }

    /// Reads the persisted session and today's usage. Never writes.
    pub async fn load(&self) -> Result<SessionSnapshot> {
        let mut values = self
            .storage
            .get(&[keys::ACCESS_TOKEN, keys::USER, keys::USAGE_STATS])
            .await?;

        let token: Option<String> = decode(&mut values, keys::ACCESS_TOKEN);
        let user: Option<User> = decode(&mut values, keys::USER);
        let usage = self.usage_from(decode(&mut values, keys::USAGE_STATS));

        let session = match (token, user) {
            (Some(access_token), Some(user)) => Some(Session { access_token, user }),
            _ => None,
        };

        Ok(SessionSnapshot { session, usage })
    }

    /// Overwrites the persisted session; token and user land in one write.
    pub async fn save(&self, session: &Session) -> Result<()> {
        let _guard = self.mutations.lock().await;
        self.storage
            .set(vec![
                encode(keys::ACCESS_TOKEN, &session.access_token)?,
                encode(keys::USER, &session.user)?,
            ])
            .await?;
        tracing::debug!("[SessionStore] Saved session for {}", session.user.email);
        Ok(())
    }

    /// Stores a fresh token and merges `patch` into the stored user in one write.
    ///
    /// `is_pro` survives unless the patch names it.
    pub async fn update_session(&self, access_token: &str, patch: &UserPatch) -> Result<User> {
        let _guard = self.mutations.lock().await;
        let mut user = self.current_user().await?.unwrap_or_default();
        user.apply(patch);
        self.storage
            .set(vec![
                encode(keys::ACCESS_TOKEN, &access_token)?,
                encode(keys::USER, &user)?,
            ])
            .await?;
        Ok(user)
    }

    /// Merges `patch` into the stored user (or a blank one) and persists it.
    ///
    /// The access token is left alone.
    pub async fn merge_user(&self, patch: &UserPatch) -> Result<User> {
        let _guard = self.mutations.lock().await;
        let mut user = self.current_user().await?.unwrap_or_default();
        user.apply(patch);
        self.storage.set(vec![encode(keys::USER, &user)?]).await?;
        tracing::debug!(
            "[SessionStore] Merged user {} (pro: {})",
            user.email,
            user.is_pro
        );
        Ok(user)
    }

    /// Counts one roast for today and returns the new count.
    pub async fn bump_usage(&self) -> Result<u32> {
        let _guard = self.mutations.lock().await;
        let mut usage = self.stored_usage().await?;
        usage.count += 1;
        self.storage
            .set(vec![encode(keys::USAGE_STATS, &usage)?])
            .await?;
        Ok(usage.count)
    }

    /// Daily roast gate: permits while today's count is below `limit`, or
    /// always when `unlimited`. A permit counts the roast in the same step.
    pub async fn consume_roast(&self, limit: u32, unlimited: bool) -> Result<RoastAllowance> {
        let _guard = self.mutations.lock().await;
        let mut usage = self.stored_usage().await?;

        if !unlimited && usage.count >= limit {
            return Ok(RoastAllowance::Denied { count: usage.count });
        }

        usage.count += 1;
        self.storage
            .set(vec![encode(keys::USAGE_STATS, &usage)?])
            .await?;
        tracing::info!(
            "[SessionStore] Roast usage for {}: {}/{}",
            usage.date,
            usage.count,
            limit
        );
        Ok(RoastAllowance::Permitted { count: usage.count })
    }

    /// Today's usage without persisting a rollover.
    pub async fn usage(&self) -> Result<UsageStats> {
        let mut values = self.storage.get(&[keys::USAGE_STATS]).await?;
        Ok(self.usage_from(decode(&mut values, keys::USAGE_STATS)))
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        let mut values = self.storage.get(&[keys::ACCESS_TOKEN]).await?;
        Ok(decode(&mut values, keys::ACCESS_TOKEN))
    }

    /// Removes the session keys only; usage and the stashed profile stay.
    pub async fn clear_session(&self) -> Result<()> {
        let _guard = self.mutations.lock().await;
        self.storage
            .remove(&[keys::ACCESS_TOKEN, keys::USER])
            .await?;
        tracing::info!("[SessionStore] Session cleared");
        Ok(())
    }

    /// Parks a profile for later pickup. A second stash overwrites the first.
    pub async fn stash_last_profile(&self, data: &ProfileRecord, url: &str) -> Result<()> {
        let _guard = self.mutations.lock().await;
        self.storage
            .set(vec![
                encode(keys::LAST_PROFILE_DATA, data)?,
                encode(keys::LAST_PROFILE_URL, &url)?,
            ])
            .await
    }

    /// Peeks at the parked profile.
    pub async fn last_profile(&self) -> Result<Option<StashedProfile>> {
        let mut values = self
            .storage
            .get(&[keys::LAST_PROFILE_DATA, keys::LAST_PROFILE_URL])
            .await?;
        Ok(stashed_from(&mut values))
    }

    /// Claims the parked profile, clearing the slot.
    pub async fn take_last_profile(&self) -> Result<Option<StashedProfile>> {
        let _guard = self.mutations.lock().await;
        let mut values = self
            .storage
            .get(&[keys::LAST_PROFILE_DATA, keys::LAST_PROFILE_URL])
            .await?;
        let stashed = stashed_from(&mut values);
        if stashed.is_some() {
            self.storage
                .remove(&[keys::LAST_PROFILE_DATA, keys::LAST_PROFILE_URL])
                .await?;
        }
        Ok(stashed)
    }

    async fn current_user(&self) -> Result<Option<User>> {
        let mut values = self.storage.get(&[keys::USER]).await?;
        Ok(decode(&mut values, keys::USER))
    }

    async fn stored_usage(&self) -> Result<UsageStats> {
        let mut values = self.storage.get(&[keys::USAGE_STATS]).await?;
        Ok(self.usage_from(decode(&mut values, keys::USAGE_STATS)))
    }

    fn usage_from(&self, stored: Option<UsageStats>) -> UsageStats {
        let today = self.clock.today();
        match stored {
            Some(stats) => stats.for_day(today),
            None => UsageStats::fresh(today),
        }
    }
}

fn stashed_from(values: &mut HashMap<String, Value>) -> Option<StashedProfile> {
    let data: ProfileRecord = decode(values, keys::LAST_PROFILE_DATA)?;
    let url: Option<String> = decode(values, keys::LAST_PROFILE_URL);
    let url = url.unwrap_or_else(|| data.url.clone());
    Some(StashedProfile { data, url })
}

/// Reads `key` out of `values`. Nulls and undecodable values read as absent.
fn decode<T: DeserializeOwned>(values: &mut HashMap<String, Value>, key: &str) -> Option<T> {
    match values.remove(key) {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("[SessionStore] Ignoring unreadable '{}': {}", key, e);
                None
            }
        },
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<(String, Value)> {
    Ok((key.to_string(), serde_json::to_value(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::format_day;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex as StdMutex;

    // Mock StorageRepository for testing
    struct MockStorage {
        values: StdMutex<HashMap<String, Value>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                values: StdMutex::new(HashMap::new()),
            }
        }

        fn raw(&self, key: &str) -> Option<Value> {
            self.values.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl StorageRepository for MockStorage {
        async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
            let values = self.values.lock().unwrap();
            Ok(keys
                .iter()
                .filter_map(|k| values.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect())
        }

        async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
            let mut values = self.values.lock().unwrap();
            values.extend(entries);
            Ok(())
        }

        async fn remove(&self, keys: &[&str]) -> Result<()> {
            let mut values = self.values.lock().unwrap();
            for key in keys {
                values.remove(*key);
            }
            Ok(())
        }
    }

    struct FixedClock(StdMutex<NaiveDate>);

    impl FixedClock {
        fn at(day: &str) -> Self {
            Self(StdMutex::new(
                NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            ))
        }

        fn advance(&self) {
            let mut day = self.0.lock().unwrap();
            *day = day.succ_opt().unwrap();
        }
    }

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            *self.0.lock().unwrap()
        }
    }

    fn store() -> (SessionStore, Arc<MockStorage>, Arc<FixedClock>) {
        let storage = Arc::new(MockStorage::new());
        let clock = Arc::new(FixedClock::at("2026-10-19"));
        (
            SessionStore::new(storage.clone(), clock.clone()),
            storage,
            clock,
        )
    }

    fn session(is_pro: bool) -> Session {
        Session {
            access_token: "tok-1".to_string(),
            user: User {
                id: "42".to_string(),
                email: "jane@example.com".to_string(),
                name: "Jane".to_string(),
                picture: String::new(),
                is_pro,
            },
        }
    }

    #[tokio::test]
    async fn test_load_empty_returns_defaults() {
        let (store, _, _) = store();
        let snapshot = store.load().await.unwrap();
        assert!(snapshot.session.is_none());
        assert_eq!(snapshot.usage.count, 0);
        assert_eq!(snapshot.usage.date, "2026-10-19");
    }

    #[tokio::test]
    async fn test_load_does_not_write() {
        let (store, storage, _) = store();
        store.load().await.unwrap();
        assert!(storage.raw(keys::USAGE_STATS).is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (store, _, _) = store();
        store.save(&session(false)).await.unwrap();
        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.session, Some(session(false)));
    }

    #[tokio::test]
    async fn test_bump_usage_counts_up_within_a_day() {
        let (store, _, _) = store();
        for expected in 1..=5 {
            assert_eq!(store.bump_usage().await.unwrap(), expected);
        }
        assert_eq!(store.usage().await.unwrap().count, 5);
    }

    #[tokio::test]
    async fn test_bump_usage_resets_on_new_day() {
        let (store, storage, clock) = store();
        storage
            .set(vec![(
                keys::USAGE_STATS.to_string(),
                serde_json::json!({"date": "2026-10-01", "count": 99}),
            )])
            .await
            .unwrap();

        assert_eq!(store.bump_usage().await.unwrap(), 1);

        clock.advance();
        assert_eq!(store.bump_usage().await.unwrap(), 1);
        assert_eq!(
            storage.raw(keys::USAGE_STATS).unwrap()["date"],
            format_day(clock.today())
        );
    }

    #[tokio::test]
    async fn test_consume_roast_at_limit_boundary() {
        let (store, storage, _) = store();
        storage
            .set(vec![(
                keys::USAGE_STATS.to_string(),
                serde_json::json!({"date": "2026-10-19", "count": 7}),
            )])
            .await
            .unwrap();

        assert_eq!(
            store.consume_roast(8, false).await.unwrap(),
            RoastAllowance::Permitted { count: 8 }
        );
        assert_eq!(
            store.consume_roast(8, false).await.unwrap(),
            RoastAllowance::Denied { count: 8 }
        );
        assert_eq!(store.usage().await.unwrap().count, 8);
    }

    #[tokio::test]
    async fn test_consume_roast_unlimited_still_counts() {
        let (store, storage, _) = store();
        storage
            .set(vec![(
                keys::USAGE_STATS.to_string(),
                serde_json::json!({"date": "2026-10-19", "count": 12}),
            )])
            .await
            .unwrap();

        assert_eq!(
            store.consume_roast(8, true).await.unwrap(),
            RoastAllowance::Permitted { count: 13 }
        );
    }

    #[tokio::test]
    async fn test_merge_user_upgrades_pro() {
        let (store, _, _) = store();
        store.save(&session(false)).await.unwrap();

        let user = store.merge_user(&UserPatch::pro_status(true)).await.unwrap();
        assert!(user.is_pro);
        assert_eq!(user.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_merge_user_without_pro_field_keeps_pro() {
        let (store, _, _) = store();
        store.save(&session(true)).await.unwrap();

        let user = store
            .merge_user(&UserPatch {
                name: Some("X".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap();
        assert_eq!(user.name, "X");
        assert!(user.is_pro);
        assert_eq!(
            store.access_token().await.unwrap().as_deref(),
            Some("tok-1")
        );
    }

    #[tokio::test]
    async fn test_update_session_replaces_token_and_keeps_pro() {
        let (store, _, _) = store();
        store.save(&session(true)).await.unwrap();

        let user = store
            .update_session(
                "tok-2",
                &UserPatch {
                    picture: Some("https://pic".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(user.is_pro);
        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.session.unwrap().access_token, "tok-2");
    }

    #[tokio::test]
    async fn test_clear_session_keeps_usage() {
        let (store, _, _) = store();
        store.save(&session(false)).await.unwrap();
        for _ in 0..5 {
            store.bump_usage().await.unwrap();
        }

        store.clear_session().await.unwrap();

        let snapshot = store.load().await.unwrap();
        assert!(snapshot.session.is_none());
        assert!(store.access_token().await.unwrap().is_none());
        assert_eq!(
            snapshot.usage,
            UsageStats {
                date: "2026-10-19".to_string(),
                count: 5
            }
        );
    }

    #[tokio::test]
    async fn test_stash_overwrites_and_take_claims() {
        let (store, _, _) = store();
        let first = ProfileRecord::new("https://www.linkedin.com/in/first");
        let second = ProfileRecord::new("https://www.linkedin.com/in/second");

        store.stash_last_profile(&first, &first.url).await.unwrap();
        store.stash_last_profile(&second, &second.url).await.unwrap();

        let peeked = store.last_profile().await.unwrap().unwrap();
        assert_eq!(peeked.url, "https://www.linkedin.com/in/second");

        let taken = store.take_last_profile().await.unwrap().unwrap();
        assert_eq!(taken.data, second);
        assert!(store.take_last_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_user_reads_as_absent() {
        let (store, storage, _) = store();
        storage
            .set(vec![
                (keys::ACCESS_TOKEN.to_string(), serde_json::json!("tok")),
                (keys::USER.to_string(), serde_json::json!(17)),
            ])
            .await
            .unwrap();

        assert!(store.load().await.unwrap().session.is_none());
    }
}
