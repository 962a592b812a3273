//! Session and usage domain models.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in user as persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub is_pro: bool,
}

impl User {
    /// Name shown in the panel header: name, else the email local part, else "User".
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local,
            _ => "User",
        }
    }

    /// Applies `patch` field by field. `is_pro` only changes when the patch names it.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(id) = &patch.id {
            self.id = id.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(picture) = &patch.picture {
            self.picture = picture.clone();
        }
        if let Some(is_pro) = patch.is_pro {
            self.is_pro = is_pro;
        }
    }
}

/// Partial user update. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pro: Option<bool>,
}

impl UserPatch {
    pub fn pro_status(is_pro: bool) -> Self {
        Self {
            is_pro: Some(is_pro),
            ..Self::default()
        }
    }
}

/// Identity-provider profile of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

impl From<UserInfo> for UserPatch {
    fn from(info: UserInfo) -> Self {
        Self {
            id: Some(info.id),
            email: Some(info.email),
            name: Some(info.name),
            picture: Some(info.picture),
            is_pro: None,
        }
    }
}

/// An authenticated session: opaque token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Daily roast counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Calendar day in `YYYY-MM-DD` form.
    pub date: String,
    pub count: u32,
}

impl UsageStats {
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            date: format_day(today),
            count: 0,
        }
    }

    /// Returns the stats as they apply to `today`: unchanged on the same day,
    /// reset to zero once the day has rolled over.
    pub fn for_day(&self, today: NaiveDate) -> Self {
        if self.date == format_day(today) {
            self.clone()
        } else {
            Self::fresh(today)
        }
    }

    /// Roasts left before `limit` is reached, never negative.
    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.count)
    }
}

/// Formats a calendar day the way usage stats persist it.
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Source of "today" for usage rollover.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
