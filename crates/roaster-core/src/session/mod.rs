//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session, user and daily usage models
//! - `repository`: Key/value storage trait and the persisted key names
//! - `store`: Merge/reset rules over the storage repository

mod model;
mod repository;
mod store;

pub use model::{
    Clock, Session, SystemClock, UsageStats, User, UserInfo, UserPatch, format_day,
};
pub use repository::{StorageRepository, keys};
pub use store::{RoastAllowance, SessionSnapshot, SessionStore, StashedProfile};
