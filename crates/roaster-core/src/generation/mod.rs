//! Remote generation domain module.
//!
//! # Module Structure
//!
//! - `model`: Roast and polish payloads
//! - `service`: Generation and identity user-info service traits

mod model;
mod service;

pub use model::{PolishRequest, PolishResult, PolishedExperience, RoastRequest, RoastResult};
pub use service::{GenerationService, UserInfoService};
