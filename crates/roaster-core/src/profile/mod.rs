//! Profile domain module.
//!
//! # Module Structure
//!
//! - `model`: The extracted profile record and its parts
//! - `page`: Profile-page URL classification

mod model;
mod page;

pub use model::{Education, Experience, ProfileRecord};
pub use page::{PROFILE_URL_PATTERN, TabPageState, is_profile_page, profile_handle};
