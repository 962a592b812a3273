pub mod config;
pub mod error;
pub mod generation;
pub mod host;
pub mod message;
pub mod profile;
pub mod session;
mod wire;

// Re-export common error type
pub use error::{Result, RoasterError};
