//! Application layer for the roaster.
//!
//! This crate coordinates the domain types in `roaster-core` across the
//! three execution contexts: the background router, the page extractor it
//! brokers for, and the panel controller.

pub mod panel;
pub mod router;

#[cfg(test)]
mod test_support;

pub use panel::{PanelController, PanelServices};
pub use router::{MessageRouter, RouterClient};
