//! Extraction with a single inject-and-retry step.
//!
//! ```text
//! NotAttempted --ok--------------------------> Succeeded | Failed(NoData)
//!      |  no receiver
//!      v
//!  Injecting --inject failed-----------------> Failed(CouldNotConnect)
//!      |  injected, grace period
//!      v
//!  Retrying --ok-----------------------------> Succeeded | Failed(NoData)
//!           --any error----------------------> Failed(UnreachableAfterInjection)
//! ```

use std::time::Duration;

use roaster_core::host::{HostError, TabHost, TabId};
use roaster_core::message::{ExtractionFailure, ExtractionReply, Message};
use roaster_core::profile::ProfileRecord;
use serde_json::Value;

#[derive(Debug)]
enum ExtractionAttempt {
    NotAttempted,
    Injecting,
    Retrying,
    Succeeded(ProfileRecord),
    Failed(ExtractionFailure),
}

/// Drives one extraction against `tab_id` to a terminal state.
///
/// The extractor is asked at most twice and injected at most once.
pub(crate) async fn extract_from_tab(
    tabs: &dyn TabHost,
    tab_id: TabId,
    grace: Duration,
) -> Result<ProfileRecord, ExtractionFailure> {
    let mut attempt = ExtractionAttempt::NotAttempted;

    loop {
        attempt = match attempt {
            ExtractionAttempt::NotAttempted => match ask_extractor(tabs, tab_id).await {
                Ok(reply) => settle(reply),
                Err(err) if err.is_no_receiver() => {
                    tracing::info!(
                        "[Router] Extractor not found in tab {}, attempting to inject",
                        tab_id
                    );
                    ExtractionAttempt::Injecting
                }
                Err(err) => {
                    tracing::warn!("[Router] Extraction request to tab {} failed: {}", tab_id, err);
                    ExtractionAttempt::Failed(ExtractionFailure::CouldNotConnect)
                }
            },
            ExtractionAttempt::Injecting => match tabs.inject_extractor(tab_id).await {
                Ok(()) => {
                    tokio::time::sleep(grace).await;
                    ExtractionAttempt::Retrying
                }
                Err(err) => {
                    tracing::error!("[Router] Injection failed: {}", err);
                    ExtractionAttempt::Failed(ExtractionFailure::CouldNotConnect)
                }
            },
            ExtractionAttempt::Retrying => match ask_extractor(tabs, tab_id).await {
                Ok(reply) => settle(reply),
                Err(err) => {
                    tracing::warn!("[Router] Retry after injection failed: {}", err);
                    ExtractionAttempt::Failed(ExtractionFailure::UnreachableAfterInjection)
                }
            },
            ExtractionAttempt::Succeeded(record) => return Ok(record),
            ExtractionAttempt::Failed(failure) => return Err(failure),
        };
    }
}

async fn ask_extractor(tabs: &dyn TabHost, tab_id: TabId) -> Result<Value, HostError> {
    tabs.send_to_tab(tab_id, Message::ExtractProfile).await
}

fn settle(reply: Value) -> ExtractionAttempt {
    match serde_json::from_value::<ExtractionReply>(reply) {
        Ok(ExtractionReply {
            data: Some(record), ..
        }) => ExtractionAttempt::Succeeded(record),
        Ok(_) => ExtractionAttempt::Failed(ExtractionFailure::NoData),
        Err(err) => {
            tracing::warn!("[Router] Unreadable extractor reply: {}", err);
            ExtractionAttempt::Failed(ExtractionFailure::NoData)
        }
    }
}
