//! Status poller capability
//!
//! Single-shot status checks for a placed attempt. The engine calls
//! this repeatedly inside the wait budget; each call is one sample.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{EscSrvError, Result};

use super::types::{AttemptRef, AttemptStatus};

/// One status sample for an attempt, with provider diagnostics
#[derive(Debug, Clone)]
pub struct PollReport {
    pub status: AttemptStatus,
    /// Raw provider status text, for logs
    pub provider_status: Option<String>,
    /// Connected duration in seconds, when the provider reports one
    pub duration_seconds: Option<u64>,
}

impl PollReport {
    pub fn unknown() -> Self {
        Self {
            status: AttemptStatus::Unknown,
            provider_status: None,
            duration_seconds: None,
        }
    }
}

/// Queries the delivery/acknowledgment state of one attempt
///
/// A failed check is an error here; the controller maps it to
/// `Unknown` so the cascade fails open toward escalation.
#[async_trait]
pub trait StatusPoller: Send + Sync {
    async fn check(&self, attempt: &AttemptRef) -> Result<PollReport>;
}

/// Provider call resource payload (the fields this service reads)
#[derive(Debug, Deserialize)]
struct CallResource {
    #[serde(default)]
    status: String,
    #[serde(default)]
    duration: Option<String>,
}

/// Map a provider call status to an attempt status
///
/// Answered requires positive evidence: a connected state with non-zero
/// duration. Terminal negatives map to NotAnswered; everything else is
/// still in flight and stays Unknown.
pub fn map_provider_status(status: &str, duration_seconds: u64) -> AttemptStatus {
    match status {
        "completed" | "in-progress" if duration_seconds > 0 => AttemptStatus::Answered,
        "busy" | "failed" | "no-answer" | "canceled" => AttemptStatus::NotAnswered,
        _ => AttemptStatus::Unknown,
    }
}

/// Status poller backed by the provider's per-call REST resource
pub struct HttpStatusPoller {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpStatusPoller {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| EscSrvError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl StatusPoller for HttpStatusPoller {
    async fn check(&self, attempt: &AttemptRef) -> Result<PollReport> {
        let url = format!(
            "{}/Accounts/{}/Calls/{}.json",
            self.config.base_url, self.config.account_sid, attempt
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .map_err(|e| EscSrvError::poll(format!("Status check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(EscSrvError::poll(format!(
                "Provider returned {} for attempt {}",
                response.status(),
                attempt
            )));
        }

        let call: CallResource = response
            .json()
            .await
            .map_err(|e| EscSrvError::poll(format!("Invalid status payload: {}", e)))?;

        let duration = call
            .duration
            .as_deref()
            .and_then(|d| d.parse::<u64>().ok())
            .unwrap_or(0);
        let status = map_provider_status(&call.status, duration);

        debug!(
            "Attempt {} status: {} (duration {}s) -> {:?}",
            attempt, call.status, duration, status
        );

        Ok(PollReport {
            status,
            provider_status: Some(call.status),
            duration_seconds: Some(duration),
        })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_answered_requires_nonzero_duration() {
        assert_eq!(map_provider_status("completed", 12), AttemptStatus::Answered);
        assert_eq!(map_provider_status("in-progress", 3), AttemptStatus::Answered);
        // Connected state with zero duration is not positive evidence
        assert_eq!(map_provider_status("completed", 0), AttemptStatus::Unknown);
    }

    #[test]
    fn test_terminal_negatives_map_to_not_answered() {
        for status in ["busy", "failed", "no-answer", "canceled"] {
            assert_eq!(map_provider_status(status, 0), AttemptStatus::NotAnswered);
        }
    }

    #[test]
    fn test_in_flight_states_stay_unknown() {
        for status in ["queued", "ringing", "initiated", ""] {
            assert_eq!(map_provider_status(status, 0), AttemptStatus::Unknown);
        }
    }

    #[test]
    fn test_call_resource_parses_string_duration() {
        let body = r#"{"sid":"CA1","status":"completed","duration":"42"}"#;
        let call: CallResource = serde_json::from_str(body).unwrap();
        assert_eq!(call.status, "completed");
        assert_eq!(call.duration.as_deref(), Some("42"));
    }
}
