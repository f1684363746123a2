//! Notifier capability
//!
//! The engine places notifications through this seam; the production
//! implementation drives a Twilio-style voice REST API, while tests
//! substitute scripted doubles.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::{EscSrvError, Result};

use super::types::AttemptRef;

/// Places one outbound notification to an address
///
/// Implementations must not block beyond a short, bounded timeout; the
/// contact's wait window belongs to the engine, not the notifier.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Start a notification to `address`, passing the alert context through
    ///
    /// Returns an opaque attempt reference for later status checks, or a
    /// placement error (network failure, provider rejection). Placement
    /// errors are non-fatal to the cascade.
    async fn place(&self, address: &str, context: &HashMap<String, String>)
        -> Result<AttemptRef>;
}

/// Provider response for a created call
#[derive(Debug, Deserialize)]
struct CallCreated {
    sid: String,
    #[serde(default)]
    status: String,
}

/// Voice-call notifier backed by a Twilio-style REST API
///
/// Placement POSTs a call-creation request; the provider fetches the
/// spoken content from this service's own voice endpoint, so the alert
/// context travels as query parameters on that content URL.
pub struct HttpCallNotifier {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpCallNotifier {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| EscSrvError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Content URL the provider calls back for the spoken message
    fn content_url(&self, context: &HashMap<String, String>) -> Result<String> {
        let base = format!("{}/voice/alert", self.config.content_base_url);
        let url = reqwest::Url::parse_with_params(&base, context.iter())
            .map_err(|e| EscSrvError::config(format!("Invalid content URL {}: {}", base, e)))?;
        Ok(url.into())
    }
}

#[async_trait]
impl Notifier for HttpCallNotifier {
    async fn place(
        &self,
        address: &str,
        context: &HashMap<String, String>,
    ) -> Result<AttemptRef> {
        let url = format!(
            "{}/Accounts/{}/Calls.json",
            self.config.base_url, self.config.account_sid
        );
        let content_url = self.content_url(context)?;

        let params = [
            ("From", self.config.from_address.as_str()),
            ("To", address),
            ("Url", content_url.as_str()),
        ];

        debug!("Placing call to {} via {}", address, self.config.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| EscSrvError::placement(format!("Call placement failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EscSrvError::placement(format!(
                "Provider rejected call to {}: {} {}",
                address, status, body
            )));
        }

        let call: CallCreated = response
            .json()
            .await
            .map_err(|e| EscSrvError::placement(format!("Invalid provider response: {}", e)))?;

        info!(
            "Call initiated to {}: ref={} status={}",
            address, call.sid, call.status
        );
        Ok(AttemptRef(call.sid))
    }
}
