//! Core data model for cascade escalation runs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One person on the escalation roster
///
/// Priority is implicit: position in the configured list. The order is
/// stable for the lifetime of a run.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Contact {
    /// Display name, used in logs and outcomes
    pub name: String,
    /// Opaque destination the notifier understands (e.g. a phone number)
    pub address: String,
    /// Seconds this contact gets to respond before the cascade advances
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u64,
}

fn default_wait_seconds() -> u64 {
    60
}

/// An inbound alert handed to the engine
///
/// The context bag is passed through to the notifier untouched; the
/// engine never interprets its keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Alert {
    /// Unique per run; a duplicate id is rejected before any attempt
    pub alert_id: String,
    /// Opaque string map (e.g. dag_id, task_id, state)
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl Alert {
    pub fn new(alert_id: impl Into<String>, context: HashMap<String, String>) -> Self {
        Self {
            alert_id: alert_id.into(),
            context,
        }
    }
}

/// Opaque identifier for one placed notification
///
/// Returned by the notifier, consumed by the status poller. The engine
/// only carries it around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct AttemptRef(pub String);

impl std::fmt::Display for AttemptRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of checking one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Positive evidence the contact acknowledged (connected, non-zero duration)
    Answered,
    /// Definitive terminal negative (busy, rejected, no-response, canceled)
    NotAnswered,
    /// In progress, or the status could not be determined
    Unknown,
}

/// Why a run ended without an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Every contact was tried, nobody confirmed
    Exhausted,
    /// The roster was empty, no attempt was possible
    NoContacts,
    /// An operator aborted the run
    Cancelled,
}

/// The single terminal record written per alert run
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// A contact confirmed the alert
    Answered {
        /// Display name of the contact who answered
        answered_by: String,
        /// Destination that was notified
        address: String,
        /// 1-based position in the roster
        attempt_index: usize,
        /// Provider reference of the answering attempt
        attempt_ref: String,
        timestamp: DateTime<Utc>,
    },
    /// Nobody confirmed
    Failed {
        attempts_tried: usize,
        reason: FailureReason,
        timestamp: DateTime<Utc>,
    },
}

impl Outcome {
    pub fn answered(contact: &Contact, attempt_index: usize, attempt_ref: &AttemptRef) -> Self {
        Outcome::Answered {
            answered_by: contact.name.clone(),
            address: contact.address.clone(),
            attempt_index,
            attempt_ref: attempt_ref.0.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(attempts_tried: usize, reason: FailureReason) -> Self {
        Outcome::Failed {
            attempts_tried,
            reason,
            timestamp: Utc::now(),
        }
    }

    /// True when a contact confirmed the alert
    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered { .. })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn contact(name: &str) -> Contact {
        Contact {
            name: name.to_string(),
            address: "+15550001111".to_string(),
            wait_seconds: 60,
        }
    }

    #[test]
    fn test_contact_default_wait() {
        let c: Contact = serde_yaml::from_str("name: Ops\naddress: '+15551234567'").unwrap();
        assert_eq!(c.wait_seconds, 60);
    }

    #[test]
    fn test_outcome_answered_carries_contact() {
        let outcome = Outcome::answered(&contact("Primary"), 2, &AttemptRef("CA123".into()));
        assert!(outcome.is_answered());
        match outcome {
            Outcome::Answered {
                answered_by,
                attempt_index,
                attempt_ref,
                ..
            } => {
                assert_eq!(answered_by, "Primary");
                assert_eq!(attempt_index, 2);
                assert_eq!(attempt_ref, "CA123");
            },
            Outcome::Failed { .. } => panic!("expected answered outcome"),
        }
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = Outcome::failed(3, FailureReason::Exhausted);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["attempts_tried"], 3);
        assert_eq!(json["reason"], "exhausted");

        let outcome = Outcome::answered(&contact("A"), 1, &AttemptRef("CAabc".into()));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "answered");
        assert_eq!(json["attempt_index"], 1);
    }

    #[test]
    fn test_alert_context_roundtrip() {
        let json = r#"{"alert_id":"d_t_1","context":{"dag_id":"d","task_id":"t"}}"#;
        let alert: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.context.get("dag_id").map(String::as_str), Some("d"));
    }
}
