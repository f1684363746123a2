//! Request and response DTOs for the escsrv API

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::engine::{Contact, Outcome};

/// Grafana alerting webhook payload
///
/// Only the fields escsrv consumes are modeled; unknown fields are
/// ignored on deserialization.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrafanaWebhook {
    #[serde(default)]
    pub alerts: Vec<GrafanaAlert>,
}

/// One alert entry inside a Grafana webhook
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrafanaAlert {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl GrafanaWebhook {
    /// Labels of the first alert, the one the cascade is raised for
    pub fn first_labels(&self) -> Option<&HashMap<String, String>> {
        self.alerts.first().map(|a| &a.labels)
    }
}

/// Acknowledgment returned when a cascade run is accepted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CascadeAck {
    /// Unique id assigned to this run
    pub alert_id: String,
    pub dag_id: String,
    pub task_id: String,
    pub state: String,
    /// Roster size the run will walk through
    pub contacts_to_call: usize,
    pub message: String,
}

/// Query parameters accepted by the voice content endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct VoiceQuery {
    pub dag_id: Option<String>,
    pub task_id: Option<String>,
    pub state: Option<String>,
}

impl VoiceQuery {
    pub fn into_context(self) -> HashMap<String, String> {
        let mut context = HashMap::new();
        if let Some(dag_id) = self.dag_id {
            context.insert("dag_id".to_string(), dag_id);
        }
        if let Some(task_id) = self.task_id {
            context.insert("task_id".to_string(), task_id);
        }
        if let Some(state) = self.state {
            context.insert("state".to_string(), state);
        }
        context
    }
}

/// One entry in the run history listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntry {
    pub alert_id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Full history response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub total: usize,
    pub outcomes: Vec<HistoryEntry>,
}

/// Configured roster as exposed over the API
///
/// Addresses are masked; this endpoint exists for operators to confirm
/// ordering and wait budgets, not to leak phone numbers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactView {
    pub position: usize,
    pub name: String,
    pub address: String,
    pub wait_seconds: u64,
}

impl ContactView {
    pub fn from_contact(position: usize, contact: &Contact) -> Self {
        Self {
            position,
            name: contact.name.clone(),
            address: mask_address(&contact.address),
            wait_seconds: contact.wait_seconds,
        }
    }
}

/// Masks all but the last four characters of a destination address
pub fn mask_address(address: &str) -> String {
    let visible = 4;
    let len = address.chars().count();
    if len <= visible {
        return address.to_string();
    }
    let tail: String = address.chars().skip(len - visible).collect();
    format!("{}{}", "*".repeat(len - visible), tail)
}

/// Response to a cancel request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CancelResponse {
    pub alert_id: String,
    pub cancelled: bool,
}

/// Current log filter level
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogLevelInfo {
    /// Active filter spec, e.g. `info` or `info,escsrv=debug`
    pub level: String,
}

/// Request to change the log filter level at runtime
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetLogLevelRequest {
    pub level: String,
}

/// Service status block for the health endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthInfo {
    pub service: String,
    pub status: common::ServiceStatus,
    pub uptime_seconds: i64,
    pub contacts_configured: usize,
    pub active_runs: usize,
    pub completed_runs: usize,
    pub timestamp: DateTime<Utc>,
}
