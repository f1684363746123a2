//! Outcome store
//!
//! Thread-safe mapping from alert id to the run's terminal record.
//! One writer per running alert, any number of concurrent readers.

use std::collections::HashMap;

use dashmap::DashMap;
use tracing::warn;

use super::types::Outcome;

/// In-memory alert outcome map
///
/// Contents live until process restart; the service does not persist
/// history.
#[derive(Debug, Default)]
pub struct OutcomeStore {
    outcomes: DashMap<String, Outcome>,
}

impl OutcomeStore {
    pub fn new() -> Self {
        Self {
            outcomes: DashMap::new(),
        }
    }

    /// Record the terminal outcome for an alert (upsert, last write wins)
    ///
    /// A controller writes exactly once per run, so an overwrite means a
    /// duplicate alert id slipped past the run registry.
    pub fn record(&self, alert_id: impl Into<String>, outcome: Outcome) {
        let alert_id = alert_id.into();
        if self.outcomes.insert(alert_id.clone(), outcome).is_some() {
            warn!("Outcome for alert {} overwritten", alert_id);
        }
    }

    /// Look up the outcome for one alert
    pub fn get(&self, alert_id: &str) -> Option<Outcome> {
        self.outcomes.get(alert_id).map(|entry| entry.value().clone())
    }

    /// True once an outcome has been recorded for this alert
    pub fn contains(&self, alert_id: &str) -> bool {
        self.outcomes.contains_key(alert_id)
    }

    /// Snapshot of the full history, keyed by alert id
    pub fn list_all(&self) -> HashMap<String, Outcome> {
        self.outcomes
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of recorded outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
