//! Shared application state for escsrv

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::engine::{
    Alert, EngineSettings, EscalationEngine, Notifier, OutcomeStore, StatusPoller,
};
use crate::error::{EscSrvError, Result};

/// State shared by every request handler
///
/// Runs are fire-and-forget: `start_run` spawns the cascade and returns
/// immediately; callers observe progress through the history endpoints.
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<OutcomeStore>,
    pub engine: Arc<EscalationEngine>,
    /// alert_id -> cancellation token, present while the run is in flight
    active_runs: Arc<DashMap<String, CancellationToken>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>, poller: Arc<dyn StatusPoller>) -> Self {
        let store = Arc::new(OutcomeStore::new());
        let settings = EngineSettings {
            poll_interval: std::time::Duration::from_secs(
                config.escalation.poll_interval_seconds,
            ),
            collaborator_timeout: std::time::Duration::from_secs(
                config.escalation.collaborator_timeout_seconds,
            ),
        };
        let engine = Arc::new(EscalationEngine::new(
            config.escalation.contacts.clone(),
            notifier,
            poller,
            Arc::clone(&store),
            settings,
        ));
        Self {
            config: Arc::new(config),
            store,
            engine,
            active_runs: Arc::new(DashMap::new()),
            started_at: Utc::now(),
        }
    }

    /// Build a unique alert id from the alert's identifying labels
    ///
    /// The uuid suffix keeps ids distinct even when the same failure fires
    /// twice within a second.
    pub fn make_alert_id(dag_id: &str, task_id: &str) -> String {
        format!("{}_{}_{}", dag_id, task_id, Uuid::new_v4().simple())
    }

    /// Number of cascade runs currently in flight
    pub fn active_run_count(&self) -> usize {
        self.active_runs.len()
    }

    /// Spawn a cascade run for the alert
    ///
    /// Rejects the alert if its id already has a recorded outcome or an
    /// in-flight run. The spawned task owns the run end to end and removes
    /// itself from the registry when it terminates.
    pub fn start_run(&self, alert: Alert) -> Result<()> {
        if self.store.contains(&alert.alert_id) {
            return Err(EscSrvError::DuplicateAlert(alert.alert_id));
        }
        let token = CancellationToken::new();
        if self
            .active_runs
            .insert(alert.alert_id.clone(), token.clone())
            .is_some()
        {
            // Lost the race against a concurrent start for the same id
            return Err(EscSrvError::DuplicateAlert(alert.alert_id));
        }

        let engine = Arc::clone(&self.engine);
        let registry = Arc::clone(&self.active_runs);
        let alert_id = alert.alert_id.clone();
        tokio::spawn(async move {
            engine.run(alert, token).await;
            registry.remove(&alert_id);
            debug!("Run {} removed from the active registry", alert_id);
        });
        Ok(())
    }

    /// Cancel one in-flight run; true if a run was found
    pub fn cancel_run(&self, alert_id: &str) -> bool {
        match self.active_runs.get(alert_id) {
            Some(entry) => {
                info!("Cancelling run for alert {}", alert_id);
                entry.cancel();
                true
            },
            None => false,
        }
    }

    /// Cancel every in-flight run, used on shutdown
    pub fn cancel_all(&self) {
        let count = self.active_runs.len();
        if count > 0 {
            info!("Cancelling {} in-flight run(s)", count);
        }
        for entry in self.active_runs.iter() {
            entry.value().cancel();
        }
    }
}

/// Build the alert context bag passed through to the notifier
pub fn alert_context(dag_id: &str, task_id: &str, state: &str) -> HashMap<String, String> {
    HashMap::from([
        ("dag_id".to_string(), dag_id.to_string()),
        ("task_id".to_string(), task_id.to_string()),
        ("state".to_string(), state.to_string()),
    ])
}
