//! Escalation controller
//!
//! Owns one alert's run: place a notification, poll for an answer
//! within the contact's wait budget, apply the policy, advance or stop.
//! Exactly one outcome is written per run, at termination.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::Result;

use super::notifier::Notifier;
use super::policy::{decide, Decision};
use super::poller::StatusPoller;
use super::store::OutcomeStore;
use super::types::{Alert, AttemptRef, AttemptStatus, Contact, FailureReason, Outcome};

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Sub-interval between status samples inside a contact's wait budget
    pub poll_interval: Duration,
    /// Upper bound on any single notifier/poller call
    pub collaborator_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            collaborator_timeout: Duration::from_secs(10),
        }
    }
}

/// How a contact's wait window ended
enum WaitVerdict {
    Status(AttemptStatus),
    Cancelled,
}

/// Drives cascade runs against a fixed contact roster
///
/// The engine holds no per-run state; each [`run`](Self::run) call is an
/// independent unit of work, safe to execute concurrently with others.
/// Runs share nothing but the outcome store.
pub struct EscalationEngine {
    contacts: Vec<Contact>,
    notifier: Arc<dyn Notifier>,
    poller: Arc<dyn StatusPoller>,
    store: Arc<OutcomeStore>,
    settings: EngineSettings,
}

impl EscalationEngine {
    pub fn new(
        contacts: Vec<Contact>,
        notifier: Arc<dyn Notifier>,
        poller: Arc<dyn StatusPoller>,
        store: Arc<OutcomeStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            contacts,
            notifier,
            poller,
            store,
            settings,
        }
    }

    /// The configured roster, in priority order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Execute one cascade run to completion and record its outcome
    ///
    /// Never panics and never propagates collaborator failures; whatever
    /// happens, exactly one terminal outcome lands in the store.
    pub async fn run(&self, alert: Alert, token: CancellationToken) -> Outcome {
        info!(
            "Starting cascade for alert {} ({} contacts)",
            alert.alert_id,
            self.contacts.len()
        );

        let outcome = self.drive(&alert, &token).await;
        self.store.record(&alert.alert_id, outcome.clone());

        match &outcome {
            Outcome::Answered {
                answered_by,
                attempt_index,
                ..
            } => info!(
                "Cascade for alert {} answered by {} (attempt {})",
                alert.alert_id, answered_by, attempt_index
            ),
            Outcome::Failed {
                attempts_tried,
                reason,
                ..
            } => warn!(
                "Cascade for alert {} ended without answer after {} attempt(s): {:?}",
                alert.alert_id, attempts_tried, reason
            ),
        }
        outcome
    }

    /// Walk the roster until a contact answers or it runs out
    async fn drive(&self, alert: &Alert, token: &CancellationToken) -> Outcome {
        if self.contacts.is_empty() {
            warn!(
                "Alert {} has no contacts configured, nothing to escalate",
                alert.alert_id
            );
            return Outcome::failed(0, FailureReason::NoContacts);
        }

        let total = self.contacts.len();
        let mut attempts_placed = 0;

        for (idx, contact) in self.contacts.iter().enumerate() {
            let attempt_index = idx + 1;
            if token.is_cancelled() {
                return Outcome::failed(attempts_placed, FailureReason::Cancelled);
            }

            info!(
                "Alert {}: attempt {}/{} notifying {} ({})",
                alert.alert_id, attempt_index, total, contact.name, contact.address
            );
            attempts_placed += 1;

            // Placement failure advances immediately, consuming no wait
            let attempt_ref = match self.place_bounded(contact, alert).await {
                Ok(attempt_ref) => attempt_ref,
                Err(e) => {
                    warn!(
                        "Alert {}: could not notify {}, advancing: {}",
                        alert.alert_id, contact.name, e
                    );
                    continue;
                },
            };

            let budget = Duration::from_secs(contact.wait_seconds);
            let status = match self.await_answer(&attempt_ref, budget, token).await {
                WaitVerdict::Status(status) => status,
                WaitVerdict::Cancelled => {
                    return Outcome::failed(attempts_placed, FailureReason::Cancelled)
                },
            };

            match decide(status) {
                Decision::StopSuccess => {
                    return Outcome::answered(contact, attempt_index, &attempt_ref);
                },
                Decision::Advance => {
                    info!(
                        "Alert {}: no confirmed answer from {}, advancing",
                        alert.alert_id, contact.name
                    );
                },
            }
        }

        Outcome::failed(total, FailureReason::Exhausted)
    }

    /// Poll for an answer within the wait budget
    ///
    /// Samples the attempt status every `poll_interval` (the last sample
    /// lands on the budget boundary), stopping early on an answer or a
    /// definitive negative. A budget that ends with only Unknown samples
    /// yields Unknown, which the policy turns into an advance.
    async fn await_answer(
        &self,
        attempt_ref: &AttemptRef,
        budget: Duration,
        token: &CancellationToken,
    ) -> WaitVerdict {
        let deadline = tokio::time::Instant::now() + budget;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let step = remaining.min(self.settings.poll_interval);
            if !step.is_zero() {
                tokio::select! {
                    () = token.cancelled() => return WaitVerdict::Cancelled,
                    () = tokio::time::sleep(step) => {},
                }
            }

            match self.check_bounded(attempt_ref).await {
                AttemptStatus::Answered => return WaitVerdict::Status(AttemptStatus::Answered),
                AttemptStatus::NotAnswered => {
                    // Terminal negative, the remaining budget cannot change it
                    return WaitVerdict::Status(AttemptStatus::NotAnswered);
                },
                AttemptStatus::Unknown => {},
            }

            if tokio::time::Instant::now() >= deadline {
                return WaitVerdict::Status(AttemptStatus::Unknown);
            }
        }
    }

    /// Notifier call under the collaborator timeout
    async fn place_bounded(&self, contact: &Contact, alert: &Alert) -> Result<AttemptRef> {
        match tokio::time::timeout(
            self.settings.collaborator_timeout,
            self.notifier.place(&contact.address, &alert.context),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(crate::error::EscSrvError::placement(format!(
                "Notifier timed out after {:?} for {}",
                self.settings.collaborator_timeout, contact.address
            ))),
        }
    }

    /// Poller call under the collaborator timeout; failures degrade to Unknown
    async fn check_bounded(&self, attempt_ref: &AttemptRef) -> AttemptStatus {
        match tokio::time::timeout(
            self.settings.collaborator_timeout,
            self.poller.check(attempt_ref),
        )
        .await
        {
            Ok(Ok(report)) => report.status,
            Ok(Err(e)) => {
                warn!(
                    "Status check for attempt {} failed, treating as unknown: {}",
                    attempt_ref, e
                );
                AttemptStatus::Unknown
            },
            Err(_) => {
                warn!(
                    "Status check for attempt {} timed out after {:?}",
                    attempt_ref, self.settings.collaborator_timeout
                );
                AttemptStatus::Unknown
            },
        }
    }
}
