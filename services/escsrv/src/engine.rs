//! Escalation Engine
//!
//! Drives one cascade run per alert: contacts are tried strictly in
//! priority order, one outstanding attempt at a time, until a contact
//! answers or the roster is exhausted.
//!
//! ```text
//! Idle ──► Calling(i) ──► Waiting(i) ──► Checking(i) ──► Succeeded
//!             │   ▲                           │
//!             │   └──────── advance ──────────┤
//!             │                               ▼
//!             └── placement failure ──► Exhausted (i was last)
//! ```
//!
//! The engine knows nothing about phone calls. It depends on two
//! capabilities: a [`Notifier`] that places a notification and returns
//! an opaque attempt reference, and a [`StatusPoller`] that reports
//! whether that attempt was acknowledged. Collaborator failures never
//! escape a run; they degrade to "no confirmed answer" and the cascade
//! advances.

pub mod controller;
pub mod notifier;
pub mod policy;
pub mod poller;
pub mod store;
pub mod types;

pub use controller::{EngineSettings, EscalationEngine};
pub use notifier::{HttpCallNotifier, Notifier};
pub use policy::{decide, Decision};
pub use poller::{HttpStatusPoller, PollReport, StatusPoller};
pub use store::OutcomeStore;
pub use types::{Alert, AttemptRef, AttemptStatus, Contact, FailureReason, Outcome};
