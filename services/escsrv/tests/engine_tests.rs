//! Escalation engine integration tests
//!
//! Exercise full cascade runs against scripted notifier/poller doubles.
//! All timing tests run on tokio's paused clock.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use escsrv::engine::{
    Alert, AttemptRef, AttemptStatus, Contact, EngineSettings, EscalationEngine, FailureReason,
    Notifier, Outcome, OutcomeStore, PollReport, StatusPoller,
};
use escsrv::error::{EscSrvError, Result};

static LOGGER_INIT: std::sync::Once = std::sync::Once::new();

fn setup_logging() {
    LOGGER_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Records every placement; configured addresses fail to place
struct ScriptedNotifier {
    placed: Mutex<Vec<String>>,
    failing: Vec<String>,
    counter: AtomicUsize,
}

impl ScriptedNotifier {
    fn new() -> Self {
        Self {
            placed: Mutex::new(Vec::new()),
            failing: Vec::new(),
            counter: AtomicUsize::new(0),
        }
    }

    fn failing_for(addresses: &[&str]) -> Self {
        Self {
            failing: addresses.iter().map(|s| s.to_string()).collect(),
            ..Self::new()
        }
    }

    fn placements(&self) -> Vec<String> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn place(&self, address: &str, _context: &HashMap<String, String>) -> Result<AttemptRef> {
        if self.failing.contains(&address.to_string()) {
            return Err(EscSrvError::placement(format!("unreachable {}", address)));
        }
        self.placed.lock().unwrap().push(address.to_string());
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(AttemptRef(format!("CA-{}-{}", address, n)))
    }
}

/// Replays a per-attempt script of statuses, one per check
///
/// A script is keyed by the address embedded in the attempt ref. Once a
/// script is exhausted its last entry repeats; attempts with no script
/// report Unknown forever.
struct ScriptedPoller {
    scripts: Mutex<HashMap<String, Vec<AttemptStatus>>>,
    cursors: Mutex<HashMap<String, usize>>,
    checks: AtomicUsize,
}

impl ScriptedPoller {
    fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            cursors: Mutex::new(HashMap::new()),
            checks: AtomicUsize::new(0),
        }
    }

    fn script(self, address: &str, statuses: &[AttemptStatus]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(address.to_string(), statuses.to_vec());
        self
    }

    fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusPoller for ScriptedPoller {
    async fn check(&self, attempt: &AttemptRef) -> Result<PollReport> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let scripts = self.scripts.lock().unwrap();
        let entry = scripts.iter().find(|(addr, _)| attempt.0.contains(*addr));
        let Some((address, script)) = entry else {
            return Ok(PollReport::unknown());
        };
        let mut cursors = self.cursors.lock().unwrap();
        let cursor = cursors.entry(address.clone()).or_insert(0);
        let status = script
            .get(*cursor)
            .or_else(|| script.last())
            .copied()
            .unwrap_or(AttemptStatus::Unknown);
        *cursor += 1;
        Ok(PollReport {
            status,
            provider_status: None,
            duration_seconds: None,
        })
    }
}

/// Cancels the shared token the first time any attempt is checked
struct CancellingPoller {
    token: CancellationToken,
}

#[async_trait]
impl StatusPoller for CancellingPoller {
    async fn check(&self, _attempt: &AttemptRef) -> Result<PollReport> {
        self.token.cancel();
        Ok(PollReport::unknown())
    }
}

fn contact(name: &str, address: &str, wait_seconds: u64) -> Contact {
    Contact {
        name: name.to_string(),
        address: address.to_string(),
        wait_seconds,
    }
}

fn alert(id: &str) -> Alert {
    Alert::new(id, HashMap::from([("state".to_string(), "failed".to_string())]))
}

fn settings() -> EngineSettings {
    EngineSettings {
        poll_interval: Duration::from_secs(5),
        collaborator_timeout: Duration::from_secs(10),
    }
}

fn engine(
    contacts: Vec<Contact>,
    notifier: Arc<ScriptedNotifier>,
    poller: Arc<dyn StatusPoller>,
) -> (EscalationEngine, Arc<OutcomeStore>) {
    setup_logging();
    let store = Arc::new(OutcomeStore::new());
    let engine = EscalationEngine::new(contacts, notifier, poller, Arc::clone(&store), settings());
    (engine, store)
}

#[tokio::test(start_paused = true)]
async fn test_first_answer_stops_cascade() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(ScriptedPoller::new().script("+100", &[AttemptStatus::Answered]));
    let contacts = vec![
        contact("A", "+100", 60),
        contact("B", "+200", 60),
        contact("C", "+300", 60),
    ];
    let (engine, store) = engine(contacts, Arc::clone(&notifier), poller);

    let outcome = engine.run(alert("run1"), CancellationToken::new()).await;

    match outcome {
        Outcome::Answered {
            answered_by,
            attempt_index,
            ..
        } => {
            assert_eq!(answered_by, "A");
            assert_eq!(attempt_index, 1);
        },
        Outcome::Failed { .. } => panic!("expected answered outcome"),
    }
    // Nobody past the answering contact is disturbed
    assert_eq!(notifier.placements(), vec!["+100"]);
    assert!(store.get("run1").unwrap().is_answered());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_roster_fails_with_full_attempt_count() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(
        ScriptedPoller::new()
            .script("+100", &[AttemptStatus::NotAnswered])
            .script("+200", &[AttemptStatus::NotAnswered])
            .script("+300", &[AttemptStatus::NotAnswered]),
    );
    let contacts = vec![
        contact("A", "+100", 60),
        contact("B", "+200", 60),
        contact("C", "+300", 60),
    ];
    let (engine, store) = engine(contacts, Arc::clone(&notifier), poller);

    let outcome = engine.run(alert("run2"), CancellationToken::new()).await;

    match outcome {
        Outcome::Failed {
            attempts_tried,
            reason,
            ..
        } => {
            assert_eq!(attempts_tried, 3);
            assert_eq!(reason, FailureReason::Exhausted);
        },
        Outcome::Answered { .. } => panic!("expected failed outcome"),
    }
    assert_eq!(notifier.placements().len(), 3);
    assert!(!store.get("run2").unwrap().is_answered());
}

#[tokio::test(start_paused = true)]
async fn test_terminal_negative_advances_before_budget_ends() {
    // A definitive busy on the first sample must not burn the 60s budget
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(
        ScriptedPoller::new()
            .script("+100", &[AttemptStatus::NotAnswered])
            .script("+200", &[AttemptStatus::Answered]),
    );
    let contacts = vec![contact("A", "+100", 60), contact("B", "+200", 60)];
    let (engine, _store) = engine(contacts, Arc::clone(&notifier), poller);

    let started = tokio::time::Instant::now();
    let outcome = engine.run(alert("run3"), CancellationToken::new()).await;

    assert!(outcome.is_answered());
    // One poll interval per contact, not one wait budget
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_placement_failure_advances_without_waiting() {
    let notifier = Arc::new(ScriptedNotifier::failing_for(&["+100"]));
    let poller = Arc::new(ScriptedPoller::new().script("+200", &[AttemptStatus::Answered]));
    let contacts = vec![contact("A", "+100", 60), contact("B", "+200", 60)];
    let (engine, _store) = engine(contacts, Arc::clone(&notifier), poller);

    let started = tokio::time::Instant::now();
    let outcome = engine.run(alert("run4"), CancellationToken::new()).await;

    match outcome {
        Outcome::Answered {
            answered_by,
            attempt_index,
            ..
        } => {
            assert_eq!(answered_by, "B");
            assert_eq!(attempt_index, 2);
        },
        Outcome::Failed { .. } => panic!("expected answered outcome"),
    }
    // A's failed placement consumed none of its wait budget
    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(notifier.placements(), vec!["+200"]);
}

#[tokio::test(start_paused = true)]
async fn test_answer_on_later_poll_sample() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(ScriptedPoller::new().script(
        "+100",
        &[
            AttemptStatus::Unknown,
            AttemptStatus::Unknown,
            AttemptStatus::Answered,
        ],
    ));
    let contacts = vec![contact("A", "+100", 60)];
    let (engine, _store) = engine(contacts, Arc::clone(&notifier), Arc::clone(&poller) as _);

    let started = tokio::time::Instant::now();
    let outcome = engine.run(alert("run5"), CancellationToken::new()).await;

    assert!(outcome.is_answered());
    assert_eq!(poller.check_count(), 3);
    // Three samples at the 5s cadence
    assert!(started.elapsed() >= Duration::from_secs(15));
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_throughout_budget_exhausts_contact() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(ScriptedPoller::new());
    // 12s budget at a 5s cadence: samples at 5, 10 and the 12s boundary
    let contacts = vec![contact("A", "+100", 12)];
    let (engine, _store) = engine(contacts, Arc::clone(&notifier), Arc::clone(&poller) as _);

    let started = tokio::time::Instant::now();
    let outcome = engine.run(alert("run6"), CancellationToken::new()).await;

    match outcome {
        Outcome::Failed {
            attempts_tried,
            reason,
            ..
        } => {
            assert_eq!(attempts_tried, 1);
            assert_eq!(reason, FailureReason::Exhausted);
        },
        Outcome::Answered { .. } => panic!("expected failed outcome"),
    }
    assert_eq!(poller.check_count(), 3);
    assert!(started.elapsed() >= Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_zero_wait_contact_gets_one_immediate_check() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(ScriptedPoller::new().script("+100", &[AttemptStatus::Answered]));
    let contacts = vec![contact("A", "+100", 0)];
    let (engine, _store) = engine(contacts, Arc::clone(&notifier), Arc::clone(&poller) as _);

    let started = tokio::time::Instant::now();
    let outcome = engine.run(alert("run7"), CancellationToken::new()).await;

    assert!(outcome.is_answered());
    assert_eq!(poller.check_count(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_empty_roster_fails_immediately() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller: Arc<dyn StatusPoller> = Arc::new(ScriptedPoller::new());
    let (engine, store) = engine(Vec::new(), Arc::clone(&notifier), poller);

    let outcome = engine.run(alert("run8"), CancellationToken::new()).await;

    match outcome {
        Outcome::Failed {
            attempts_tried,
            reason,
            ..
        } => {
            assert_eq!(attempts_tried, 0);
            assert_eq!(reason, FailureReason::NoContacts);
        },
        Outcome::Answered { .. } => panic!("expected failed outcome"),
    }
    assert!(notifier.placements().is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_record_independent_outcomes() {
    setup_logging();
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller = Arc::new(ScriptedPoller::new().script("+100", &[AttemptStatus::Answered]));
    let contacts = vec![contact("A", "+100", 60)];
    let store = Arc::new(OutcomeStore::new());
    let engine = Arc::new(EscalationEngine::new(
        contacts,
        notifier,
        poller,
        Arc::clone(&store),
        settings(),
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .run(alert(&format!("burst{}", i)), CancellationToken::new())
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_answered());
    }

    assert_eq!(store.len(), 4);
    for i in 0..4 {
        assert!(store.get(&format!("burst{}", i)).unwrap().is_answered());
    }
}

#[tokio::test]
async fn test_pre_cancelled_token_stops_before_any_placement() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let poller: Arc<dyn StatusPoller> = Arc::new(ScriptedPoller::new());
    let contacts = vec![contact("A", "+100", 60)];
    let (engine, store) = engine(contacts, Arc::clone(&notifier), poller);

    let token = CancellationToken::new();
    token.cancel();
    let outcome = engine.run(alert("run9"), token).await;

    match outcome {
        Outcome::Failed {
            attempts_tried,
            reason,
            ..
        } => {
            assert_eq!(attempts_tried, 0);
            assert_eq!(reason, FailureReason::Cancelled);
        },
        Outcome::Answered { .. } => panic!("expected failed outcome"),
    }
    assert!(notifier.placements().is_empty());
    assert!(store.contains("run9"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_wait_ends_run() {
    let notifier = Arc::new(ScriptedNotifier::new());
    let token = CancellationToken::new();
    let poller: Arc<dyn StatusPoller> = Arc::new(CancellingPoller {
        token: token.clone(),
    });
    let contacts = vec![contact("A", "+100", 600), contact("B", "+200", 600)];
    let (engine, store) = engine(contacts, Arc::clone(&notifier), poller);

    let outcome = engine.run(alert("run10"), token).await;

    // The first check cancels; the cascade never reaches contact B
    match outcome {
        Outcome::Failed {
            attempts_tried,
            reason,
            ..
        } => {
            assert_eq!(attempts_tried, 1);
            assert_eq!(reason, FailureReason::Cancelled);
        },
        Outcome::Answered { .. } => panic!("expected failed outcome"),
    }
    assert_eq!(notifier.placements(), vec!["+100"]);
    assert!(store.contains("run10"));
}
