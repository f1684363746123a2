//! Escalation policy
//!
//! Pure decision logic over a single attempt's status. The controller
//! owns the roster position, so converting a final Advance into the
//! exhausted outcome happens there, not here.

use super::types::AttemptStatus;

/// What the cascade does after checking an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A contact confirmed; the run terminates successfully
    StopSuccess,
    /// No confirmed answer; move to the next contact
    Advance,
}

/// Decide the cascade's next step from an attempt status
///
/// `Unknown` is treated the same as `NotAnswered`: the run does not
/// re-poll or extend the wait, it simply moves on. Fail-open toward
/// escalation, never toward silently stopping.
pub fn decide(status: AttemptStatus) -> Decision {
    match status {
        AttemptStatus::Answered => Decision::StopSuccess,
        AttemptStatus::NotAnswered | AttemptStatus::Unknown => Decision::Advance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answered_stops_the_cascade() {
        assert_eq!(decide(AttemptStatus::Answered), Decision::StopSuccess);
    }

    #[test]
    fn test_no_answer_advances() {
        assert_eq!(decide(AttemptStatus::NotAnswered), Decision::Advance);
    }

    #[test]
    fn test_unknown_is_not_retried() {
        // Unknown advances rather than waiting longer
        assert_eq!(decide(AttemptStatus::Unknown), Decision::Advance);
    }
}
