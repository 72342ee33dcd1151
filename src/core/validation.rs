//! Answer validation for Scaffold.
//!
//! Runs the local equivalence checker, escalates low-confidence verdicts to
//! the external verifier when one is configured, and folds the verdict into
//! the session counters.
//!
//! Counters go in by value and come back updated next to the outcome, so a
//! caller never sees a half-updated set and can only apply the verdict of the
//! call that counted the attempt.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, EscalationConfig};
use crate::core::state::{Answer, SessionCounters, ValidationOutcome, VerdictSource};
use crate::escalation::{EquivalenceVerifier, TimeoutVerifier, VerificationRequest};
use crate::math::{EquivalenceChecker, EquivalenceResult};

/// Validation orchestrator.
///
/// Cheap to build; holds no per-session state. Not re-entrant per session:
/// callers serialize validations against the same counters.
#[derive(Debug)]
pub struct Validator {
    checker: EquivalenceChecker,
    escalation: EscalationConfig,
    verifier: Option<TimeoutVerifier>,
}

impl Validator {
    /// Create a validator without an external verifier.
    pub fn new(config: &Config) -> Self {
        Self {
            checker: EquivalenceChecker::new(&config.equivalence),
            escalation: config.escalation.clone(),
            verifier: None,
        }
    }

    /// Attach the external verifier used for low-confidence verdicts.
    ///
    /// Calls are bounded by `escalation.timeout_ms`.
    pub fn with_verifier(mut self, verifier: Arc<dyn EquivalenceVerifier>) -> Self {
        self.verifier = Some(TimeoutVerifier::new(verifier));
        self
    }

    /// Check if low-confidence verdicts will be escalated.
    pub fn can_escalate(&self) -> bool {
        self.escalation.enabled && self.verifier.is_some()
    }

    /// Validate an answer and return the outcome with the updated counters.
    pub fn validate(
        &self,
        answer: &Answer,
        expected_answer: &str,
        counters: SessionCounters,
    ) -> (ValidationOutcome, SessionCounters) {
        let mut counters = counters;
        counters.answer_attempts = counters.answer_attempts.saturating_add(1);

        let student_answer = answer.comparable_text();
        let local = self.checker.check(student_answer, expected_answer);
        let (is_valid, source) = self.decide(student_answer, expected_answer, local);

        if is_valid {
            counters.consecutive_wrong = 0;
            counters.is_problem_solved = true;
        } else {
            counters.consecutive_wrong = counters.consecutive_wrong.saturating_add(1);
        }

        let outcome = ValidationOutcome {
            is_valid,
            answer: answer.clone(),
            source,
        };
        (outcome, counters)
    }

    /// Pick the deciding verdict: local, or escalated when the local one is
    /// not confident.
    fn decide(
        &self,
        student_answer: &str,
        expected_answer: &str,
        local: EquivalenceResult,
    ) -> (bool, VerdictSource) {
        let local_source = VerdictSource::Local {
            confidence: local.confidence,
        };

        if !local.needs_escalation() {
            return (local.is_equivalent, local_source);
        }

        let Some(verifier) = self.verifier.as_ref().filter(|_| self.escalation.enabled) else {
            tracing::debug!("low confidence verdict, escalation not available");
            return (local.is_equivalent, local_source);
        };

        let request = VerificationRequest::new(
            student_answer,
            expected_answer,
            Duration::from_millis(self.escalation.timeout_ms),
        );

        match verifier.verify(&request) {
            Ok(is_equivalent) => {
                tracing::debug!(verifier = verifier.name(), is_equivalent, "escalated verdict");
                (
                    is_equivalent,
                    VerdictSource::Escalated {
                        verifier: verifier.name().to_string(),
                    },
                )
            }
            Err(err) => {
                tracing::warn!(
                    "Escalation to '{}' failed: {} (keeping local verdict)",
                    verifier.name(),
                    err
                );
                (
                    local.is_equivalent,
                    VerdictSource::EscalationFailed {
                        verifier: verifier.name().to_string(),
                        reason: err.to_string(),
                    },
                )
            }
        }
    }
}
