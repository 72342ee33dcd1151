//! Equivalence verifier trait for Scaffold.
//!
//! A verifier is the expensive, external equivalence check the validator
//! falls back to when the local checker is not confident. Scaffold never
//! implements one itself: the surrounding application supplies it (a model
//! call, a CAS service, a human grader queue).

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// Everything a verifier is given for one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// The student's answer, as submitted.
    pub student_answer: String,
    /// The expected answer.
    pub expected_answer: String,
    /// How long the caller is willing to wait.
    pub timeout: Duration,
}

impl VerificationRequest {
    /// Create a new request.
    pub fn new(
        student_answer: impl Into<String>,
        expected_answer: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            student_answer: student_answer.into(),
            expected_answer: expected_answer.into(),
            timeout,
        }
    }
}

/// Trait for external equivalence verifiers.
///
/// Verifiers are called at most once per validation and never retried.
/// Any error is treated as "no verdict": the validator logs it and keeps
/// its local verdict. All verifiers must be thread-safe.
///
/// Implementations must give up by `request.timeout`. The validator stops
/// waiting at that point but cannot cancel the call, so a verifier that
/// hangs keeps its worker thread alive until it returns.
pub trait EquivalenceVerifier: Send + Sync {
    /// Decide whether the two answers in the request are equivalent.
    fn verify(&self, request: &VerificationRequest) -> Result<bool>;

    /// Get the verifier name for logging.
    fn name(&self) -> &'static str;
}

/// Blanket implementation for boxed trait objects.
///
/// This allows `Box<dyn EquivalenceVerifier>` to be used wherever
/// `EquivalenceVerifier` is expected.
impl EquivalenceVerifier for Box<dyn EquivalenceVerifier> {
    fn verify(&self, request: &VerificationRequest) -> Result<bool> {
        (**self).verify(request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Shared verifiers delegate to the inner verifier.
impl<V: EquivalenceVerifier + ?Sized> EquivalenceVerifier for Arc<V> {
    fn verify(&self, request: &VerificationRequest) -> Result<bool> {
        (**self).verify(request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Adapter that turns a closure into a verifier.
pub struct FnVerifier<F> {
    name: &'static str,
    verify: F,
}

impl<F> FnVerifier<F>
where
    F: Fn(&VerificationRequest) -> Result<bool> + Send + Sync,
{
    /// Wrap a closure under the given name.
    pub fn new(name: &'static str, verify: F) -> Self {
        Self { name, verify }
    }
}

impl<F> EquivalenceVerifier for FnVerifier<F>
where
    F: Fn(&VerificationRequest) -> Result<bool> + Send + Sync,
{
    fn verify(&self, request: &VerificationRequest) -> Result<bool> {
        (self.verify)(request)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> std::fmt::Debug for FnVerifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnVerifier").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScaffoldError;

    fn request() -> VerificationRequest {
        VerificationRequest::new("sqrt(4)", "2", Duration::from_millis(100))
    }

    #[test]
    fn test_fn_verifier_delegates() {
        let verifier = FnVerifier::new("always-yes", |_: &VerificationRequest| Ok(true));
        assert!(verifier.verify(&request()).unwrap());
        assert_eq!(verifier.name(), "always-yes");
    }

    #[test]
    fn test_fn_verifier_sees_request() {
        let verifier = FnVerifier::new("echo", |req: &VerificationRequest| {
            Ok(req.student_answer == "sqrt(4)" && req.expected_answer == "2")
        });
        assert!(verifier.verify(&request()).unwrap());
    }

    #[test]
    fn test_boxed_verifier() {
        let boxed: Box<dyn EquivalenceVerifier> = Box::new(FnVerifier::new(
            "failing",
            |_: &VerificationRequest| Err(ScaffoldError::escalation_unavailable("offline")),
        ));
        assert!(boxed.verify(&request()).is_err());
        assert_eq!(boxed.name(), "failing");
    }

    #[test]
    fn test_shared_verifier() {
        let shared: Arc<dyn EquivalenceVerifier> =
            Arc::new(FnVerifier::new("shared", |_: &VerificationRequest| Ok(false)));
        let clone = Arc::clone(&shared);
        assert!(!clone.verify(&request()).unwrap());
        assert_eq!(clone.name(), "shared");
    }
}
