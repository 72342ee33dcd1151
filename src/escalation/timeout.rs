//! Timeout wrapper for verifiers.
//!
//! Runs the wrapped verifier on a short-lived worker thread and waits at
//! most `request.timeout` for its verdict. A verdict that arrives later is
//! dropped together with the channel, so it can never be applied to a
//! validation that has already moved on. The worker itself is not
//! cancelled; it exits when the wrapped verifier returns.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

use crate::error::{Result, ScaffoldError};
use crate::escalation::traits::{EquivalenceVerifier, VerificationRequest};

/// A verifier wrapper that enforces the request timeout.
pub struct TimeoutVerifier {
    inner: Arc<dyn EquivalenceVerifier>,
}

impl TimeoutVerifier {
    /// Wrap a shared verifier.
    pub fn new(inner: Arc<dyn EquivalenceVerifier>) -> Self {
        Self { inner }
    }
}

impl EquivalenceVerifier for TimeoutVerifier {
    fn verify(&self, request: &VerificationRequest) -> Result<bool> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned = request.clone();

        thread::Builder::new()
            .name(format!("scaffold-verify-{}", self.inner.name()))
            .spawn(move || {
                // The receiver is gone when the caller already timed out.
                let _ = tx.send(inner.verify(&owned));
            })
            .map_err(|e| {
                ScaffoldError::escalation_unavailable(format!("cannot start verifier thread: {}", e))
            })?;

        match rx.recv_timeout(request.timeout) {
            Ok(verdict) => verdict,
            Err(RecvTimeoutError::Timeout) => Err(ScaffoldError::escalation_timeout(
                request.timeout.as_millis().min(u64::MAX as u128) as u64,
            )),
            Err(RecvTimeoutError::Disconnected) => Err(ScaffoldError::escalation(
                self.inner.name(),
                "verifier stopped without a verdict",
            )),
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

impl std::fmt::Debug for TimeoutVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutVerifier")
            .field("inner", &self.inner.name())
            .finish()
    }
}
