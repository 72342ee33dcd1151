//! Escalation to an external equivalence verifier.
//!
//! This module provides the trait interface the validator calls when the
//! local checker is not confident, plus wrappers around caller-supplied
//! verifiers:
//! - **FnVerifier**: adapts a closure
//! - **TimeoutVerifier**: enforces the request timeout on a worker thread

pub mod timeout;
pub mod traits;

pub use timeout::TimeoutVerifier;
pub use traits::{EquivalenceVerifier, FnVerifier, VerificationRequest};
