//! Unified error types for Scaffold with fail-open philosophy.
//!
//! Nothing in the tutoring core is allowed to break a tutoring turn. Decision
//! functions are total and degrade to conservative defaults; the few fallible
//! operations (config loading, escalation calls) return these errors so the
//! boundary can log a warning and carry on with a safe value.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Scaffold operations.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Answer or problem text that could not be parsed.
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// No escalation capability is reachable.
    #[error("escalation unavailable: {message}")]
    EscalationUnavailable { message: String },

    /// The escalation capability did not answer in time.
    #[error("escalation timed out after {timeout_ms}ms")]
    EscalationTimeout { timeout_ms: u64 },

    /// The escalation capability answered with an error.
    #[error("escalation error from {verifier}: {message}")]
    Escalation { verifier: String, message: String },

    /// Rubric values outside their documented range.
    #[error("invalid evidence: {message}")]
    InvalidEvidence { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// I/O errors while reading configuration files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },
}

/// A specialized Result type for Scaffold operations.
pub type Result<T> = std::result::Result<T, ScaffoldError>;

impl ScaffoldError {
    /// Create a malformed input error.
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Create an escalation unavailable error.
    pub fn escalation_unavailable(message: impl Into<String>) -> Self {
        Self::EscalationUnavailable {
            message: message.into(),
        }
    }

    /// Create an escalation timeout error.
    pub fn escalation_timeout(timeout_ms: u64) -> Self {
        Self::EscalationTimeout { timeout_ms }
    }

    /// Create an escalation error attributed to a verifier.
    pub fn escalation(verifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Escalation {
            verifier: verifier.into(),
            message: message.into(),
        }
    }

    /// Create an invalid evidence error.
    pub fn invalid_evidence(message: impl Into<String>) -> Self {
        Self::InvalidEvidence {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Whether this error came from the escalation path.
    ///
    /// Escalation failures are expected in production (the verifier is a
    /// remote model) and are reported at warning level only.
    pub fn is_escalation_failure(&self) -> bool {
        matches!(
            self,
            Self::EscalationUnavailable { .. }
                | Self::EscalationTimeout { .. }
                | Self::Escalation { .. }
        )
    }

    /// Check if this error should trigger fail-open behavior.
    ///
    /// Every Scaffold error is recoverable; the caller always has a
    /// conservative default to fall back to.
    pub fn is_fail_open(&self) -> bool {
        true
    }
}

impl From<io::Error> for ScaffoldError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ScaffoldError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error at warning level and return a safe default.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}
