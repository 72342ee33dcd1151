//! Core session logic for Scaffold.
//!
//! This module contains the session-facing half of the tutoring core: the
//! state types the session stores, answer validation with optional
//! escalation, and the turn mode state machine with its stuck override.

pub mod state;
pub mod turns;
pub mod validation;

pub use state::{
    Answer, SessionCounters, TurnMode, TurnRecord, TurnState, ValidationOutcome, VerdictSource,
};
pub use turns::TurnController;
pub use validation::Validator;
