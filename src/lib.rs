//! Scaffold - Tutoring decision core
//!
//! Scaffold holds the decision logic of a math tutor: whether a student's
//! answer is equivalent to the expected one, which pedagogical mode the next
//! tutor turn takes, what kind of problem is being solved, and how much of a
//! skill the student has mastered. It renders nothing, persists nothing and
//! makes no network calls; the surrounding application passes state in and
//! stores what comes back.

pub mod classify;
pub mod config;
pub mod core;
pub mod error;
pub mod escalation;
pub mod math;
pub mod progress;

pub use classify::{
    classify_grade, classify_problem, classify_type, guidance, GradeBand, ProblemProfile,
    ProblemType,
};
pub use config::Config;
pub use core::{
    Answer, SessionCounters, TurnController, TurnMode, TurnRecord, TurnState, ValidationOutcome,
    Validator, VerdictSource,
};
pub use error::{FailOpen, Result, ScaffoldError};
pub use escalation::{EquivalenceVerifier, FnVerifier, TimeoutVerifier, VerificationRequest};
pub use math::{check, normalize, Confidence, EquivalenceChecker, EquivalenceResult};
pub use progress::{
    compute_mastery, Evidence, MasteryLevel, MasteryScorer, ProgressReport, Rubric, SkillMastery,
};
