//! Progress tracking for Scaffold.
//!
//! Mastery levels are derived from evidence on every read and never
//! incremented in place. The evidence itself is owned by the session store.

pub mod mastery;
pub mod report;

pub use mastery::{compute_mastery, Evidence, MasteryLevel, MasteryScorer, Rubric};
pub use report::{ProgressReport, SkillMastery};
