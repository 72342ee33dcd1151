//! Mastery scoring for Scaffold.
//!
//! Folds the evidence recorded for one skill into a mastery level from 0
//! (not started) to 4 (mastered), by banding the rubric accuracy:
//!
//! | accuracy      | level |
//! |---------------|-------|
//! | `< 0.25`      | 0     |
//! | `[0.25, 0.5)` | 1     |
//! | `[0.5, 0.7)`  | 2     |
//! | `[0.7, 0.9)`  | 3     |
//! | `[0.9, 1.0]`  | 4     |
//!
//! Lower bounds are inclusive and levels never round up. Evidence without
//! any observed interaction scores 0 whatever the rubric says.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{MasteryConfig, DEFAULT_MASTERY_THRESHOLDS};
use crate::error::{FailOpen, Result, ScaffoldError};

/// Mastery level of one skill, `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    /// No observed mastery.
    pub const NOT_STARTED: MasteryLevel = MasteryLevel(0);
    /// Highest level.
    pub const MASTERED: MasteryLevel = MasteryLevel(4);

    /// Create a level, or `None` above [`MasteryLevel::MASTERED`].
    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MASTERED.0).then_some(Self(level))
    }

    /// Get the numeric level.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Get the display label for this level.
    pub fn label(&self) -> &'static str {
        match self.0 {
            0 => "Not started",
            1 => "Emerging",
            2 => "Developing",
            3 => "Proficient",
            _ => "Mastered",
        }
    }
}

impl TryFrom<u8> for MasteryLevel {
    type Error = ScaffoldError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level).ok_or_else(|| {
            ScaffoldError::invalid_evidence(format!(
                "mastery level {} above {}",
                level,
                Self::MASTERED.0
            ))
        })
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

impl std::fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rubric assessment attached to a skill's evidence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rubric {
    /// Share of correct work, `0.0..=1.0`.
    pub accuracy: f64,
    /// Assessment of the student's method.
    pub method: String,
    /// Assessment of the student's explanation.
    pub explanation: String,
}

impl Rubric {
    /// Get the accuracy, or an error if it is NaN or outside `[0, 1]`.
    pub fn checked_accuracy(&self) -> Result<f64> {
        let accuracy = self.accuracy;
        if accuracy.is_nan() {
            return Err(ScaffoldError::invalid_evidence("rubric accuracy is NaN"));
        }
        if !(0.0..=1.0).contains(&accuracy) {
            return Err(ScaffoldError::invalid_evidence(format!(
                "rubric accuracy {} outside [0, 1]",
                accuracy
            )));
        }
        Ok(accuracy)
    }

    /// Get the accuracy clamped into `[0, 1]`, NaN counting as 0.
    ///
    /// Logs a warning when clamping was needed.
    pub fn clamped_accuracy(&self) -> f64 {
        let fallback = if self.accuracy.is_nan() {
            0.0
        } else {
            self.accuracy.clamp(0.0, 1.0)
        };
        self.checked_accuracy()
            .fail_open_with("reading rubric accuracy", fallback)
    }
}

/// Accumulated evidence for one skill. Read only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Evidence {
    /// Tutor turns that demonstrated the skill.
    pub turn_ids: BTreeSet<String>,
    /// Whiteboard snapshots that demonstrated the skill.
    pub snapshot_ids: BTreeSet<String>,
    /// Rubric assessment.
    pub rubric: Rubric,
}

impl Evidence {
    /// Parse evidence as stored by the progress subsystem.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check if no interaction was observed.
    pub fn is_empty(&self) -> bool {
        self.turn_ids.is_empty() && self.snapshot_ids.is_empty()
    }
}

/// Mastery scorer with configured band thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteryScorer {
    thresholds: [f64; 4],
}

impl Default for MasteryScorer {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_MASTERY_THRESHOLDS,
        }
    }
}

impl MasteryScorer {
    /// Create a scorer from configuration.
    ///
    /// An invalid threshold table falls back to the defaults.
    pub fn new(config: &MasteryConfig) -> Self {
        if !MasteryConfig::is_valid_thresholds(&config.thresholds) {
            tracing::warn!(
                "Invalid mastery thresholds {:?}, using default {:?}",
                config.thresholds,
                DEFAULT_MASTERY_THRESHOLDS
            );
            return Self::default();
        }
        Self {
            thresholds: config.thresholds,
        }
    }

    /// Get the lower bounds of levels 1 through 4.
    pub fn thresholds(&self) -> &[f64; 4] {
        &self.thresholds
    }

    /// Band an accuracy in `[0, 1]` into a level.
    pub fn level_for_accuracy(&self, accuracy: f64) -> MasteryLevel {
        let reached = self.thresholds.iter().filter(|t| accuracy >= **t).count();
        MasteryLevel(reached as u8)
    }

    /// Compute the mastery level for a skill's evidence.
    pub fn compute(&self, evidence: &Evidence) -> MasteryLevel {
        if evidence.is_empty() {
            return MasteryLevel::NOT_STARTED;
        }
        self.level_for_accuracy(evidence.rubric.clamped_accuracy())
    }
}

/// Compute the mastery level with the default thresholds.
pub fn compute_mastery(evidence: &Evidence) -> MasteryLevel {
    MasteryScorer::default().compute(evidence)
}
