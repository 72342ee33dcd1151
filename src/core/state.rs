//! Session and turn state types for Scaffold.
//!
//! These types are owned and persisted by the surrounding session; the core
//! takes them in, returns updated copies, and never stores them itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScaffoldError};
use crate::math::{normalize, Confidence};

/// A student's answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// The answer as typed.
    pub text: String,
    /// Structured math markup (LaTeX) from the whiteboard, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

impl Answer {
    /// Create a text-only answer.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
        }
    }

    /// Attach a markup rendering.
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// The text to compare: the typed text, or the markup when the typed
    /// text carries nothing.
    pub fn comparable_text(&self) -> &str {
        match &self.markup {
            Some(markup) if normalize(&self.text).is_empty() => markup.as_str(),
            _ => self.text.as_str(),
        }
    }
}

/// Per-session answer counters.
///
/// Keys are camelCase to match the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionCounters {
    /// Answers submitted for the current problem.
    pub answer_attempts: u32,
    /// Wrong answers since the last success or Refocus turn.
    pub consecutive_wrong: u32,
    /// Whether the current problem has been solved.
    pub is_problem_solved: bool,
}

impl SessionCounters {
    /// Parse counters as stored by the session.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize counters for the session store.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Which path produced a validation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerdictSource {
    /// The local checker decided.
    Local {
        /// Confidence of the local verdict.
        confidence: Confidence,
    },
    /// The external verifier decided.
    Escalated {
        /// Verifier name.
        verifier: String,
    },
    /// Escalation was attempted and failed; the local verdict was kept.
    EscalationFailed {
        /// Verifier name.
        verifier: String,
        /// Why escalation failed.
        reason: String,
    },
}

impl VerdictSource {
    /// Check if the verdict came from the external verifier.
    pub fn is_escalated(&self) -> bool {
        matches!(self, Self::Escalated { .. })
    }
}

/// The merged verdict of one validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// True only if the deciding check reported the answers equivalent.
    pub is_valid: bool,
    /// The answer that was validated.
    pub answer: Answer,
    /// Which path decided.
    pub source: VerdictSource,
}

/// Pedagogical mode of one tutor turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// Ask a guiding question.
    #[default]
    Ask,
    /// Give a hint.
    Hint,
    /// Validate the student's answer.
    Validate,
    /// Step back and change approach after a streak of wrong answers.
    Refocus,
}

impl TurnMode {
    /// Get all turn modes.
    pub fn all() -> &'static [TurnMode] {
        &[
            TurnMode::Ask,
            TurnMode::Hint,
            TurnMode::Validate,
            TurnMode::Refocus,
        ]
    }

    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Hint => "hint",
            Self::Validate => "validate",
            Self::Refocus => "refocus",
        }
    }

    /// Check if `next` may follow this mode.
    ///
    /// Refocus may only follow Validate; every other mode may follow any
    /// mode.
    pub fn can_transition_to(&self, next: TurnMode) -> bool {
        next != TurnMode::Refocus || *self == TurnMode::Validate
    }
}

impl std::fmt::Display for TurnMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TurnMode {
    type Err = ScaffoldError;

    /// Parse a mode name proposed by the turn-producing collaborator.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| ScaffoldError::malformed_input(format!("unknown turn mode '{}'", s)))
    }
}

/// Turn machine state for one problem-solving session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TurnState {
    /// Mode of the most recent turn.
    pub mode: TurnMode,
    /// Turns assigned so far.
    pub turn_count: u32,
}

/// One assigned turn, handed to rendering. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    /// Zero-based turn index within the session.
    pub index: u32,
    /// Assigned mode.
    pub mode: TurnMode,
    /// Whether the stuck override replaced the proposed mode.
    pub forced: bool,
    /// When the mode was assigned.
    pub assigned_at: DateTime<Utc>,
}

impl TurnRecord {
    /// Create a record stamped with the current time.
    pub fn new(index: u32, mode: TurnMode, forced: bool) -> Self {
        Self {
            index,
            mode,
            forced,
            assigned_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Answer
    // =========================================================================

    #[test]
    fn test_answer_prefers_text() {
        let answer = Answer::new("1/2").with_markup("\\frac{1}{2}");
        assert_eq!(answer.comparable_text(), "1/2");
    }

    #[test]
    fn test_answer_falls_back_to_markup() {
        let answer = Answer::new("  ").with_markup("\\frac{1}{2}");
        assert_eq!(answer.comparable_text(), "\\frac{1}{2}");

        let answer = Answer::new("$$").with_markup("x^2");
        assert_eq!(answer.comparable_text(), "x^2");
    }

    #[test]
    fn test_answer_without_markup() {
        assert_eq!(Answer::new("").comparable_text(), "");
    }

    #[test]
    fn test_answer_serialization_skips_missing_markup() {
        let json = serde_json::to_string(&Answer::new("42")).unwrap();
        assert_eq!(json, r#"{"text":"42"}"#);
        let parsed: Answer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Answer::new("42"));
    }

    // =========================================================================
    // SessionCounters
    // =========================================================================

    #[test]
    fn test_counters_default() {
        let counters = SessionCounters::default();
        assert_eq!(counters.answer_attempts, 0);
        assert_eq!(counters.consecutive_wrong, 0);
        assert!(!counters.is_problem_solved);
    }

    #[test]
    fn test_counters_use_camel_case_keys() {
        let counters = SessionCounters {
            answer_attempts: 4,
            consecutive_wrong: 0,
            is_problem_solved: true,
        };
        let json = serde_json::to_value(counters).unwrap();
        assert_eq!(json["answerAttempts"], 4);
        assert_eq!(json["consecutiveWrong"], 0);
        assert_eq!(json["isProblemSolved"], true);
    }

    #[test]
    fn test_counters_tolerate_missing_keys() {
        let counters = SessionCounters::from_json(r#"{"answerAttempts":2}"#).unwrap();
        assert_eq!(counters.answer_attempts, 2);
        assert_eq!(counters.consecutive_wrong, 0);
    }

    #[test]
    fn test_counters_json_helpers() {
        let counters = SessionCounters {
            answer_attempts: 3,
            consecutive_wrong: 3,
            is_problem_solved: false,
        };
        let json = counters.to_json().unwrap();
        assert!(json.contains("\"consecutiveWrong\":3"));
        assert!(matches!(
            SessionCounters::from_json("{not json"),
            Err(ScaffoldError::Serde { .. })
        ));
    }

    // =========================================================================
    // VerdictSource
    // =========================================================================

    #[test]
    fn test_verdict_source_serialization() {
        let json = serde_json::to_value(VerdictSource::Local {
            confidence: Confidence::Medium,
        })
        .unwrap();
        assert_eq!(json["kind"], "local");
        assert_eq!(json["confidence"], "medium");

        let json = serde_json::to_value(VerdictSource::EscalationFailed {
            verifier: "judge".to_string(),
            reason: "timeout".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "escalation_failed");
    }

    #[test]
    fn test_is_escalated() {
        assert!(VerdictSource::Escalated {
            verifier: "judge".to_string()
        }
        .is_escalated());
        assert!(!VerdictSource::Local {
            confidence: Confidence::Low
        }
        .is_escalated());
    }

    // =========================================================================
    // TurnMode
    // =========================================================================

    #[test]
    fn test_turn_mode_default_is_ask() {
        assert_eq!(TurnMode::default(), TurnMode::Ask);
        assert_eq!(TurnState::default().mode, TurnMode::Ask);
    }

    #[test]
    fn test_transition_table() {
        use TurnMode::*;
        for from in TurnMode::all() {
            for to in [Ask, Hint, Validate] {
                assert!(from.can_transition_to(to), "{from} -> {to}");
            }
        }
        assert!(Validate.can_transition_to(Refocus));
        assert!(!Ask.can_transition_to(Refocus));
        assert!(!Hint.can_transition_to(Refocus));
        assert!(!Refocus.can_transition_to(Refocus));
    }

    #[test]
    fn test_turn_mode_from_str() {
        assert_eq!("hint".parse::<TurnMode>().unwrap(), TurnMode::Hint);
        assert_eq!(" Refocus ".parse::<TurnMode>().unwrap(), TurnMode::Refocus);
        assert!(matches!(
            "lecture".parse::<TurnMode>(),
            Err(ScaffoldError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_turn_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&TurnMode::Refocus).unwrap(),
            "\"refocus\""
        );
        for mode in TurnMode::all() {
            assert_eq!(mode.to_string(), mode.as_str());
        }
    }
}
