//! Local answer equivalence checking.
//!
//! Stages run cheapest first and stop at the first decisive one:
//! 1. exact match after normalization (`High`)
//! 2. numeric value match across decimal/fraction/percent forms, with an
//!    optional unit of measure on either side (`High`)
//! 3. canonical polynomial comparison of simple algebraic forms (`Medium`)
//! 4. anything else: not equivalent, `Low`
//!
//! `Low` is a request for escalation, not a verdict.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EquivalenceConfig;
use crate::math::expr::{parse_form, Limits};
use crate::math::normalize::normalize;
use crate::math::number::{parse_quantity, NumericValue};

/// `x=<rest>`: an answer stated as a single-variable assignment.
static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]=(.+)$").unwrap());

/// How trustworthy a local verdict is.
///
/// Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Unparsed or ambiguous; escalate if possible.
    Low,
    /// Structural match of algebraic forms.
    Medium,
    /// Exact or numeric match.
    High,
}

/// Verdict of one local comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquivalenceResult {
    /// Whether the answers are equivalent.
    pub is_equivalent: bool,
    /// How far the verdict can be trusted.
    pub confidence: Confidence,
}

impl EquivalenceResult {
    /// The conservative verdict for anything that could not be decided.
    pub const UNDECIDED: EquivalenceResult = EquivalenceResult {
        is_equivalent: false,
        confidence: Confidence::Low,
    };

    /// Create a new result.
    pub fn new(is_equivalent: bool, confidence: Confidence) -> Self {
        Self {
            is_equivalent,
            confidence,
        }
    }

    /// Whether the verdict should be escalated to an external verifier.
    pub fn needs_escalation(&self) -> bool {
        self.confidence == Confidence::Low
    }
}

/// Equivalence checker with configured tolerances and size limits.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceChecker {
    config: EquivalenceConfig,
}

impl EquivalenceChecker {
    /// Create a checker from configuration.
    pub fn new(config: &EquivalenceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Compare a student answer with the expected answer.
    ///
    /// Never fails: malformed input yields [`EquivalenceResult::UNDECIDED`].
    pub fn check(&self, student_answer: &str, expected_answer: &str) -> EquivalenceResult {
        let student = normalize(student_answer);
        let expected = normalize(expected_answer);

        if student.is_empty() || expected.is_empty() {
            tracing::debug!("empty answer after normalization");
            return EquivalenceResult::UNDECIDED;
        }

        let (student, expected) = drop_assignment_prefix(student, expected);

        if student == expected {
            tracing::debug!("exact match after normalization");
            return EquivalenceResult::new(true, Confidence::High);
        }

        if let (Some((s, s_unit)), Some((e, e_unit))) =
            (parse_quantity(&student), parse_quantity(&expected))
        {
            if let (Some(s_unit), Some(e_unit)) = (s_unit, e_unit) {
                if s_unit != e_unit {
                    tracing::debug!(s_unit, e_unit, "numbers in different units");
                    return EquivalenceResult::UNDECIDED;
                }
            }
            return self.compare_numbers(s, e);
        }

        let limits = Limits::from(&self.config);
        let verdict = parse_form(&student, &limits)
            .zip(parse_form(&expected, &limits))
            .and_then(|(s, e)| s.equivalent_to(&e));
        match verdict {
            Some(is_equivalent) => {
                tracing::debug!(is_equivalent, "structural comparison decided");
                EquivalenceResult::new(is_equivalent, Confidence::Medium)
            }
            None => {
                tracing::debug!("no local stage could decide");
                EquivalenceResult::UNDECIDED
            }
        }
    }

    fn compare_numbers(&self, student: NumericValue, expected: NumericValue) -> EquivalenceResult {
        let diff = (student.value - expected.value).abs();
        let scale = student.value.abs().max(expected.value.abs());

        if diff <= self.config.absolute_tolerance || diff <= self.config.relative_tolerance * scale
        {
            tracing::debug!("numeric match");
            return EquivalenceResult::new(true, Confidence::High);
        }

        // A rounded decimal on either side that is right to the precision it
        // was written with (0.33 for 1/3) may or may not be acceptable.
        for decimals in [student.decimals, expected.decimals].into_iter().flatten() {
            let half_unit = 0.5 * 10f64.powi(-(decimals.min(300) as i32));
            if diff <= half_unit + self.config.absolute_tolerance {
                tracing::debug!(decimals, "numeric match only after rounding");
                return EquivalenceResult::UNDECIDED;
            }
        }

        EquivalenceResult::new(false, Confidence::High)
    }
}

/// Compare two answers with the default configuration.
pub fn check(student_answer: &str, expected_answer: &str) -> EquivalenceResult {
    EquivalenceChecker::default().check(student_answer, expected_answer)
}

/// Drop `x=` from one side when the other side is a bare value.
fn drop_assignment_prefix(student: String, expected: String) -> (String, String) {
    fn value_of(s: &str) -> Option<String> {
        ASSIGNMENT_RE.captures(s).map(|c| c[1].to_string())
    }

    if !expected.contains('=') {
        if let Some(value) = value_of(&student) {
            return (value, expected);
        }
    }
    if !student.contains('=') {
        if let Some(value) = value_of(&expected) {
            return (student, value);
        }
    }
    (student, expected)
}
