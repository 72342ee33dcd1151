//! Grade band inference.
//!
//! An explicit grade from the caller always wins. Otherwise ordered
//! heuristics look at vocabulary, operators and digit magnitude, most
//! advanced first.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::problem_type::mentions_variable;

static ADVANCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:quadratics?|polynomials?|parabolas?|sine|cosine|tangent|sin|cos|tan|trig\w*|logarithms?|log|exponentials?|derivatives?|integrals?|calculus|matri(?:x|ces)|vectors?|factori[sz]e)\b|\^\s*\(?\s*[2-9]|[²³]",
    )
    .unwrap()
});

static MIDDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"%|\b(?:percent(?:ages?|s)?|ratios?|proportion(?:al|s)?|rates?|negative|integers?|inequalit(?:y|ies)|exponents?)\b",
    )
    .unwrap()
});

/// A negative number literal: `-5`, `(−3`, `= -2`.
static NEGATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(=+*/,])[-−]\d").unwrap());

static FRACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:fractions?|decimals?|numerators?|denominators?|halves|half|thirds?|quarters?|fourths?|tenths?|hundredths?|mixed numbers?)\b|\d+\s*/\s*\d+|\d\.\d",
    )
    .unwrap()
});

static MULTI_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\d{2,}\s*[+\-−]\s*\d|\d\s*[+\-−]\s*\d{2,}|\d\s*[*×÷x]\s*\d|\b(?:times|multiply|multiplied|multiplication|divide|divided|division|product|quotient|remainder)\b",
    )
    .unwrap()
});

static EARLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\D)\d\s*[+\-−]\s*\d(?:$|\D)|\b(?:count|counting|how many|plus|minus|add|adding|subtract|take away|more than|fewer than)\b",
    )
    .unwrap()
});

/// Grade band of a problem.
///
/// Serialized as its label (`"K-2"`, `"Not specified"`, or the explicit
/// grade text). Deserialization reads a band label back as the band, so an
/// explicit grade spelled exactly like a band label (`"K-2"`) comes back as
/// that band and is no longer [`is_explicit`](GradeBand::is_explicit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GradeBand {
    /// Kindergarten to grade 2.
    KTo2,
    /// Grades 3 to 5.
    ThreeTo5,
    /// Grades 6 to 8.
    SixTo8,
    /// Grades 9 to 12.
    NineTo12,
    /// Nothing matched and no grade was supplied.
    NotSpecified,
    /// A grade supplied by the caller, returned unchanged.
    Explicit(String),
}

impl GradeBand {
    /// Get the band label.
    pub fn label(&self) -> &str {
        match self {
            Self::KTo2 => "K-2",
            Self::ThreeTo5 => "3-5",
            Self::SixTo8 => "6-8",
            Self::NineTo12 => "9-12",
            Self::NotSpecified => "Not specified",
            Self::Explicit(grade) => grade,
        }
    }

    /// Check if the band came from the caller rather than inference.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

impl From<String> for GradeBand {
    fn from(label: String) -> Self {
        match label.as_str() {
            "K-2" => Self::KTo2,
            "3-5" => Self::ThreeTo5,
            "6-8" => Self::SixTo8,
            "9-12" => Self::NineTo12,
            "Not specified" => Self::NotSpecified,
            _ => Self::Explicit(label),
        }
    }
}

impl From<GradeBand> for String {
    fn from(band: GradeBand) -> Self {
        match band {
            GradeBand::Explicit(grade) => grade,
            other => other.label().to_string(),
        }
    }
}

impl std::fmt::Display for GradeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Infer the grade band of a problem.
///
/// A non-blank `child_grade` is returned unchanged. A blank one counts as
/// absent.
pub fn classify_grade(problem_text: &str, child_grade: Option<&str>) -> GradeBand {
    if let Some(grade) = child_grade.filter(|g| !g.trim().is_empty()) {
        return GradeBand::Explicit(grade.to_string());
    }

    let text = problem_text.trim().to_lowercase();

    let band = if ADVANCED_RE.is_match(&text) {
        GradeBand::NineTo12
    } else if MIDDLE_RE.is_match(&text)
        || NEGATIVE_RE.is_match(&text)
        || (text.contains('=') && mentions_variable(&text))
    {
        GradeBand::SixTo8
    } else if FRACTION_RE.is_match(&text) || MULTI_DIGIT_RE.is_match(&text) {
        GradeBand::ThreeTo5
    } else if EARLY_RE.is_match(&text) {
        GradeBand::KTo2
    } else {
        GradeBand::NotSpecified
    };

    tracing::debug!(grade_band = %band, "inferred grade band");
    band
}
