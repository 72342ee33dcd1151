//! Problem type classification.
//!
//! A first-match rule cascade over the raw problem text. Order matters:
//! algebra and geometry cues are checked before the generic word-problem,
//! multi-step and arithmetic cues because they select a more specific
//! teaching strategy.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Token count a word problem must exceed.
const WORD_PROBLEM_MIN_TOKENS: usize = 10;

/// Operator/equality symbols that make a problem multi-step.
const MULTI_STEP_MIN_OPERATORS: usize = 3;

/// Single-letter variable followed by an operator: `x +`, `y=`.
static VAR_THEN_OP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^a-z])[a-z]\s*[+\-−*/^=<>]").unwrap());

/// Operator followed by a single-letter variable: `+ x`, `= y`.
static OP_THEN_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-−*/^=<>]\s*[a-z](?:$|[^a-z])").unwrap());

/// Coefficient juxtaposed with a variable: `2x`, `3y`.
///
/// `g`, `l`, `m` and `s` are left out: `5m`, `2l` are units, not terms.
static COEFFICIENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[a-fh-kn-rt-z](?:$|[^a-z])").unwrap());

static GEOMETRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:area|perimeter|circumference|radius|diameter|circles?|triangles?|rectangles?|quadrilaterals?|polygons?|pentagons?|hexagons?|octagons?|parallelograms?|trapezoids?|rhombus|angles?|degrees|volume|cubes?|spheres?|cylinders?|cones?|prisms?|pyramids?|hypotenuse|pythagorean|congruent|length|width)\b",
    )
    .unwrap()
});

static NARRATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:has|have|had|buys?|bought|gives?|gave|gets?|got|left|each|altogether|total|shares?|shared|spends?|spent|costs?|sells?|sold|earns?|earned|saves?|saved|how many|how much|remain(?:s|ing)?|every)\b",
    )
    .unwrap()
});

/// `number operator number` at the start, after an optional instruction.
static ARITHMETIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:what\s+is|what's|calculate|compute|evaluate|find|solve|simplify|work\s+out)\s*:?\s*)?[-−]?\d+(?:[.,]\d+)?\s*(?:[+\-−*/×÷x]|plus|minus|times|divided\s+by)\s*[-−]?\d",
    )
    .unwrap()
});

/// Subject area of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemType {
    /// Bare numbers and operators.
    Arithmetic,
    /// Unknowns, expressions and equations.
    Algebra,
    /// Shapes and measurement.
    Geometry,
    /// A narrative that has to be translated into math.
    WordProblem,
    /// Several chained operations.
    MultiStep,
    /// Nothing matched.
    Unknown,
}

impl ProblemType {
    /// Get all problem types.
    pub fn all() -> &'static [ProblemType] {
        &[
            ProblemType::Arithmetic,
            ProblemType::Algebra,
            ProblemType::Geometry,
            ProblemType::WordProblem,
            ProblemType::MultiStep,
            ProblemType::Unknown,
        ]
    }

    /// Get the type tag as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arithmetic => "arithmetic",
            Self::Algebra => "algebra",
            Self::Geometry => "geometry",
            Self::WordProblem => "word-problem",
            Self::MultiStep => "multi-step",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a type tag.
    pub fn parse(s: &str) -> Option<Self> {
        let tag = s.trim().to_lowercase();
        Self::all().iter().copied().find(|t| t.as_str() == tag)
    }
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a problem by its text.
///
/// Total: anything unrecognized is [`ProblemType::Unknown`].
pub fn classify_type(problem_text: &str) -> ProblemType {
    let text = problem_text.trim().to_lowercase();

    let problem_type = if mentions_variable(&text) {
        ProblemType::Algebra
    } else if GEOMETRY_RE.is_match(&text) {
        ProblemType::Geometry
    } else if text.split_whitespace().count() > WORD_PROBLEM_MIN_TOKENS
        && NARRATIVE_RE.is_match(&text)
    {
        ProblemType::WordProblem
    } else if count_operators(&text) >= MULTI_STEP_MIN_OPERATORS {
        ProblemType::MultiStep
    } else if ARITHMETIC_RE.is_match(&text) {
        ProblemType::Arithmetic
    } else {
        ProblemType::Unknown
    };

    tracing::debug!(%problem_type, "classified problem type");
    problem_type
}

/// Whether lowercased text uses a single-letter variable in a math context.
///
/// An `x` between two numbers (`3x4`, `3 x 4`) is a times sign.
pub(crate) fn mentions_variable(text: &str) -> bool {
    let text = times_x_as_operator(text);
    VAR_THEN_OP_RE.is_match(&text)
        || OP_THEN_VAR_RE.is_match(&text)
        || COEFFICIENT_RE.is_match(&text)
}

/// Replace every `x` that sits between two digits (spaces allowed) with `*`.
fn times_x_as_operator(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let digit_before = |i: usize| {
        chars[..i]
            .iter()
            .rev()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| c.is_ascii_digit())
    };
    let digit_after = |i: usize| {
        chars[i + 1..]
            .iter()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| c.is_ascii_digit())
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c == 'x' && digit_before(i) && digit_after(i) {
                '*'
            } else {
                c
            }
        })
        .collect()
}

/// Count operator and equality symbols.
///
/// A hyphen between two letters joins a word and is not counted.
fn count_operators(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|(i, c)| match c {
            '+' | '*' | '/' | '×' | '÷' | '=' | '^' | '−' => true,
            '-' => {
                let before = i.checked_sub(1).and_then(|j| chars.get(j));
                let after = chars.get(i + 1);
                !(before.is_some_and(|b| b.is_alphabetic()) && after.is_some_and(|a| a.is_alphabetic()))
            }
            _ => false,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Individual rules
    // =========================================================================

    #[test]
    fn test_algebra() {
        assert_eq!(classify_type("Solve for x: 2x + 3 = 7"), ProblemType::Algebra);
        assert_eq!(classify_type("Simplify a + b - a"), ProblemType::Algebra);
        assert_eq!(classify_type("y = 3"), ProblemType::Algebra);
        assert_eq!(classify_type("What is 4y?"), ProblemType::Algebra);
    }

    #[test]
    fn test_geometry() {
        assert_eq!(
            classify_type("Find the area of a circle with radius 5"),
            ProblemType::Geometry
        );
        assert_eq!(
            classify_type("What is the perimeter of a rectangle 5m long and 3m wide?"),
            ProblemType::Geometry
        );
        assert_eq!(
            classify_type("How many degrees are in a triangle?"),
            ProblemType::Geometry
        );
    }

    #[test]
    fn test_word_problem() {
        assert_eq!(
            classify_type(
                "Maria has 12 apples and gives 5 of them to her friend. How many apples does she have left?"
            ),
            ProblemType::WordProblem
        );
    }

    #[test]
    fn test_short_narrative_is_not_word_problem() {
        assert_eq!(classify_type("Sam has 3 apples"), ProblemType::Unknown);
    }

    #[test]
    fn test_multi_step() {
        assert_eq!(classify_type("2 + 3 * 4 - 1"), ProblemType::MultiStep);
        assert_eq!(classify_type("What is (6 ÷ 2) × 3 + 1?"), ProblemType::MultiStep);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(classify_type("12 + 7"), ProblemType::Arithmetic);
        assert_eq!(classify_type("What is 3 + 4?"), ProblemType::Arithmetic);
        assert_eq!(classify_type("Calculate 81 / 9"), ProblemType::Arithmetic);
        assert_eq!(classify_type("what is 7 minus 2"), ProblemType::Arithmetic);
        assert_eq!(classify_type("-4 + 10"), ProblemType::Arithmetic);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify_type(""), ProblemType::Unknown);
        assert_eq!(classify_type("   "), ProblemType::Unknown);
        assert_eq!(classify_type("Tell me a story"), ProblemType::Unknown);
        assert_eq!(classify_type("What is 42?"), ProblemType::Unknown);
    }

    // =========================================================================
    // Precedence
    // =========================================================================

    #[test]
    fn test_algebra_beats_geometry() {
        assert_eq!(
            classify_type("The area of a square is x^2 = 49. Find x."),
            ProblemType::Algebra
        );
    }

    #[test]
    fn test_geometry_beats_word_problem() {
        assert_eq!(
            classify_type(
                "Tom has a garden shaped like a rectangle. He buys fence for each side. What is the perimeter?"
            ),
            ProblemType::Geometry
        );
    }

    #[test]
    fn test_multi_step_beats_arithmetic() {
        assert_eq!(classify_type("1 + 2 + 3 + 4"), ProblemType::MultiStep);
    }

    #[test]
    fn test_hyphenated_words_are_not_operators() {
        assert_eq!(count_operators("a two-digit and three-digit well-known"), 0);
        assert_eq!(count_operators("5 - 3 - 1 - 0"), 3);
    }

    #[test]
    fn test_units_are_not_coefficients() {
        assert!(!mentions_variable("a rope 5m long weighs 3g"));
        assert!(mentions_variable("2x"));
    }

    #[test]
    fn test_x_between_numbers_is_times() {
        assert!(!mentions_variable("3x4"));
        assert!(!mentions_variable("2 x 3 x 4"));
        assert_eq!(classify_type("3x4"), ProblemType::Arithmetic);
        assert_eq!(classify_type("12 x 7"), ProblemType::Arithmetic);
        assert_eq!(times_x_as_operator("2x3x4"), "2*3*4");
        // A coefficient on its own is still a variable
        assert_eq!(classify_type("3x + 4 = 10"), ProblemType::Algebra);
        assert_eq!(classify_type("solve 3x = 12"), ProblemType::Algebra);
    }

    #[test]
    fn test_single_letter_after_number_is_a_variable() {
        // `h` is not a unit here; only g, l, m and s are
        assert_eq!(classify_type("3h"), ProblemType::Algebra);
        assert_eq!(classify_type("5t + 1"), ProblemType::Algebra);
        assert_eq!(classify_type("a rope 5m long"), ProblemType::Unknown);
    }

    // =========================================================================
    // Tags
    // =========================================================================

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ProblemType::WordProblem).unwrap();
        assert_eq!(json, "\"word-problem\"");
        let parsed: ProblemType = serde_json::from_str("\"multi-step\"").unwrap();
        assert_eq!(parsed, ProblemType::MultiStep);
    }

    #[test]
    fn test_parse_matches_as_str() {
        for t in ProblemType::all() {
            assert_eq!(ProblemType::parse(t.as_str()), Some(*t));
            assert_eq!(t.to_string(), t.as_str());
        }
        assert_eq!(ProblemType::parse(" Algebra "), Some(ProblemType::Algebra));
        assert_eq!(ProblemType::parse("calculus"), None);
    }
}
