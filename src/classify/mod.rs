//! Problem classification for Scaffold.
//!
//! Classifies raw problem text into a subject area and a grade band, and
//! selects the matching teaching guidance. Every classifier is a pure,
//! first-match rule cascade that returns exactly one label.

pub mod grade;
pub mod guidance;
pub mod problem_type;

use serde::Serialize;

pub use grade::{classify_grade, GradeBand};
pub use guidance::guidance;
pub use problem_type::{classify_type, ProblemType};

/// Everything the turn-producing collaborator needs to know about a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemProfile {
    /// Subject area.
    pub problem_type: ProblemType,
    /// Grade band, inferred or supplied.
    pub grade_band: GradeBand,
    /// Teaching guidance for the subject area.
    pub guidance: &'static str,
}

/// Classify a problem in one call.
pub fn classify_problem(problem_text: &str, child_grade: Option<&str>) -> ProblemProfile {
    let problem_type = classify_type(problem_text);
    ProblemProfile {
        problem_type,
        grade_band: classify_grade(problem_text, child_grade),
        guidance: guidance(problem_type),
    }
}
