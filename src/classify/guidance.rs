//! Teaching guidance per problem type.

use crate::classify::problem_type::ProblemType;

/// Get the teaching guidance for a problem type.
pub fn guidance(problem_type: ProblemType) -> &'static str {
    match problem_type {
        ProblemType::Arithmetic => {
            "Work one operation at a time. Ask the student to estimate first, then compute and compare against the estimate."
        }
        ProblemType::Algebra => {
            "Focus on isolating the variable. Ask what operation undoes each step and keep both sides of the equation balanced."
        }
        ProblemType::Geometry => {
            "Start from the shape and what is known about it. Ask which formula connects the given measurements to the one asked for."
        }
        ProblemType::WordProblem => {
            "Translate the story into math before computing. Ask what is known, what is asked and which operation links them."
        }
        ProblemType::MultiStep => {
            "Break the problem into steps and solve them in order. Check each intermediate result before moving on."
        }
        ProblemType::Unknown => {
            "Ask the student to restate the problem in their own words and identify what they need to find."
        }
    }
}
