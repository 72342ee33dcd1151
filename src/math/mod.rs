//! Answer comparison for Scaffold.
//!
//! This module turns free-form student answers into something comparable
//! and decides whether two answers mean the same thing:
//! - **normalize**: strips presentation noise from answer text
//! - **number**: parses the numeric surface forms students type
//! - **expr**: parses simple algebraic forms into canonical polynomials
//! - **equivalence**: the staged checker with a confidence tier

pub mod equivalence;
pub mod expr;
pub mod normalize;
pub mod number;

pub use equivalence::{check, Confidence, EquivalenceChecker, EquivalenceResult};
pub use expr::{parse_form, AlgebraicForm, Limits};
pub use normalize::normalize;
pub use number::{parse_number, NumericValue};
