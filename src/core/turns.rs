//! Turn mode state machine for Scaffold.
//!
//! The turn-producing collaborator proposes a mode for every tutor turn.
//! The controller accepts the proposal unless the student is stuck, in which
//! case the turn must be a Refocus. It also keeps proposals inside the
//! transition table:
//!
//! ```text
//! Ask      → Ask | Hint | Validate
//! Hint     → Ask | Hint | Validate
//! Validate → Ask | Hint | Validate | Refocus
//! Refocus  → Ask | Hint | Validate
//! ```

use crate::config::Config;
use crate::core::state::{SessionCounters, TurnMode, TurnRecord, TurnState};

/// Turn mode state machine.
///
/// All turn state and streak mutations go through this struct.
#[derive(Debug)]
pub struct TurnController<'a> {
    /// The turn state being managed.
    state: &'a mut TurnState,
    /// The session counters the stuck rule reads and clears.
    counters: &'a mut SessionCounters,
    /// Configuration for the stuck threshold.
    config: &'a Config,
}

impl<'a> TurnController<'a> {
    /// Create a new turn controller.
    pub fn new(
        state: &'a mut TurnState,
        counters: &'a mut SessionCounters,
        config: &'a Config,
    ) -> Self {
        Self {
            state,
            counters,
            config,
        }
    }

    /// Get the mode of the most recent turn.
    pub fn mode(&self) -> TurnMode {
        self.state.mode
    }

    /// Get the number of turns assigned so far.
    pub fn turn_count(&self) -> u32 {
        self.state.turn_count
    }

    /// Check if the wrong-answer streak has reached the stuck threshold.
    pub fn is_stuck(&self) -> bool {
        self.counters.consecutive_wrong >= self.config.stuck.threshold
    }

    /// The mode the next turn must take, if the choice is not free.
    pub fn required_mode(&self) -> Option<TurnMode> {
        self.is_stuck().then_some(TurnMode::Refocus)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Assign the mode of the next turn.
    ///
    /// When stuck, the turn is Refocus whatever was proposed, and the record
    /// is marked `forced` if that replaced the proposal. Otherwise the
    /// proposal is used if the transition table allows it; a disallowed
    /// proposal (Refocus outside Validate) becomes a Hint.
    ///
    /// Assigning Refocus clears the wrong-answer streak.
    pub fn assign(&mut self, proposed: TurnMode) -> TurnRecord {
        let (mode, forced) = if self.is_stuck() {
            tracing::debug!(
                consecutive_wrong = self.counters.consecutive_wrong,
                threshold = self.config.stuck.threshold,
                %proposed,
                "student is stuck, forcing refocus"
            );
            (TurnMode::Refocus, proposed != TurnMode::Refocus)
        } else if self.state.mode.can_transition_to(proposed) {
            (proposed, false)
        } else {
            tracing::warn!(
                "Turn mode {} cannot follow {}, using hint",
                proposed,
                self.state.mode
            );
            (TurnMode::Hint, false)
        };

        if mode == TurnMode::Refocus {
            self.counters.consecutive_wrong = 0;
        }

        let record = TurnRecord::new(self.state.turn_count, mode, forced);
        self.state.mode = mode;
        self.state.turn_count = self.state.turn_count.saturating_add(1);
        record
    }

    /// Return to Ask for a new problem.
    ///
    /// Counters belong to the session and are left alone.
    pub fn reset_for_new_problem(&mut self) {
        self.state.mode = TurnMode::Ask;
        self.state.turn_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_threshold(threshold: u32) -> Config {
        let mut config = Config::default();
        config.stuck.threshold = threshold;
        config
    }

    fn counters_with_streak(consecutive_wrong: u32) -> SessionCounters {
        SessionCounters {
            answer_attempts: consecutive_wrong,
            consecutive_wrong,
            is_problem_solved: false,
        }
    }

    // =========================================================================
    // Free choice
    // =========================================================================

    #[test]
    fn test_initial_mode_is_ask() {
        let mut state = TurnState::default();
        let mut counters = SessionCounters::default();
        let config = Config::default();
        let controller = TurnController::new(&mut state, &mut counters, &config);

        assert_eq!(controller.mode(), TurnMode::Ask);
        assert_eq!(controller.turn_count(), 0);
        assert!(!controller.is_stuck());
        assert_eq!(controller.required_mode(), None);
    }

    #[test]
    fn test_proposal_accepted() {
        let mut state = TurnState::default();
        let mut counters = SessionCounters::default();
        let config = Config::default();
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        let record = controller.assign(TurnMode::Hint);
        assert_eq!(record.mode, TurnMode::Hint);
        assert_eq!(record.index, 0);
        assert!(!record.forced);

        let record = controller.assign(TurnMode::Validate);
        assert_eq!(record.mode, TurnMode::Validate);
        assert_eq!(record.index, 1);
        assert_eq!(controller.turn_count(), 2);
    }

    #[test]
    fn test_refocus_allowed_after_validate() {
        let mut state = TurnState {
            mode: TurnMode::Validate,
            turn_count: 3,
        };
        let mut counters = counters_with_streak(1);
        let config = Config::default();
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        let record = controller.assign(TurnMode::Refocus);
        assert_eq!(record.mode, TurnMode::Refocus);
        assert!(!record.forced);
        assert_eq!(counters.consecutive_wrong, 0);
    }

    #[test]
    fn test_refocus_outside_validate_becomes_hint() {
        for from in [TurnMode::Ask, TurnMode::Hint, TurnMode::Refocus] {
            let mut state = TurnState {
                mode: from,
                turn_count: 1,
            };
            let mut counters = counters_with_streak(2);
            let config = Config::default();
            let mut controller = TurnController::new(&mut state, &mut counters, &config);

            let record = controller.assign(TurnMode::Refocus);
            assert_eq!(record.mode, TurnMode::Hint, "from {from}");
            assert_eq!(counters.consecutive_wrong, 2);
        }
    }

    // =========================================================================
    // Stuck override
    // =========================================================================

    #[test]
    fn test_stuck_forces_refocus() {
        for proposed in [TurnMode::Ask, TurnMode::Hint, TurnMode::Validate] {
            let mut state = TurnState {
                mode: TurnMode::Ask,
                turn_count: 5,
            };
            let mut counters = counters_with_streak(3);
            let config = Config::default();
            let mut controller = TurnController::new(&mut state, &mut counters, &config);

            assert!(controller.is_stuck());
            assert_eq!(controller.required_mode(), Some(TurnMode::Refocus));

            let record = controller.assign(proposed);
            assert_eq!(record.mode, TurnMode::Refocus);
            assert!(record.forced);
            assert_eq!(state.mode, TurnMode::Refocus);
        }
    }

    #[test]
    fn test_stuck_with_refocus_proposal_is_not_forced() {
        let mut state = TurnState {
            mode: TurnMode::Validate,
            turn_count: 5,
        };
        let mut counters = counters_with_streak(4);
        let config = Config::default();
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        let record = controller.assign(TurnMode::Refocus);
        assert_eq!(record.mode, TurnMode::Refocus);
        assert!(!record.forced);
    }

    #[test]
    fn test_refocus_clears_streak() {
        let mut state = TurnState::default();
        let mut counters = counters_with_streak(3);
        let config = Config::default();
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        controller.assign(TurnMode::Hint);
        assert!(!controller.is_stuck());
        assert_eq!(counters.consecutive_wrong, 0);
        assert_eq!(counters.answer_attempts, 3);
    }

    #[test]
    fn test_below_threshold_is_free_choice() {
        let mut state = TurnState::default();
        let mut counters = counters_with_streak(2);
        let config = Config::default();
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        let record = controller.assign(TurnMode::Ask);
        assert_eq!(record.mode, TurnMode::Ask);
        assert_eq!(counters.consecutive_wrong, 2);
    }

    #[test]
    fn test_configured_threshold() {
        let mut state = TurnState::default();
        let mut counters = counters_with_streak(1);
        let config = config_with_threshold(1);
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        assert!(controller.is_stuck());
        assert_eq!(controller.assign(TurnMode::Ask).mode, TurnMode::Refocus);
    }

    // =========================================================================
    // Reset
    // =========================================================================

    #[test]
    fn test_reset_for_new_problem() {
        let mut state = TurnState {
            mode: TurnMode::Refocus,
            turn_count: 9,
        };
        let mut counters = SessionCounters {
            answer_attempts: 4,
            consecutive_wrong: 0,
            is_problem_solved: true,
        };
        let config = Config::default();
        let mut controller = TurnController::new(&mut state, &mut counters, &config);

        controller.reset_for_new_problem();
        assert_eq!(controller.mode(), TurnMode::Ask);
        assert_eq!(controller.turn_count(), 0);
        assert_eq!(counters.answer_attempts, 4);
        assert!(counters.is_problem_solved);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_mode() -> impl Strategy<Value = TurnMode> {
            prop_oneof![
                Just(TurnMode::Ask),
                Just(TurnMode::Hint),
                Just(TurnMode::Validate),
                Just(TurnMode::Refocus),
            ]
        }

        proptest! {
            // Property: every assigned mode is reachable from the previous one,
            // and a stuck streak always yields Refocus.
            #[test]
            fn prop_assignments_respect_rules(
                steps in prop::collection::vec((arb_mode(), 0u32..6), 1..40),
            ) {
                let mut state = TurnState::default();
                let mut counters = SessionCounters::default();
                let config = Config::default();

                for (proposed, streak) in steps {
                    counters.consecutive_wrong = streak;
                    let previous = state.mode;
                    let stuck = streak >= config.stuck.threshold;

                    let record = TurnController::new(&mut state, &mut counters, &config)
                        .assign(proposed);

                    if stuck {
                        prop_assert_eq!(record.mode, TurnMode::Refocus);
                    } else {
                        prop_assert!(previous.can_transition_to(record.mode));
                    }
                    if record.mode == TurnMode::Refocus {
                        prop_assert_eq!(counters.consecutive_wrong, 0);
                    }
                }
            }
        }
    }
}
