//! # Decision engine
//!
//! Dispatches each cycle's snapshot to the handler of the current mode. The handlers themselves
//! live in the `mode_*` files, and the actuator actions they share in `actions.rs`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::{ActionTimer, DecisionParams, Mode, RoverState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The decision engine.
///
/// Holds only the parameters, all state between cycles lives in the snapshot and the timer,
/// which are owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    pub(crate) params: DecisionParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionEngine {
    pub fn new(params: DecisionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DecisionParams {
        &self.params
    }

    /// Decide the actuator demands and mode for this cycle.
    ///
    /// If there's no perception data yet the state machine is bypassed and the rover is commanded
    /// to drive straight ahead with the set throttle, leaving the mode unchanged.
    ///
    /// The snapshot is expected to have passed [`RoverState::validate`].
    pub fn decide<T>(&self, mut state: RoverState, timer: &mut T) -> RoverState
    where
        T: ActionTimer + ?Sized,
    {
        if state.nav_angles.is_none() {
            trace!("No perception data, driving straight ahead");
            state.throttle = self.params.throttle_set;
            state.steer = 0.0;
            state.brake = 0.0;
            return state;
        }

        match state.mode {
            Mode::Forward => self.step_forward(&mut state, timer),
            Mode::Stop => self.step_stop(&mut state),
            Mode::Stuck => self.step_stuck(&mut state),
            Mode::Reverse => self.step_reverse(&mut state, timer),
        }

        trace!(
            "Decision: {} throttle {:.3} steer {:.2} brake {:.3}",
            state.mode,
            state.throttle,
            state.steer,
            state.brake
        );

        state
    }
}
