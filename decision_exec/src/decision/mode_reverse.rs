//! `Reverse` mode handler

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{ActionTimer, DecisionEngine, Mode, RoverState, REVERSE_MIN_VEL_MS, REVERSE_THROTTLE};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionEngine {
    /// Step the `Reverse` mode.
    ///
    /// The rover keeps reversing until it is actually moving backwards and the timer has run out,
    /// then it turns towards the recovery heading and goes back to `Forward`.
    pub(crate) fn step_reverse<T>(&self, state: &mut RoverState, timer: &mut T)
    where
        T: ActionTimer + ?Sized,
    {
        timer.start();

        if state.vel < REVERSE_MIN_VEL_MS && timer.timeout() {
            info!("Reversed out of stall, turning {:?}", self.params.recovery_turn_dir);
            self.rotate_in_place(state, self.params.recovery_turn_dir);
            state.mode = Mode::Forward;
        } else {
            self.advance(state, REVERSE_THROTTLE);
        }
    }
}
