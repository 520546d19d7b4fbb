//! `Forward` mode handler

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{ActionTimer, DecisionEngine, Mode, RoverState};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionEngine {
    /// Step the `Forward` mode.
    ///
    /// Rules are checked in order and the first match wins:
    /// 1. A stall (set throttle but no velocity) starts the timer. Until it times out the
    ///    snapshot is left as it is, once it has the rover is `Stuck`.
    /// 2. Near a sample, brake.
    /// 3. Not enough navigable terrain, brake.
    /// 4. Below the maximum velocity, drive with the set throttle.
    /// 5. Otherwise coast.
    pub(crate) fn step_forward<T>(&self, state: &mut RoverState, timer: &mut T)
    where
        T: ActionTimer + ?Sized,
    {
        let stalled = state.throttle == self.params.throttle_set && state.vel == 0.0;

        if stalled {
            timer.start();

            if timer.timeout() {
                info!(
                    "Rover stalled for more than {} s, declaring stuck",
                    self.params.action_timeout_s
                );
                state.mode = Mode::Stuck;
            }
        } else if state.near_sample {
            self.apply_brake(state);
        } else if state.nav_count() < self.params.stop_forward {
            self.apply_brake(state);
        } else if state.vel < self.params.max_vel {
            self.advance(state, self.params.throttle_set);
        } else {
            self.advance(state, 0.0);
        }
    }
}
