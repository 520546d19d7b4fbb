//! `Stop` mode handler

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{DecisionEngine, RoverState, STOP_MAX_VEL_MS};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionEngine {
    /// Step the `Stop` mode.
    ///
    /// A stationary rover next to a sample requests a pickup and holds its actuators. Otherwise
    /// the rover brakes until it has slowed down, then either turns in place looking for terrain
    /// or drives off if there's enough of it.
    pub(crate) fn step_stop(&self, state: &mut RoverState) {
        if state.near_sample && state.vel == 0.0 && !state.picking_up {
            if !state.send_pickup {
                info!("Stopped next to a sample, requesting pickup");
            }
            state.send_pickup = true;
            return;
        }

        if state.vel > STOP_MAX_VEL_MS {
            self.apply_brake(state);
        } else if state.nav_count() < self.params.go_forward {
            self.rotate_in_place(state, self.params.stop_turn_dir);
        } else {
            self.advance(state, self.params.throttle_set);
        }
    }
}
