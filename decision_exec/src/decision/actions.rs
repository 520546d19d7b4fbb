//! Actuator actions shared between the mode handlers

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{steering, DecisionEngine, Mode, RoverState, TurnDirection};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionEngine {
    /// Hit the brakes, straighten the wheels, and go into `Stop`.
    pub(crate) fn apply_brake(&self, state: &mut RoverState) {
        state.throttle = 0.0;
        state.brake = self.params.brake_set;
        state.steer = 0.0;
        state.mode = Mode::Stop;
    }

    /// Turn in place in the given direction. The mode is not changed.
    ///
    /// The brake is released so that the wheels can turn, with zero throttle the full steer
    /// demand produces a four wheel turn.
    pub(crate) fn rotate_in_place(&self, state: &mut RoverState, dir: TurnDirection) {
        state.throttle = 0.0;
        state.brake = 0.0;
        state.steer = dir.steer_deg();
    }

    /// Drive with the given throttle, steering towards the navigable terrain.
    ///
    /// A negative throttle reverses, which puts the rover in `Reverse` and steers with the
    /// unweighted mean of the terrain angles.
    pub(crate) fn advance(&self, state: &mut RoverState, throttle: f64) {
        state.throttle = throttle;
        state.brake = 0.0;
        state.mode = Mode::Forward;
        state.steer =
            steering::terrain_steer_deg(state.nav_angles.as_ref(), state.nav_weights.as_ref());

        if throttle < 0.0 {
            state.mode = Mode::Reverse;
            state.steer = steering::reverse_steer_deg(state.nav_angles.as_ref());
        }
    }
}
