//! `Stuck` mode handler

use super::{DecisionEngine, RoverState, REVERSE_THROTTLE};

impl DecisionEngine {
    /// Step the `Stuck` mode, which always commands reverse and so always moves into `Reverse`.
    pub(crate) fn step_stuck(&self, state: &mut RoverState) {
        self.advance(state, REVERSE_THROTTLE);
    }
}
