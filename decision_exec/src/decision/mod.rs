//! # Decision module
//!
//! This module implements the rover's decision engine, which converts the perception output
//! (navigable terrain angles and weights) and the vehicle telemetry into the next actuator command
//! (throttle, steer, brake) and the rover's behavioural mode.
//!
//! The engine is a state machine with the following modes:
//!
//! - `Forward` - Driving towards the mean navigable terrain direction.
//! - `Stop` - Braking, turning in place to find terrain, or waiting for a sample pickup.
//! - `Stuck` - The rover has stalled for longer than the action timeout, reverse is commanded.
//! - `Reverse` - Backing out of a stall, followed by a turn in place back into `Forward`.
//!
//! Each mode has its own handler, defined in the `mode_*` files. Steering is computed by the pure
//! functions in [`steering`], and the stall and recovery intervals are measured with an
//! [`ActionTimer`] owned by the caller.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod actions;
mod engine;
mod mode_forward;
mod mode_reverse;
mod mode_stop;
mod mode_stuck;
mod params;
mod snapshot;
mod state;
pub mod steering;
pub mod timer;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use engine::DecisionEngine;
pub use params::{DecisionParams, TurnDirection};
pub use snapshot::{Mode, PerceptionFault, RoverState, TelemFrame};
pub use state::{DecisionCtrl, InputData, OutputData, StatusReport};
pub use timer::{ActionTimer, Clock, SessionClock, SimClock, Timer};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum absolute steering demand.
///
/// Units: degrees
pub const MAX_STEER_DEG: f64 = 15.0;

/// Steering demand used when there is no navigable terrain to steer towards.
///
/// Units: degrees
pub const EMPTY_TERRAIN_STEER_DEG: f64 = -15.0;

/// Velocity above which a rover in `Stop` keeps braking.
///
/// Units: meters/second
pub const STOP_MAX_VEL_MS: f64 = 0.2;

/// Velocity below which the rover is considered to be backing out of a stall.
///
/// Units: meters/second
pub const REVERSE_MIN_VEL_MS: f64 = -0.1;

/// Throttle demanded while reversing.
pub const REVERSE_THROTTLE: f64 = -1.0;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the decision module.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("Invalid perception input: {0}")]
    InvalidPerceptionInput(PerceptionFault),

    #[error("Failed to load DecisionParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not initialise the decision archives: {0}")]
    ArchiveInitError(util::archive::ArchiveError),
}

impl From<PerceptionFault> for DecisionError {
    fn from(fault: PerceptionFault) -> Self {
        DecisionError::InvalidPerceptionInput(fault)
    }
}
