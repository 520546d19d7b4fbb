//! Rover state snapshot passed through the decision engine each cycle

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the rover state for one decision cycle.
///
/// The caller populates the perception and telemetry fields, the engine writes the actuator
/// demands, the mode, and the pickup request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoverState {
    /// Angles of the navigable terrain relative to the rover heading, or `None` if no perception
    /// data has been received yet.
    ///
    /// Units: radians
    pub nav_angles: Option<Array1<f64>>,

    /// Weights of each navigable terrain angle, parallel to `nav_angles`.
    pub nav_weights: Option<Array1<f64>>,

    /// Current velocity, negative when moving backwards.
    ///
    /// Units: meters/second
    pub vel: f64,

    /// Throttle demand.
    pub throttle: f64,

    /// Steering demand, positive to the left.
    ///
    /// Units: degrees
    pub steer: f64,

    /// Brake demand.
    pub brake: f64,

    /// Current mode of the decision state machine.
    pub mode: Mode,

    /// True when the rover is close enough to a sample to stop for it.
    pub near_sample: bool,

    /// True while the pickup subsystem is collecting a sample.
    pub picking_up: bool,

    /// Request for the pickup subsystem to collect the nearby sample.
    ///
    /// Only ever set by the engine, see [`crate::decision::DecisionCtrl`] for when it is cleared.
    pub send_pickup: bool,
}

/// A single frame of perception and telemetry data, as received from the simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemFrame {
    /// Navigable terrain angles in radians, `None` if perception hasn't produced any yet.
    #[serde(default)]
    pub nav_angles: Option<Vec<f64>>,

    /// Weights for each of the navigable terrain angles.
    #[serde(default)]
    pub nav_weights: Option<Vec<f64>>,

    /// Velocity in meters/second.
    pub vel: f64,

    #[serde(default)]
    pub near_sample: bool,

    #[serde(default)]
    pub picking_up: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Modes of the decision state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Forward,
    Stop,
    Stuck,
    Reverse,
}

/// Reasons a perception input can be rejected before it reaches the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PerceptionFault {
    #[error("Navigable terrain weights were provided without any angles")]
    WeightsWithoutAngles,

    #[error("Expected {angles} navigable terrain weights to match the angles, found {weights}")]
    LengthMismatch { angles: usize, weights: usize },

    #[error("Navigable terrain angle {0} is not finite")]
    NonFiniteAngle(usize),

    #[error("Navigable terrain weight {0} is not finite")]
    NonFiniteWeight(usize),

    #[error("Velocity is not finite")]
    NonFiniteVelocity,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Mode {
    fn default() -> Self {
        Mode::Stop
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Forward => write!(f, "Mode::Forward"),
            Mode::Stop => write!(f, "Mode::Stop"),
            Mode::Stuck => write!(f, "Mode::Stuck"),
            Mode::Reverse => write!(f, "Mode::Reverse"),
        }
    }
}

impl RoverState {
    /// Number of navigable terrain angles, zero if there is no perception data.
    pub fn nav_count(&self) -> usize {
        self.nav_angles.as_ref().map_or(0, |a| a.len())
    }

    /// Check the perception and telemetry inputs are well formed.
    ///
    /// Weights must only be present alongside angles of the same length, and all values must be
    /// finite.
    pub fn validate(&self) -> Result<(), PerceptionFault> {
        if !self.vel.is_finite() {
            return Err(PerceptionFault::NonFiniteVelocity);
        }

        let angles = match self.nav_angles {
            Some(ref a) => a,
            None => {
                return match self.nav_weights {
                    Some(_) => Err(PerceptionFault::WeightsWithoutAngles),
                    None => Ok(()),
                }
            }
        };

        if let Some(i) = angles.iter().position(|a| !a.is_finite()) {
            return Err(PerceptionFault::NonFiniteAngle(i));
        }

        if let Some(ref weights) = self.nav_weights {
            if weights.len() != angles.len() {
                return Err(PerceptionFault::LengthMismatch {
                    angles: angles.len(),
                    weights: weights.len(),
                });
            }

            if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
                return Err(PerceptionFault::NonFiniteWeight(i));
            }
        }

        Ok(())
    }
}

impl TelemFrame {
    /// Overwrite the perception and telemetry fields of the state with the contents of this
    /// frame. Actuator demands, the mode, and the pickup request are left untouched.
    pub fn apply_to(&self, state: &mut RoverState) {
        state.nav_angles = self.nav_angles.clone().map(Array1::from);
        state.nav_weights = self.nav_weights.clone().map(Array1::from);
        state.vel = self.vel;
        state.near_sample = self.near_sample;
        state.picking_up = self.picking_up;
    }
}
