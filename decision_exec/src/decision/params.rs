//! Parameters structure for the decision engine

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::MAX_STEER_DEG;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the decision engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionParams {

    // ---- ACTUATION ----

    /// Throttle demanded when driving forward below the maximum velocity.
    pub throttle_set: f64,

    /// Brake demanded when stopping.
    pub brake_set: f64,

    /// Velocity above which the rover coasts rather than applying throttle.
    ///
    /// Units: meters/second
    pub max_vel: f64,

    // ---- TERRAIN DENSITY ----

    /// Minimum number of navigable terrain angles required to stay in `Forward`.
    pub stop_forward: usize,

    /// Minimum number of navigable terrain angles required to leave `Stop` for `Forward`.
    pub go_forward: usize,

    // ---- RECOVERY ----

    /// Time the rover may be stalled before being declared `Stuck`, and the minimum time spent
    /// reversing out of a stall.
    ///
    /// Units: seconds
    pub action_timeout_s: f64,

    /// Direction to turn in place while stopped without enough navigable terrain.
    #[serde(default)]
    pub stop_turn_dir: TurnDirection,

    /// Direction to turn in place after reversing out of a stall.
    #[serde(default)]
    pub recovery_turn_dir: TurnDirection,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Direction of a turn in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DecisionParams {
    fn default() -> Self {
        Self {
            throttle_set: 0.2,
            brake_set: 10.0,
            max_vel: 2.0,
            stop_forward: 50,
            go_forward: 500,
            action_timeout_s: 5.0,
            stop_turn_dir: TurnDirection::default(),
            recovery_turn_dir: TurnDirection::default(),
        }
    }
}

impl Default for TurnDirection {
    fn default() -> Self {
        TurnDirection::Right
    }
}

impl TurnDirection {
    /// The steering demand which produces this turn, positive steer turns left.
    ///
    /// Units: degrees
    pub fn steer_deg(&self) -> f64 {
        match self {
            TurnDirection::Left => MAX_STEER_DEG,
            TurnDirection::Right => -MAX_STEER_DEG,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_params() {
        let params: DecisionParams = util::params::parse(
            r#"
            throttle_set = 0.3
            brake_set = 8.0
            max_vel = 1.5
            stop_forward = 40
            go_forward = 400
            action_timeout_s = 3.0
            recovery_turn_dir = "Left"
            "#,
        )
        .unwrap();

        assert_eq!(params.throttle_set, 0.3);
        assert_eq!(params.stop_forward, 40);
        assert_eq!(params.go_forward, 400);
        assert_eq!(params.stop_turn_dir, TurnDirection::Right);
        assert_eq!(params.recovery_turn_dir, TurnDirection::Left);
    }

    #[test]
    fn test_turn_direction_steer() {
        assert_eq!(TurnDirection::Right.steer_deg(), -15.0);
        assert_eq!(TurnDirection::Left.steer_deg(), 15.0);
        assert_eq!(TurnDirection::default(), TurnDirection::Right);
    }
}
