//! # Decision Executable Parameters
//!
//! This module provide parameters for the decision executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Write the DecisionCtrl output and status report archives each cycle.
    #[serde(default)]
    pub archive: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExecParamsError {
    #[error("The cycle period must be a positive number of seconds, found {0}")]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionExecParams {
    /// Check the parameters can drive the main loop.
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        if self.cycle_period_s > 0.0 && self.cycle_period_s.is_finite() {
            Ok(())
        } else {
            Err(ExecParamsError::InvalidCyclePeriod(self.cycle_period_s))
        }
    }

    /// Number of cycles per second
    pub fn cycle_frequency_hz(&self) -> f64 {
        1.0 / self.cycle_period_s
    }
}
