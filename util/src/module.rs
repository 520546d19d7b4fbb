//! Cyclic module interface
//!
//! Every module driven by an exec's main loop implements [`State`]. The exec calls `init` once
//! with the session, then `proc` once per cycle, and `make_safe` whenever it loses confidence in
//! the module's inputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module run cyclically by an exec.
pub trait State {
    /// Passed to `init`, usually the module's parameter file.
    type InitData;
    type InitError;

    /// New data for one cycle.
    type InputData;

    /// Demands produced by one cycle, also returned by `make_safe`.
    type OutputData;

    /// Flags describing what happened during one cycle, archived alongside the output.
    type StatusReport;

    /// Error returned by `proc`. The module's held state must be unchanged when it is returned.
    type ProcError;

    /// Load parameters and open the module's archives in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Put the module into its safe configuration and return the demands that achieve it.
    ///
    /// The next successful `proc` continues from the safe configuration.
    fn make_safe(&mut self) -> Self::OutputData;
}
