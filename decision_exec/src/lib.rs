//! # Rover decision library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the decision exec crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - global data for the executable
pub mod data_store;

/// Decision module - chooses the rover's mode and actuator demands from perception and telemetry
pub mod decision;

/// Executable parameters
pub mod params;

/// Telemetry script interpreter - replays recorded perception and telemetry frames
pub mod telem_script;
