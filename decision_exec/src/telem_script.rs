//! # Telemetry script interpreter
//!
//! Replays recorded perception and telemetry frames into the decision exec. A script is a list of
//! timestamped frames, one per entry, in the form:
//!
//! ```text
//! 0.0: {"nav_angles": [0.1, 0.2], "nav_weights": [1.0, 0.5], "vel": 0.0};
//! 0.5: {"nav_angles": [0.1, 0.2], "vel": 0.3, "near_sample": false};
//! ```
//!
//! The payload of each entry is a JSON [`TelemFrame`]. Lines which aren't entries, such as `#`
//! comments, are ignored.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::decision::TelemFrame;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A frame which is scripted to arrive at a specific time.
struct ScriptedFrame {
    /// The time the frame arrives at
    arrival_time_s: f64,

    frame: TelemFrame,
}

/// A telemetry script interpreter.
///
/// After loading the script use [`TelemScript::get_pending_frames`] each cycle to acquire the
/// frames which have arrived.
pub struct TelemScript {
    script_path: Option<PathBuf>,
    frames: VecDeque<ScriptedFrame>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TelemScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script timestamps must be increasing, found {1} s after {0} s")]
    TimestampsNotIncreasing(f64, f64),

    #[error("Script contains an invalid frame at {0} s: {1}")]
    InvalidFrame(f64, serde_json::Error),

    #[error("Could not build the script parser: {0}")]
    ParserError(regex::Error),
}

pub enum PendingFrames {
    None,
    Some(Vec<TelemFrame>),
    EndOfScript,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TelemScript {
    /// Load a script from the given path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, TelemScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(TelemScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(TelemScriptError::ScriptLoadError)?;

        let mut interp = Self::parse(&script)?;
        interp.script_path = Some(path);

        Ok(interp)
    }

    /// Parse a script from a string.
    pub fn parse(script: &str) -> Result<Self, TelemScriptError> {
        let mut frames: VecDeque<ScriptedFrame> = VecDeque::new();

        // Each entry is `<time>: <json>;`
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(TelemScriptError::ParserError)?;

        for cap in re.captures_iter(script) {
            let arrival_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| TelemScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = frames.back() {
                if arrival_time_s < last.arrival_time_s {
                    return Err(TelemScriptError::TimestampsNotIncreasing(
                        last.arrival_time_s,
                        arrival_time_s,
                    ));
                }
            }

            let frame: TelemFrame = serde_json::from_str(&cap[3])
                .map_err(|e| TelemScriptError::InvalidFrame(arrival_time_s, e))?;

            frames.push_back(ScriptedFrame {
                arrival_time_s,
                frame,
            });
        }

        if frames.is_empty() {
            return Err(TelemScriptError::ScriptEmpty);
        }

        Ok(Self {
            script_path: None,
            frames,
        })
    }

    /// Return all frames which have arrived by the given time.
    pub fn get_pending_frames(&mut self, current_time_s: f64) -> PendingFrames {
        if self.frames.is_empty() {
            return PendingFrames::EndOfScript;
        }

        let mut pending = vec![];

        while let Some(f) = self.frames.front() {
            if f.arrival_time_s > current_time_s {
                break;
            }

            if let Some(f) = self.frames.pop_front() {
                pending.push(f.frame);
            }
        }

        if pending.is_empty() {
            PendingFrames::None
        } else {
            PendingFrames::Some(pending)
        }
    }

    /// Path the script was loaded from, if it was loaded from a file.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }

    /// Get the number of frames remaining in the script
    pub fn get_num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.frames.back() {
            Some(f) => f.arrival_time_s,
            None => 0f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decision::{DecisionCtrl, DecisionParams, InputData, Mode, SimClock};
    use util::module::State;

    const SCRIPT: &str = r#"
        0.0: {"nav_angles": [0.1, 0.2], "nav_weights": [1.0, 0.5], "vel": 0.0};
        0.5: {"nav_angles": [0.1, 0.2], "vel": 0.3, "near_sample": true};
        0.5: {"vel": 0.4};
        2.0: {"nav_angles": [], "vel": -0.2, "picking_up": true};
    "#;

    #[test]
    fn test_parse() {
        let script = TelemScript::parse(SCRIPT).unwrap();

        assert_eq!(script.get_num_frames(), 4);
        assert_eq!(script.get_duration(), 2.0);
        assert!(script.script_path().is_none());
    }

    #[test]
    fn test_pending_frames() {
        let mut script = TelemScript::parse(SCRIPT).unwrap();

        match script.get_pending_frames(0.1) {
            PendingFrames::Some(f) => {
                assert_eq!(f.len(), 1);
                assert_eq!(f[0].nav_weights, Some(vec![1.0, 0.5]));
            }
            _ => panic!("Expected one frame"),
        }

        assert!(matches!(script.get_pending_frames(0.2), PendingFrames::None));

        match script.get_pending_frames(1.0) {
            PendingFrames::Some(f) => {
                assert_eq!(f.len(), 2);
                assert!(f[0].near_sample);
                assert_eq!(f[1].nav_angles, None);
                assert_eq!(f[1].vel, 0.4);
            }
            _ => panic!("Expected two frames"),
        }

        match script.get_pending_frames(2.0) {
            PendingFrames::Some(f) => {
                assert_eq!(f[0].nav_angles, Some(vec![]));
                assert!(f[0].picking_up);
            }
            _ => panic!("Expected one frame"),
        }

        assert!(matches!(script.get_pending_frames(3.0), PendingFrames::EndOfScript));
    }

    #[test]
    fn test_invalid_scripts() {
        assert!(matches!(
            TelemScript::parse("nothing to see here"),
            Err(TelemScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            TelemScript::parse("1.0: {\"vel\": \"fast\"};"),
            Err(TelemScriptError::InvalidFrame(_, _))
        ));
        assert!(matches!(
            TelemScript::parse("1.0: {\"vel\": 0.0};\n0.5: {\"vel\": 0.0};"),
            Err(TelemScriptError::TimestampsNotIncreasing(_, _))
        ));
        assert!(matches!(
            TelemScript::new("no/such/script.telem"),
            Err(TelemScriptError::ScriptNotFound(_))
        ));
    }

    #[test]
    fn test_comments_ignored() {
        let script = TelemScript::parse("# header\n0.0: {\"vel\": 0.0};\n# 1.0 s in\n").unwrap();

        assert_eq!(script.get_num_frames(), 1);
    }

    #[test]
    fn test_stall_recovery_script() {
        let mut script =
            TelemScript::parse(include_str!("../../scripts/stall_recovery.telem")).unwrap();
        let params: DecisionParams =
            util::params::parse(include_str!("../../params/decision_sparse.toml")).unwrap();

        let clock = SimClock::new(0.0);
        let mut ctrl = DecisionCtrl::new(params, clock.clone());

        // Replay at 10 Hz, recording each mode the rover passes through
        let mut modes: Vec<Mode> = vec![];
        for cycle in 0..200 {
            let time_s = cycle as f64 * 0.1;
            clock.set(time_s);

            let frame = match script.get_pending_frames(time_s) {
                PendingFrames::None => None,
                PendingFrames::Some(mut frames) => frames.pop(),
                PendingFrames::EndOfScript => break,
            };

            let (out, _) = ctrl.proc(&InputData { frame }).unwrap();
            if modes.last() != Some(&out.mode) {
                modes.push(out.mode);
            }
        }

        assert_eq!(
            modes,
            vec![Mode::Stop, Mode::Forward, Mode::Stuck, Mode::Reverse, Mode::Forward]
        );
        assert!(script.get_num_frames() == 0);
    }
}
