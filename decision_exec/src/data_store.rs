//! # Data Store

use log::{error, info, warn};
use util::module::State;

use crate::decision::{DecisionCtrl, DecisionError, InputData, OutputData, StatusReport};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive rejected frames after which the rover is made safe.
pub const MAX_CONSEC_REJECTED_FRAMES: u64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the rover is in safe mode.
    pub safe: bool,

    // DecisionCtrl
    pub decision: DecisionCtrl,
    pub decision_input: InputData,
    pub decision_output: Option<OutputData>,
    pub decision_status_rpt: StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of frames rejected by DecisionCtrl
    pub num_rejected_frames: u64,

    /// Number of new frames rejected since the last accepted one
    pub num_consec_rejected_frames: u64,

    /// Number of pickups requested
    pub num_pickups_requested: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the rover into safe mode, braking to a stop.
    pub fn make_safe(&mut self) {
        if !self.safe {
            warn!("Make safe requested, braking");
            self.safe = true;
        }

        self.decision_output = Some(self.decision.make_safe());
    }

    /// Leave safe mode, normal decisions are taken from the next cycle.
    pub fn make_unsafe(&mut self) {
        if self.safe {
            warn!("Safe mode disabled");
            self.safe = false;
        }
    }

    /// Run DecisionCtrl on this cycle's input.
    ///
    /// While in safe mode the braking demand is held until a new frame arrives. Rejected frames
    /// are counted and make the rover safe once too many new frames in a row have been rejected,
    /// any other error is returned.
    pub fn proc_decision(&mut self) -> Result<(), DecisionError> {
        let new_frame = self.decision_input.frame.is_some();

        if self.safe && !new_frame {
            self.decision_output = self.decision.output;
            return Ok(());
        }

        match self.decision.proc(&self.decision_input) {
            Ok((o, r)) => {
                // Reprocessing the held snapshot says nothing about the perception input
                if new_frame {
                    self.num_consec_rejected_frames = 0;
                    self.make_unsafe();
                }

                if r.pickup_requested {
                    self.num_pickups_requested += 1;
                    info!("Pickup requested ({} so far)", self.num_pickups_requested);
                }

                self.decision_output = Some(o);
                self.decision_status_rpt = r;
                Ok(())
            }
            Err(DecisionError::InvalidPerceptionInput(fault)) => {
                warn!("Rejected perception frame: {}", fault);
                self.num_rejected_frames += 1;
                self.num_consec_rejected_frames += 1;

                if self.num_consec_rejected_frames > MAX_CONSEC_REJECTED_FRAMES {
                    if !self.safe {
                        error!(
                            "More than {} consecutive perception frames rejected",
                            MAX_CONSEC_REJECTED_FRAMES
                        );
                    }
                    self.make_safe();
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_second = (cycle_frequency_hz as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_second == 0;

        self.decision_input = InputData::default();
        self.decision_output = None;
        self.decision_status_rpt = StatusReport::default();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decision::{Mode, TelemFrame};

    fn good_frame() -> InputData {
        InputData {
            frame: Some(TelemFrame {
                nav_angles: Some(vec![0.0; 600]),
                vel: 0.0,
                ..Default::default()
            }),
        }
    }

    fn bad_frame() -> InputData {
        InputData {
            frame: Some(TelemFrame {
                nav_angles: Some(vec![0.0, 0.1]),
                nav_weights: Some(vec![1.0]),
                vel: 0.0,
                ..Default::default()
            }),
        }
    }

    /// Run one cycle, `input` being `None` when no frame arrived.
    fn run_cycle(ds: &mut DataStore, input: Option<InputData>) {
        ds.cycle_start(10.0);
        if let Some(i) = input {
            ds.decision_input = i;
        }
        ds.proc_decision().unwrap();
        ds.cycle_end();
    }

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::default();

        ds.cycle_start(10.0);
        assert!(ds.is_1_hz_cycle);

        for _ in 0..3 {
            ds.cycle_end();
        }
        ds.cycle_start(10.0);
        assert!(!ds.is_1_hz_cycle);

        // Frequencies below 1 Hz make every cycle a 1 Hz cycle
        ds.cycle_start(0.5);
        assert!(ds.is_1_hz_cycle);
    }

    #[test]
    fn test_make_safe() {
        let mut ds = DataStore::default();

        ds.decision_input.frame = Some(TelemFrame {
            nav_angles: Some(vec![0.0; 600]),
            vel: 0.0,
            ..Default::default()
        });
        let (o, _) = ds.decision.proc(&ds.decision_input).unwrap();
        assert_eq!(o.mode, Mode::Forward);

        ds.make_safe();
        assert!(ds.safe);

        let o = ds.decision_output.unwrap();
        assert_eq!(o.mode, Mode::Stop);
        assert_eq!(o.throttle, 0.0);
        assert!(o.brake > 0.0);

        ds.make_unsafe();
        assert!(!ds.safe);
    }

    #[test]
    fn test_rejections_counted_across_empty_cycles() {
        let mut ds = DataStore::default();

        run_cycle(&mut ds, Some(good_frame()));

        // Frames arrive slower than the cycle rate, the empty cycles in between must not clear
        // the rejection count
        for _ in 0..MAX_CONSEC_REJECTED_FRAMES {
            run_cycle(&mut ds, Some(bad_frame()));
            run_cycle(&mut ds, None);
            run_cycle(&mut ds, None);
            assert!(!ds.safe);
        }

        run_cycle(&mut ds, Some(bad_frame()));
        assert!(ds.safe);
        assert_eq!(ds.num_rejected_frames, MAX_CONSEC_REJECTED_FRAMES + 1);

        // Still safe, and still braking, while no new frame arrives
        run_cycle(&mut ds, None);
        assert!(ds.safe);
        assert_eq!(ds.decision.snapshot().mode, Mode::Stop);
        assert_eq!(ds.decision_output.map(|o| o.throttle), Some(0.0));

        // A new valid frame clears the count and leaves safe mode
        run_cycle(&mut ds, Some(good_frame()));
        assert!(!ds.safe);
        assert_eq!(ds.num_consec_rejected_frames, 0);
    }

    #[test]
    fn test_accepted_frame_resets_rejections() {
        let mut ds = DataStore::default();

        for _ in 0..MAX_CONSEC_REJECTED_FRAMES {
            run_cycle(&mut ds, Some(bad_frame()));
        }
        run_cycle(&mut ds, Some(good_frame()));
        run_cycle(&mut ds, Some(bad_frame()));

        assert!(!ds.safe);
        assert_eq!(ds.num_consec_rejected_frames, 1);
        assert_eq!(ds.num_rejected_frames, MAX_CONSEC_REJECTED_FRAMES + 1);
    }
}
