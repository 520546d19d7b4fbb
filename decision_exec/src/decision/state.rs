//! Implementations for the DecisionCtrl module state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{
    ActionTimer, Clock, DecisionEngine, DecisionError, DecisionParams, Mode, RoverState,
    SessionClock, TelemFrame, Timer,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Decision control module state.
///
/// Owns the snapshot carried between cycles and the action timer, and runs the
/// [`DecisionEngine`] on each new frame of perception and telemetry data.
///
/// The timer is reset whenever the mode changes, and whenever the rover is moving in `Forward`,
/// so that the stall and the reverse recovery are each timed from their own start.
///
/// `send_pickup` is set by the engine and cleared here, once the telemetry shows a pickup has
/// been carried out (`picking_up` going from true to false).
pub struct DecisionCtrl<C: Clock = SessionClock> {
    pub(crate) engine: DecisionEngine,

    pub(crate) timer: Timer<C>,

    pub(crate) snapshot: RoverState,

    /// Value of `picking_up` in the previous cycle.
    prev_picking_up: bool,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Input data to DecisionCtrl.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// New perception and telemetry data, or `None` if nothing new arrived this cycle, in which
    /// case the previous frame is reused.
    pub frame: Option<TelemFrame>,
}

/// Actuator demands produced by DecisionCtrl.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputData {
    pub throttle: f64,

    /// Units: degrees
    pub steer_deg: f64,

    pub brake: f64,

    pub mode: Mode,

    /// Request for the pickup subsystem to collect the nearby sample.
    pub send_pickup: bool,
}

/// Status report for DecisionCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// The mode changed during this cycle.
    pub mode_changed: bool,

    /// A pickup was requested this cycle.
    pub pickup_requested: bool,

    /// A pickup completed this cycle and `send_pickup` was cleared.
    pub pickup_complete: bool,

    /// No perception data was available, the default forward command was issued.
    pub perception_missing: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DecisionCtrl<SessionClock> {
    fn default() -> Self {
        Self::new(DecisionParams::default(), SessionClock)
    }
}

impl<C: Clock> DecisionCtrl<C> {
    /// Create a new module from parameters and a clock, without any archiving.
    pub fn new(params: DecisionParams, clock: C) -> Self {
        Self {
            timer: Timer::new(params.action_timeout_s, clock),
            engine: DecisionEngine::new(params),
            snapshot: RoverState::default(),
            prev_picking_up: false,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: None,
            arch_output: Archiver::default(),
        }
    }

    /// The snapshot as it was left by the last cycle.
    pub fn snapshot(&self) -> &RoverState {
        &self.snapshot
    }

    /// Process one cycle, independently of the module's `State` interface.
    fn step(&mut self, input_data: &InputData) -> Result<(OutputData, StatusReport), DecisionError> {
        // Clear the status report
        self.report = StatusReport::default();

        let mut state = self.snapshot.clone();
        if let Some(ref frame) = input_data.frame {
            frame.apply_to(&mut state);
        }

        // Reject malformed input, the previous snapshot is kept
        state.validate()?;

        // Pickup handshake
        if self.prev_picking_up && !state.picking_up && state.send_pickup {
            info!("Sample pickup complete, clearing pickup request");
            state.send_pickup = false;
            self.report.pickup_complete = true;
        }
        self.prev_picking_up = state.picking_up;

        let prev_mode = state.mode;
        let prev_send_pickup = state.send_pickup;

        let state = self.engine.decide(state, &mut self.timer);

        if state.mode != prev_mode {
            info!("Decision mode change: {} -> {}", prev_mode, state.mode);
            self.report.mode_changed = true;
            self.timer.reset();
        } else if state.mode == Mode::Forward && state.vel != 0.0 && self.timer.is_running() {
            trace!("Rover moving again, resetting stall timer");
            self.timer.reset();
        }

        self.report.pickup_requested = state.send_pickup && !prev_send_pickup;

        if state.nav_angles.is_none() {
            if self.snapshot.nav_angles.is_some() || self.output.is_none() {
                warn!("No perception data available, commanding default forward throttle");
            }
            self.report.perception_missing = true;
        }

        let output = OutputData::from(&state);

        self.snapshot = state;
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl<C: Clock> State for DecisionCtrl<C> {
    type InitData = String;
    type InitError = DecisionError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DecisionError;

    /// Initialise the DecisionCtrl module.
    ///
    /// Expected init data is the path to the parameter file, relative to the params directory.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: DecisionParams =
            params::load(&init_data).map_err(DecisionError::ParamLoadError)?;

        info!(
            "DecisionCtrl params: throttle_set {}, brake_set {}, stop_forward {}, go_forward {}",
            params.throttle_set, params.brake_set, params.stop_forward, params.go_forward
        );

        self.timer.set_duration_s(params.action_timeout_s);
        self.engine = DecisionEngine::new(params);

        self.arch_report = Archiver::from_path(session, "decision/status_report.csv")
            .map_err(DecisionError::ArchiveInitError)?;
        self.arch_output = Archiver::from_path(session, "decision/output.csv")
            .map_err(DecisionError::ArchiveInitError)?;

        Ok(())
    }

    /// Perform cyclic processing of DecisionCtrl.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.step(input_data)
    }

    /// Bring the rover to a stop and hold it in `Stop` mode.
    ///
    /// The braking demand is also kept as the module's latest output.
    fn make_safe(&mut self) -> Self::OutputData {
        let mut state = self.snapshot.clone();
        self.engine.apply_brake(&mut state);
        self.timer.reset();

        let output = OutputData::from(&state);
        self.snapshot = state;
        self.output = Some(output);

        output
    }
}

impl<C: Clock> Archived for DecisionCtrl<C> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        if let Some(output) = self.output {
            self.arch_output.serialise(output)?;
        }

        Ok(())
    }
}

impl From<&RoverState> for OutputData {
    fn from(state: &RoverState) -> Self {
        Self {
            throttle: state.throttle,
            steer_deg: state.steer,
            brake: state.brake,
            mode: state.mode,
            send_pickup: state.send_pickup,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decision::SimClock;

    fn ctrl() -> (SimClock, DecisionCtrl<SimClock>) {
        let clock = SimClock::new(0.0);
        let params = DecisionParams {
            stop_forward: 3,
            go_forward: 5,
            action_timeout_s: 1.0,
            ..Default::default()
        };
        (clock.clone(), DecisionCtrl::new(params, clock))
    }

    fn frame(num: usize, vel: f64) -> InputData {
        InputData {
            frame: Some(TelemFrame {
                nav_angles: Some(vec![0.1; num]),
                nav_weights: Some(vec![1.0; num]),
                vel,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_missing_perception() {
        let (_, mut ctrl) = ctrl();

        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();

        assert!(rpt.perception_missing);
        assert_eq!(out.throttle, 0.2);
        assert_eq!(out.steer_deg, 0.0);
        assert_eq!(out.brake, 0.0);
        assert_eq!(out.mode, Mode::Stop);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let (_, mut ctrl) = ctrl();

        ctrl.proc(&frame(10, 0.0)).unwrap();
        let before = ctrl.snapshot().clone();

        let bad = InputData {
            frame: Some(TelemFrame {
                nav_angles: Some(vec![0.1, 0.2]),
                nav_weights: Some(vec![1.0]),
                vel: 0.0,
                ..Default::default()
            }),
        };

        match ctrl.proc(&bad) {
            Err(DecisionError::InvalidPerceptionInput(_)) => (),
            r => panic!("Expected InvalidPerceptionInput, got {:?}", r),
        }

        assert_eq!(ctrl.snapshot(), &before);
    }

    #[test]
    fn test_frame_reused_when_none_arrives() {
        let (_, mut ctrl) = ctrl();

        let (out, rpt) = ctrl.proc(&frame(10, 0.0)).unwrap();
        assert_eq!(out.mode, Mode::Forward);
        assert!(rpt.mode_changed);

        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.mode, Mode::Forward);
        assert!(!rpt.mode_changed);
        assert!(!rpt.perception_missing);
    }

    #[test]
    fn test_stuck_and_recover() {
        let (clock, mut ctrl) = ctrl();

        // Drive off
        let (out, _) = ctrl.proc(&frame(10, 0.0)).unwrap();
        assert_eq!(out.mode, Mode::Forward);
        assert_eq!(out.throttle, 0.2);

        // Stalled, timer starts
        clock.advance(0.1);
        let (out, _) = ctrl.proc(&frame(10, 0.0)).unwrap();
        assert_eq!(out.mode, Mode::Forward);
        assert!(ctrl.timer.is_running());

        // Stuck after the timeout
        clock.advance(1.5);
        let (out, rpt) = ctrl.proc(&frame(10, 0.0)).unwrap();
        assert_eq!(out.mode, Mode::Stuck);
        assert!(rpt.mode_changed);
        assert!(!ctrl.timer.is_running());

        // Reverse
        clock.advance(0.1);
        let (out, _) = ctrl.proc(&frame(10, 0.0)).unwrap();
        assert_eq!(out.mode, Mode::Reverse);
        assert_eq!(out.throttle, -1.0);

        // Reverse timer runs from the first reverse cycle, so recovery isn't immediate
        clock.advance(0.1);
        let (out, _) = ctrl.proc(&frame(10, -0.5)).unwrap();
        assert_eq!(out.mode, Mode::Reverse);

        clock.advance(1.5);
        let (out, rpt) = ctrl.proc(&frame(10, -0.5)).unwrap();
        assert_eq!(out.mode, Mode::Forward);
        assert_eq!(out.steer_deg, -15.0);
        assert!(rpt.mode_changed);
    }

    #[test]
    fn test_moving_resets_stall_timer() {
        let (clock, mut ctrl) = ctrl();

        ctrl.proc(&frame(10, 0.0)).unwrap();
        ctrl.proc(&frame(10, 0.0)).unwrap();
        assert!(ctrl.timer.is_running());

        // Moving again clears the stall
        clock.advance(0.5);
        ctrl.proc(&frame(10, 0.5)).unwrap();
        assert!(!ctrl.timer.is_running());

        // A later stall is timed from scratch
        clock.advance(5.0);
        let (out, _) = ctrl.proc(&frame(10, 0.0)).unwrap();
        assert_eq!(out.mode, Mode::Forward);
    }

    #[test]
    fn test_pickup_handshake() {
        let (_, mut ctrl) = ctrl();

        let near = |picking_up: bool| InputData {
            frame: Some(TelemFrame {
                nav_angles: Some(vec![0.1; 10]),
                nav_weights: None,
                vel: 0.0,
                near_sample: true,
                picking_up,
            }),
        };

        // Stopped next to a sample
        let (out, rpt) = ctrl.proc(&near(false)).unwrap();
        assert!(out.send_pickup);
        assert!(rpt.pickup_requested);
        assert_eq!(out.mode, Mode::Stop);

        // Pickup in progress, request is held
        let (out, rpt) = ctrl.proc(&near(true)).unwrap();
        assert!(out.send_pickup);
        assert!(!rpt.pickup_requested);

        // Pickup finished, the sample is gone
        let done = InputData {
            frame: Some(TelemFrame {
                nav_angles: Some(vec![0.1; 10]),
                nav_weights: None,
                vel: 0.0,
                near_sample: false,
                picking_up: false,
            }),
        };
        let (out, rpt) = ctrl.proc(&done).unwrap();
        assert!(rpt.pickup_complete);
        assert!(!out.send_pickup);
    }

    #[test]
    fn test_make_safe() {
        let (_, mut ctrl) = ctrl();

        ctrl.proc(&frame(10, 1.0)).unwrap();
        let out = ctrl.make_safe();

        assert_eq!(out.mode, Mode::Stop);
        assert_eq!(out.throttle, 0.0);
        assert_eq!(out.brake, ctrl.engine.params().brake_set);
        assert_eq!(ctrl.snapshot().mode, Mode::Stop);
    }

    #[test]
    fn test_write_without_session() {
        let (_, mut ctrl) = ctrl();

        ctrl.proc(&frame(10, 1.0)).unwrap();
        assert!(ctrl.write().is_ok());
    }
}
