//! Decision executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise session, logging, and the DecisionCtrl module
//!     - Load the telemetry script to replay
//!     - Main loop:
//!         - Perception and telemetry acquisition from the script
//!         - Decision processing
//!         - Archiving
//!         - Cycle management
//!
//! # Usage
//!
//! `decision_exec <script> [decision_params]` where `<script>` is the path to a telemetry script,
//! see `decision_lib::telem_script` for the format. `[decision_params]` is the DecisionCtrl
//! parameter file relative to the params directory, `decision.toml` if not given.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use decision_lib::{
    data_store::DataStore,
    params::DecisionExecParams,
    telem_script::{PendingFrames, TelemScript},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// DecisionCtrl parameter file used if none is given on the command line.
const DEFAULT_DECISION_PARAMS: &str = "decision.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("decision_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Rover Decision Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: DecisionExecParams = util::params::load("decision_exec.toml")
        .wrap_err("Could not load decision exec params")?;

    exec_params.validate().wrap_err("Invalid decision exec params")?;

    info!("Exec parameters loaded");

    // ---- LOAD SCRIPT ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let (script_path, decision_params_path) = parse_args(&args)?;

    info!("Loading telemetry script from \"{}\"", script_path);

    let mut script = TelemScript::new(script_path).wrap_err("Failed to load telemetry script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} frames\n",
        script.get_duration(),
        script.get_num_frames()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.decision
        .init(decision_params_path.to_string(), &session)
        .wrap_err("Failed to initialise DecisionCtrl")?;
    info!("DecisionCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_frequency_hz());

        // ---- DATA INPUT ----

        match script.get_pending_frames(session::get_elapsed_seconds()) {
            PendingFrames::None => (),
            PendingFrames::Some(mut frames) => {
                if frames.len() > 1 {
                    debug!("{} frames arrived this cycle, using the latest", frames.len());
                }
                ds.decision_input.frame = frames.pop();
            }
            PendingFrames::EndOfScript => {
                info!("End of telemetry script reached, stopping");
                break;
            }
        }

        // ---- DECISION PROCESSING ----

        ds.proc_decision()
            .wrap_err("An error occured during decision processing")?;

        if ds.is_1_hz_cycle {
            if let Some(o) = ds.decision_output {
                info!(
                    "{}: throttle {:.2}, steer {:.2} deg, brake {:.2}",
                    o.mode, o.throttle, o.steer_deg, o.brake
                );
            }
        }

        // ---- WRITE ARCHIVES ----

        if exec_params.archive {
            if let Err(e) = ds.decision.write() {
                warn!("Could not write DecisionCtrl archives: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!(
        "Executed {} cycles, {} pickups requested, {} frames rejected",
        ds.num_cycles, ds.num_pickups_requested, ds.num_rejected_frames
    );
    info!("End of execution");

    session.exit();

    Ok(())
}

/// Get the telemetry script path and the DecisionCtrl params file from the command line
/// arguments.
fn parse_args(args: &[String]) -> Result<(&str, &str), Report> {
    match args {
        [_, script] => Ok((script.as_str(), DEFAULT_DECISION_PARAMS)),
        [_, script, params] => Ok((script.as_str(), params.as_str())),
        _ => Err(eyre!(
            "Expected a telemetry script path and optionally a params file, found {} arguments",
            args.len().saturating_sub(1)
        )),
    }
}
