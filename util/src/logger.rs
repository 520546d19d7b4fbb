//! Session logger
//!
//! Log records go to two places: the terminal and the session's log file. The file receives
//! everything down to the requested level. The terminal is kept readable at cycle rate by
//! capping the targets which log every cycle (see [`PER_CYCLE_TARGETS`]) at `INFO`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Log targets which emit records every cycle, kept out of the terminal below `INFO`.
pub const PER_CYCLE_TARGETS: &[&str] = &[
    "decision_lib::decision::engine",
    "decision_lib::decision::state",
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Logging cannot be turned off, the session log would be empty")]
    LoggingOff,

    #[error("Error opening the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution, must be called once after the session is created.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level == LevelFilter::Off {
        return Err(LoggerInitError::LoggingOff);
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let mut terminal = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(elapsed_s(), record.level(), record.target(), message)
            ))
        })
        .level(min_level)
        .chain(std::io::stdout());

    for target in PER_CYCLE_TARGETS {
        terminal = terminal.level_for(*target, min_level.min(LevelFilter::Info));
    }

    // No colour codes in the file
    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {:5}] {}: {}",
                elapsed_s(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(min_level)
        .chain(log_file);

    fern::Dispatch::new()
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Format one terminal log line.
///
/// The target is only shown for `DEBUG` and `TRACE` records.
pub fn format_line(
    time_s: f64,
    level: Level,
    target: &str,
    message: &std::fmt::Arguments,
) -> String {
    if level > Level::Info {
        format!("[{:10.6} {}] {}: {}", time_s, level_tag(level), target, message)
    } else {
        format!("[{:10.6} {}] {}", time_s, level_tag(level), message)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Session time, zero if the logger is used before the session epoch is set.
fn elapsed_s() -> f64 {
    session::try_get_elapsed_seconds().unwrap_or(0.0)
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_line() {
        colored::control::set_override(false);

        assert_eq!(
            format_line(1.5, Level::Info, "decision_lib::main", &format_args!("Mode {}", 2)),
            "[  1.500000 INF] Mode 2"
        );
        assert_eq!(
            format_line(0.25, Level::Trace, "decision_lib::decision::engine", &format_args!("x")),
            "[  0.250000 TRC] decision_lib::decision::engine: x"
        );
    }
}
