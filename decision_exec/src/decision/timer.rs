//! # Action timer
//!
//! The engine measures the stall and recovery intervals with an [`ActionTimer`]. The timer is
//! owned by the caller and handed to the engine each cycle, so the engine itself holds no state
//! between cycles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::Cell, rc::Rc};

use util::session;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Timer interface consumed by the decision engine.
pub trait ActionTimer {
    /// Begin timing if the timer is not already running, otherwise do nothing.
    fn start(&mut self);

    /// Returns true once the timer's duration has elapsed since it was started.
    ///
    /// Does not reset the timer.
    fn timeout(&self) -> bool;

    /// Stop the timer, the next call to `start` begins a new interval.
    fn reset(&mut self);

    /// Returns true if the timer has been started and not reset since.
    fn is_running(&self) -> bool;
}

/// Source of time for a [`Timer`].
pub trait Clock {
    /// Current time in seconds.
    fn now_s(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A timer measuring a fixed duration from the first `start` call.
#[derive(Debug, Clone)]
pub struct Timer<C: Clock = SessionClock> {
    /// Duration after which the timer times out.
    ///
    /// Units: seconds
    duration_s: f64,

    /// Time at which the timer was started, `None` if not running.
    start_time_s: Option<f64>,

    clock: C,
}

/// Clock reading the time since the start of the session.
///
/// Reads zero before the session has been created.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionClock;

/// Manually driven clock, for replaying recorded data and for tests.
///
/// Clones share the same time, so one handle can be given to a timer while another advances it.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<f64>>);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<C: Clock> Timer<C> {
    /// Create a new stopped timer with the given duration.
    pub fn new(duration_s: f64, clock: C) -> Self {
        Self {
            duration_s,
            start_time_s: None,
            clock,
        }
    }

    /// Seconds elapsed since the timer was started, or `None` if not running.
    pub fn elapsed_s(&self) -> Option<f64> {
        self.start_time_s.map(|t| self.clock.now_s() - t)
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Change the timer's duration, stopping the timer.
    pub fn set_duration_s(&mut self, duration_s: f64) {
        self.duration_s = duration_s;
        self.start_time_s = None;
    }
}

impl<C: Clock> ActionTimer for Timer<C> {
    fn start(&mut self) {
        if self.start_time_s.is_none() {
            self.start_time_s = Some(self.clock.now_s());
        }
    }

    fn timeout(&self) -> bool {
        match self.elapsed_s() {
            Some(e) => e >= self.duration_s,
            None => false,
        }
    }

    fn reset(&mut self) {
        self.start_time_s = None;
    }

    fn is_running(&self) -> bool {
        self.start_time_s.is_some()
    }
}

impl Clock for SessionClock {
    fn now_s(&self) -> f64 {
        session::try_get_elapsed_seconds().unwrap_or(0.0)
    }
}

impl SimClock {
    pub fn new(time_s: f64) -> Self {
        Self(Rc::new(Cell::new(time_s)))
    }

    /// Set the current time.
    pub fn set(&self, time_s: f64) {
        self.0.set(time_s)
    }

    /// Move the current time forward.
    pub fn advance(&self, dt_s: f64) {
        self.0.set(self.0.get() + dt_s)
    }
}

impl Clock for SimClock {
    fn now_s(&self) -> f64 {
        self.0.get()
    }
}
