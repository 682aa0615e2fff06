//! Simulation clock.
//!
//! The engine owns no timers. An external frame driver (a vsync callback, a
//! game loop, a test) calls [`SimulationClock::tick`] with its own monotonic
//! timestamp and gets back the delta to simulate, or `None` while stopped.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use scenefx::time::SimulationClock;
//!
//! let mut clock = SimulationClock::new();
//! assert_eq!(clock.tick(Duration::from_millis(0)), None);
//!
//! clock.start();
//! // The first tick after start is the reference point.
//! assert_eq!(clock.tick(Duration::from_millis(100)), Some(0.0));
//! let dt = clock.tick(Duration::from_millis(116)).unwrap();
//! assert!((dt - 0.016).abs() < 1e-6);
//! ```

use std::time::Duration;

/// Longest delta a single tick may produce by default, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.25;

/// Running state of a [`SimulationClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    /// `last` is the timestamp of the previous tick, `None` until the first
    /// tick after `start`.
    Running { last: Option<Duration> },
}

/// Elapsed-time bookkeeping and start/stop lifecycle.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: ClockState,
    /// Upper bound on a single delta, seconds.
    max_delta: f32,
    /// Multiplier applied to real time (1.0 = normal speed).
    time_scale: f32,
    /// Simulated seconds since the clock was created or reset.
    elapsed: f64,
    /// Ticks that produced a delta.
    frame_count: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    /// A stopped clock.
    pub fn new() -> Self {
        Self {
            state: ClockState::Stopped,
            max_delta: DEFAULT_MAX_DELTA,
            time_scale: 1.0,
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Transition to running. The next tick becomes the reference timestamp
    /// and yields a zero delta. Starting a running clock does nothing.
    pub fn start(&mut self) {
        if self.state == ClockState::Stopped {
            self.state = ClockState::Running { last: None };
        }
    }

    /// Transition to stopped. Idempotent.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    #[inline]
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Record a driver timestamp and return the delta to simulate.
    ///
    /// Returns `None` while stopped. Timestamps that go backwards yield zero.
    pub fn tick(&mut self, now: Duration) -> Option<f32> {
        let ClockState::Running { last } = self.state else {
            return None;
        };
        self.state = ClockState::Running { last: Some(now) };
        let raw = last.map_or(0.0, |last| now.saturating_sub(last).as_secs_f32());
        Some(self.record(raw))
    }

    /// Feed a precomputed delta in seconds, bypassing timestamps.
    ///
    /// Returns `None` while stopped.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.is_running() {
            return None;
        }
        let raw = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        Some(self.record(raw))
    }

    fn record(&mut self, raw: f32) -> f32 {
        let dt = (raw * self.time_scale).min(self.max_delta);
        self.elapsed += dt as f64;
        self.frame_count += 1;
        dt
    }

    /// Simulated seconds so far.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Ticks that produced a delta.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    /// Cap on a single delta, so a host that was suspended for seconds does
    /// not dump a burst of particles on resume.
    ///
    /// Time beyond the cap is dropped, not carried over. A host ticking less
    /// often than once per `max_delta` therefore simulates slower than real
    /// time and emits below each emitter's configured rate; raise the cap if
    /// that matters.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = if max_delta.is_nan() { DEFAULT_MAX_DELTA } else { max_delta.max(0.0) };
    }

    /// Stop and zero the counters. Settings are kept.
    pub fn reset(&mut self) {
        self.state = ClockState::Stopped;
        self.elapsed = 0.0;
        self.frame_count = 0;
    }
}
