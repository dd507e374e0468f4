//! Dive session state and derived metrics.
//!
//! A [`DiveSession`] tracks depth, ascent rate and elapsed dive time for a
//! single dive and derives PO2, NDL, CNS% and safe-stop time from them.
//! All metric computations are pure reads of the current state.
//!
//! Elapsed time is not refreshed on read: callers invoke
//! [`DiveSession::update_elapsed_time`] once per sampling tick before reading
//! time-derived metrics such as CNS%.

use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::cns;
use crate::error::DiveError;
use crate::reading::DiveReading;

/// FO2 of air.
pub const AIR_FO2: f64 = 0.21;

/// Depth of the precautionary safe stop (m).
pub const SAFE_STOP_DEPTH_M: f64 = 3.0;

/// Metres of seawater per additional atmosphere.
const METERS_PER_ATA: f64 = 10.0;

/// NDL step table: (max depth in m, inclusive; NDL in minutes).
const NDL_TABLE: [(f64, f64); 4] = [(12.0, 60.0), (18.0, 50.0), (24.0, 40.0), (30.0, 25.0)];

/// NDL beyond the deepest table row.
const NDL_DEEP_MIN: f64 = 20.0;

/// Lifecycle state of a dive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiveState {
    Inactive,
    /// Dive in progress; `started_at` is the clock reading taken at start.
    Active { started_at: Duration },
}

/// State and metric calculations for a single dive.
#[derive(Debug, Clone)]
pub struct DiveSession<C: Clock = SystemClock> {
    oxygen_fraction: f64,
    depth_m: f64,
    ascent_rate: f64,
    state: DiveState,
    dive_time_min: f64,
    clock: C,
}

impl DiveSession<SystemClock> {
    /// Create a session breathing the given FO2, timed by the system clock.
    pub fn new(oxygen_fraction: f64) -> Result<Self, DiveError> {
        Self::with_clock(oxygen_fraction, SystemClock::new())
    }
}

impl Default for DiveSession<SystemClock> {
    fn default() -> Self {
        Self {
            oxygen_fraction: AIR_FO2,
            depth_m: 0.0,
            ascent_rate: 0.0,
            state: DiveState::Inactive,
            dive_time_min: 0.0,
            clock: SystemClock::new(),
        }
    }
}

impl<C: Clock> DiveSession<C> {
    /// Create a session with an injected time source.
    ///
    /// Fails if `oxygen_fraction` is not a finite value in (0, 1].
    pub fn with_clock(oxygen_fraction: f64, clock: C) -> Result<Self, DiveError> {
        if oxygen_fraction.is_nan() || oxygen_fraction <= 0.0 || oxygen_fraction > 1.0 {
            return Err(DiveError::InvalidOxygenFraction(oxygen_fraction));
        }
        Ok(Self {
            oxygen_fraction,
            depth_m: 0.0,
            ascent_rate: 0.0,
            state: DiveState::Inactive,
            dive_time_min: 0.0,
            clock,
        })
    }

    pub fn oxygen_fraction(&self) -> f64 {
        self.oxygen_fraction
    }

    pub fn depth(&self) -> f64 {
        self.depth_m
    }

    pub fn ascent_rate(&self) -> f64 {
        self.ascent_rate
    }

    pub fn state(&self) -> DiveState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DiveState::Active { .. })
    }

    /// Elapsed dive time as of the last [`update_elapsed_time`](Self::update_elapsed_time).
    pub fn dive_time_minutes(&self) -> f64 {
        self.dive_time_min
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start the dive, or restart the elapsed-time reference if already active.
    pub fn start(&mut self) {
        let started_at = self.clock.now();
        if self.is_active() {
            debug!(?started_at, "dive restarted");
        } else {
            debug!(?started_at, fo2 = self.oxygen_fraction, "dive started");
        }
        self.state = DiveState::Active { started_at };
    }

    /// End the dive. Elapsed time keeps its last computed value.
    pub fn stop(&mut self) {
        if self.is_active() {
            debug!(dive_time_min = self.dive_time_min, "dive stopped");
        }
        self.state = DiveState::Inactive;
    }

    /// Replace the current depth (m). Not validated.
    pub fn set_depth(&mut self, depth_m: f64) {
        self.depth_m = depth_m;
    }

    /// Replace the current ascent rate (m/min). Not validated.
    pub fn set_ascent_rate(&mut self, rate: f64) {
        self.ascent_rate = rate;
    }

    /// Recompute elapsed dive time from the clock. No-op while inactive.
    pub fn update_elapsed_time(&mut self) {
        if let DiveState::Active { started_at } = self.state {
            let elapsed = self.clock.now().saturating_sub(started_at);
            self.dive_time_min = elapsed.as_secs_f64() / 60.0;
        }
    }

    /// Ambient pressure (ATA) at the current depth.
    pub fn ambient_pressure(&self) -> f64 {
        1.0 + self.depth_m / METERS_PER_ATA
    }

    /// Oxygen partial pressure (ATA).
    pub fn compute_po2(&self) -> f64 {
        self.oxygen_fraction * self.ambient_pressure()
    }

    /// No-decompression limit (minutes) from the step table.
    pub fn compute_ndl(&self) -> f64 {
        NDL_TABLE
            .iter()
            .find(|(max_depth, _)| self.depth_m <= *max_depth)
            .map(|(_, ndl)| *ndl)
            .unwrap_or(NDL_DEEP_MIN)
    }

    /// CNS oxygen toxicity load (%) for the elapsed dive time at the current PO2.
    pub fn compute_cns(&self) -> f64 {
        cns::cns_percent(self.dive_time_min, self.compute_po2())
    }

    /// Time (minutes) to ascend from the current depth to the safe-stop depth.
    ///
    /// Zero at or above the safe-stop depth. Below it, the ascent rate must be
    /// positive.
    pub fn compute_safe_stop_time(&self) -> Result<f64, DiveError> {
        if self.depth_m <= SAFE_STOP_DEPTH_M {
            return Ok(0.0);
        }
        if self.ascent_rate <= 0.0 || self.ascent_rate.is_nan() {
            return Err(DiveError::ZeroAscentRate {
                rate: self.ascent_rate,
            });
        }
        Ok((self.depth_m - SAFE_STOP_DEPTH_M) / self.ascent_rate)
    }

    /// Snapshot of the current state and every derived metric.
    ///
    /// Does not refresh elapsed time.
    pub fn reading(&self) -> DiveReading {
        DiveReading {
            depth_m: self.depth_m,
            dive_time_min: self.dive_time_min,
            po2_ata: self.compute_po2(),
            ndl_min: self.compute_ndl(),
            cns_percent: self.compute_cns(),
            safe_stop_min: self.compute_safe_stop_time().ok(),
            dive_active: self.is_active(),
        }
    }
}
