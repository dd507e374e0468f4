//! Foreign-language bindings for a dive session.
//!
//! Exposes [`DiveComputer`], a thread-safe handle around a
//! [`DiveSession`] timed by the system clock, through uniffi.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::DiveError;
use crate::reading::DiveReading;
use crate::session::DiveSession;

#[derive(Debug, uniffi::Object)]
pub struct DiveComputer {
    session: Mutex<DiveSession>,
}

impl DiveComputer {
    fn session(&self) -> MutexGuard<'_, DiveSession> {
        // Every session update is a single field write, so a poisoned lock
        // still guards a consistent session.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl DiveComputer {
    #[uniffi::constructor]
    pub fn new(oxygen_fraction: f64) -> Result<Arc<Self>, DiveError> {
        let session = DiveSession::new(oxygen_fraction)?;
        Ok(Arc::new(Self {
            session: Mutex::new(session),
        }))
    }

    pub fn start(&self) {
        self.session().start();
    }

    pub fn stop(&self) {
        self.session().stop();
    }

    pub fn set_depth(&self, depth_m: f64) {
        self.session().set_depth(depth_m);
    }

    pub fn set_ascent_rate(&self, rate: f64) {
        self.session().set_ascent_rate(rate);
    }

    pub fn update_elapsed_time(&self) {
        self.session().update_elapsed_time();
    }

    pub fn is_active(&self) -> bool {
        self.session().is_active()
    }

    pub fn oxygen_fraction(&self) -> f64 {
        self.session().oxygen_fraction()
    }

    pub fn depth(&self) -> f64 {
        self.session().depth()
    }

    pub fn ascent_rate(&self) -> f64 {
        self.session().ascent_rate()
    }

    pub fn dive_time_minutes(&self) -> f64 {
        self.session().dive_time_minutes()
    }

    pub fn compute_po2(&self) -> f64 {
        self.session().compute_po2()
    }

    pub fn compute_ndl(&self) -> f64 {
        self.session().compute_ndl()
    }

    pub fn compute_cns(&self) -> f64 {
        self.session().compute_cns()
    }

    pub fn compute_safe_stop_time(&self) -> Result<f64, DiveError> {
        self.session().compute_safe_stop_time()
    }

    /// Refresh elapsed time and return a full reading, as one sampling tick.
    pub fn sample(&self) -> DiveReading {
        let mut session = self.session();
        session.update_elapsed_time();
        session.reading()
    }
}
