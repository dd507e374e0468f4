//! Sampling loop that feeds a depth profile through a dive session.
//!
//! The driver owns no global state: the session (and with it the clock),
//! the pacing between ticks and the output sink are all passed in.

use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{Clock, ManualClock};
use crate::error::DiveError;
use crate::profile::ProfileStep;
use crate::report::ReportSink;
use crate::session::DiveSession;

/// Waits out the interval between two ticks.
pub trait Pacer {
    fn pause(&mut self, interval: Duration);
}

/// Real-time pacing with `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Fast-forward pacing: advances a [`ManualClock`] instead of sleeping.
#[derive(Debug, Clone)]
pub struct ClockPacer {
    clock: ManualClock,
}

impl ClockPacer {
    pub fn new(clock: ManualClock) -> Self {
        Self { clock }
    }
}

impl Pacer for ClockPacer {
    fn pause(&mut self, interval: Duration) {
        self.clock.advance(interval);
    }
}

/// Driver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    /// Time between two samples.
    pub interval: Duration,
    /// Ascent rate (m/min) for steps that do not carry their own.
    pub default_ascent_rate: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            default_ascent_rate: 9.0,
        }
    }
}

/// Outcome of a completed profile run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiveSummary {
    pub ticks: usize,
    pub max_depth_m: f64,
    pub dive_time_min: f64,
    pub peak_cns_percent: f64,
}

/// Run every profile step through `session`, one tick per step.
///
/// Starts the dive before the first step and stops it after the last. Each
/// tick sets depth and ascent rate, refreshes elapsed time, reports the
/// reading to `sink`, then pauses for `config.interval` (except after the
/// last step).
pub fn run_profile<C, P, S>(
    session: &mut DiveSession<C>,
    steps: &[ProfileStep],
    config: &DriverConfig,
    pacer: &mut P,
    sink: &mut S,
) -> Result<DiveSummary, DiveError>
where
    C: Clock,
    P: Pacer,
    S: ReportSink,
{
    if steps.is_empty() {
        return Err(DiveError::EmptyProfile);
    }

    let mut summary = DiveSummary {
        ticks: 0,
        max_depth_m: 0.0,
        dive_time_min: 0.0,
        peak_cns_percent: 0.0,
    };

    session.start();
    let result = run_steps(session, steps, config, pacer, sink, &mut summary);
    session.stop();
    result?;

    summary.dive_time_min = session.dive_time_minutes();
    debug!(
        ticks = summary.ticks,
        max_depth_m = summary.max_depth_m,
        peak_cns_percent = summary.peak_cns_percent,
        "profile complete"
    );
    Ok(summary)
}

fn run_steps<C, P, S>(
    session: &mut DiveSession<C>,
    steps: &[ProfileStep],
    config: &DriverConfig,
    pacer: &mut P,
    sink: &mut S,
    summary: &mut DiveSummary,
) -> Result<(), DiveError>
where
    C: Clock,
    P: Pacer,
    S: ReportSink,
{
    for (tick, step) in steps.iter().enumerate() {
        session.set_depth(step.depth_m);
        session.set_ascent_rate(step.ascent_rate.unwrap_or(config.default_ascent_rate));
        session.update_elapsed_time();

        let reading = session.reading();
        for alert in reading.alerts() {
            warn!(
                tick,
                depth_m = reading.depth_m,
                dive_time_min = reading.dive_time_min,
                "{}",
                alert.label()
            );
        }
        sink.report(tick, &reading)?;

        summary.ticks += 1;
        summary.max_depth_m = summary.max_depth_m.max(reading.depth_m);
        summary.peak_cns_percent = summary.peak_cns_percent.max(reading.cns_percent);

        if tick + 1 < steps.len() {
            pacer.pause(config.interval);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::linear_descent;
    use crate::reading::DiveReading;

    #[derive(Default)]
    struct CollectingSink {
        readings: Vec<(usize, DiveReading)>,
    }

    impl ReportSink for CollectingSink {
        fn report(&mut self, tick: usize, reading: &DiveReading) -> Result<(), DiveError> {
            self.readings.push((tick, reading.clone()));
            Ok(())
        }
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn report(&mut self, _tick: usize, _reading: &DiveReading) -> Result<(), DiveError> {
            Err(DiveError::Report("sink closed".to_string()))
        }
    }

    fn fast_session(fo2: f64) -> (DiveSession<ManualClock>, ClockPacer) {
        let clock = ManualClock::new();
        let session = DiveSession::with_clock(fo2, clock.clone()).unwrap();
        (session, ClockPacer::new(clock))
    }

    #[test]
    fn test_run_linear_descent() {
        let (mut session, mut pacer) = fast_session(0.32);
        let mut sink = CollectingSink::default();
        let config = DriverConfig {
            interval: Duration::from_secs(30),
            ..DriverConfig::default()
        };

        let summary = run_profile(
            &mut session,
            &linear_descent(10, 9.0),
            &config,
            &mut pacer,
            &mut sink,
        )
        .unwrap();

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.max_depth_m, 10.0);
        // Nine 30 s pauses between ten samples
        assert_eq!(summary.dive_time_min, 4.5);
        assert!(!session.is_active());

        assert_eq!(sink.readings.len(), 10);
        let (tick, first) = &sink.readings[0];
        assert_eq!(*tick, 0);
        assert_eq!(first.depth_m, 1.0);
        assert_eq!(first.dive_time_min, 0.0);
        assert!(first.dive_active);

        let (_, last) = &sink.readings[9];
        assert_eq!(last.depth_m, 10.0);
        assert_eq!(last.dive_time_min, 4.5);
        assert!((last.po2_ata - 0.64).abs() < 1e-12);
        assert!((last.safe_stop_min.unwrap() - 7.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_ascent_rate_applies_to_bare_steps() {
        let (mut session, mut pacer) = fast_session(0.21);
        let mut sink = CollectingSink::default();
        let config = DriverConfig {
            default_ascent_rate: 6.0,
            ..DriverConfig::default()
        };
        let steps = [ProfileStep::at(15.0), ProfileStep::with_rate(15.0, 12.0)];

        run_profile(&mut session, &steps, &config, &mut pacer, &mut sink).unwrap();

        assert_eq!(sink.readings[0].1.safe_stop_min, Some(2.0));
        assert_eq!(sink.readings[1].1.safe_stop_min, Some(1.0));
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        let (mut session, mut pacer) = fast_session(0.21);
        let mut sink = CollectingSink::default();
        let result = run_profile(
            &mut session,
            &[],
            &DriverConfig::default(),
            &mut pacer,
            &mut sink,
        );
        assert_eq!(result, Err(DiveError::EmptyProfile));
        assert!(!session.is_active());
    }

    #[test]
    fn test_sink_failure_stops_dive() {
        let (mut session, mut pacer) = fast_session(0.21);
        let result = run_profile(
            &mut session,
            &linear_descent(3, 9.0),
            &DriverConfig::default(),
            &mut pacer,
            &mut FailingSink,
        );
        assert_eq!(result, Err(DiveError::Report("sink closed".to_string())));
        assert!(!session.is_active());
    }

    #[test]
    fn test_peak_cns_tracks_maximum() {
        let (mut session, mut pacer) = fast_session(0.5);
        let mut sink = CollectingSink::default();
        let config = DriverConfig {
            interval: Duration::from_secs(60),
            ..DriverConfig::default()
        };
        // 1.5 ATA for two minutes, then back to the surface
        let steps = [
            ProfileStep::at(20.0),
            ProfileStep::at(20.0),
            ProfileStep::at(20.0),
            ProfileStep::at(0.0),
        ];

        let summary = run_profile(&mut session, &steps, &config, &mut pacer, &mut sink).unwrap();

        let at_depth = sink.readings[2].1.cns_percent;
        assert!((at_depth - 2.0 / 240.0 * 100.0).abs() < 1e-9);
        assert_eq!(summary.peak_cns_percent, at_depth);
        assert!(sink.readings[3].1.cns_percent < at_depth);
    }
}
