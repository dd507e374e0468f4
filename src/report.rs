//! Output sinks for per-tick dive readings.

use std::io::Write;

use tracing::info;

use crate::error::DiveError;
use crate::reading::DiveReading;

/// Consumer of one reading per sampling tick.
pub trait ReportSink {
    fn report(&mut self, tick: usize, reading: &DiveReading) -> Result<(), DiveError>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn report(&mut self, tick: usize, reading: &DiveReading) -> Result<(), DiveError> {
        (**self).report(tick, reading)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn report(&mut self, tick: usize, reading: &DiveReading) -> Result<(), DiveError> {
        (**self).report(tick, reading)
    }
}

/// Human-readable block per reading, metrics shown to two decimals.
#[derive(Debug)]
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn report(&mut self, _tick: usize, reading: &DiveReading) -> Result<(), DiveError> {
        writeln!(self.out, "Current Depth: {} meters", reading.depth_m)?;
        writeln!(
            self.out,
            "Real-time Dive Time: {:.2} minutes",
            reading.dive_time_min
        )?;
        writeln!(self.out, "PO2: {:.2} ATA", reading.po2_ata)?;
        writeln!(self.out, "NDL: {} minutes", reading.ndl_min)?;
        writeln!(self.out, "CNS Toxicity: {:.2}%", reading.cns_percent)?;
        match reading.safe_stop_min {
            Some(minutes) => writeln!(self.out, "Safe Stop Time: {:.2} minutes", minutes)?,
            None => writeln!(self.out, "Safe Stop Time: n/a (ascent rate not set)")?,
        }
        writeln!(self.out, "{}", "-".repeat(50))?;
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per line: the reading plus its tick index.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(serde::Serialize)]
struct TickRecord<'a> {
    tick: usize,
    #[serde(flatten)]
    reading: &'a DiveReading,
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn report(&mut self, tick: usize, reading: &DiveReading) -> Result<(), DiveError> {
        let record = TickRecord { tick, reading };
        serde_json::to_writer(&mut self.out, &record)
            .map_err(|e| DiveError::Report(e.to_string()))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Emits each reading as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&mut self, tick: usize, reading: &DiveReading) -> Result<(), DiveError> {
        info!(
            tick,
            depth_m = reading.depth_m,
            dive_time_min = reading.dive_time_min,
            po2_ata = reading.po2_ata,
            ndl_min = reading.ndl_min,
            cns_percent = reading.cns_percent,
            safe_stop_min = ?reading.safe_stop_min,
            "dive reading"
        );
        Ok(())
    }
}
