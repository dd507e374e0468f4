//! Per-tick snapshot of a dive session.

use serde::Serialize;

/// PO2 (ATA) above which exposure is outside normal working limits.
pub const PO2_WARN_ATA: f64 = 1.6;

/// CNS load (%) at which a warning is raised.
pub const CNS_WARN_PERCENT: f64 = 80.0;

/// Depth, elapsed time and every derived metric at one point in the dive.
#[derive(Debug, Clone, PartialEq, Serialize, uniffi::Record)]
pub struct DiveReading {
    /// Current depth in meters
    pub depth_m: f64,
    /// Elapsed dive time in minutes, as of the last time update
    pub dive_time_min: f64,
    /// Oxygen partial pressure (ATA)
    pub po2_ata: f64,
    /// No-decompression limit in minutes
    pub ndl_min: f64,
    /// CNS oxygen toxicity load in percent
    pub cns_percent: f64,
    /// Safe-stop time in minutes; `None` when the ascent rate is not positive
    pub safe_stop_min: Option<f64>,
    pub dive_active: bool,
}

/// Limit breach detected in a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    NdlExceeded,
    CnsHigh,
    Po2High,
}

impl Alert {
    pub fn label(&self) -> &'static str {
        match self {
            Alert::NdlExceeded => "no-decompression limit exceeded",
            Alert::CnsHigh => "CNS oxygen toxicity high",
            Alert::Po2High => "PO2 above 1.6 ATA",
        }
    }
}

impl DiveReading {
    /// Limits breached by this reading, in a fixed order.
    pub fn alerts(&self) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if self.dive_time_min > self.ndl_min {
            alerts.push(Alert::NdlExceeded);
        }
        if self.cns_percent >= CNS_WARN_PERCENT {
            alerts.push(Alert::CnsHigh);
        }
        if self.po2_ata > PO2_WARN_ATA {
            alerts.push(Alert::Po2High);
        }
        alerts
    }
}
