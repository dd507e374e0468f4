//! CNS oxygen toxicity limits.
//!
//! Maps oxygen partial pressure to the exposure time that corresponds to a
//! 100% CNS load, using a fixed breakpoint table and linear interpolation
//! between breakpoints.

/// (PO2 in ATA, limit in minutes), ascending by PO2.
pub const CNS_LIMITS: [(f64, f64); 21] = [
    (1.0, 570.0),
    (1.1, 480.0),
    (1.2, 420.0),
    (1.3, 360.0),
    (1.4, 300.0),
    (1.5, 240.0),
    (1.6, 150.0),
    (1.7, 120.0),
    (1.8, 90.0),
    (1.9, 60.0),
    (2.0, 45.0),
    (2.1, 30.0),
    (2.2, 25.0),
    (2.3, 20.0),
    (2.4, 15.0),
    (2.5, 10.0),
    (2.6, 8.0),
    (2.7, 6.0),
    (2.8, 5.0),
    (2.9, 4.0),
    (3.0, 3.0),
];

/// Exposure limit in minutes for the given PO2.
///
/// Below the first breakpoint the first limit applies (no downward
/// extrapolation, so PO2 under 1.0 carries the 1.0 limit). At or above the
/// last breakpoint the last limit applies.
pub fn cns_limit_minutes(po2: f64) -> f64 {
    let (first_po2, first_limit) = CNS_LIMITS[0];
    let (last_po2, last_limit) = CNS_LIMITS[CNS_LIMITS.len() - 1];

    if po2 >= last_po2 {
        return last_limit;
    }
    if po2 < first_po2 || po2.is_nan() {
        return first_limit;
    }

    CNS_LIMITS
        .windows(2)
        .find(|pair| pair[0].0 <= po2 && po2 < pair[1].0)
        .map(|pair| {
            let (lo_po2, lo_limit) = pair[0];
            let (hi_po2, hi_limit) = pair[1];
            lo_limit + (hi_limit - lo_limit) / (hi_po2 - lo_po2) * (po2 - lo_po2)
        })
        .unwrap_or(last_limit)
}

/// CNS load in percent after `dive_time_min` minutes at `po2`.
pub fn cns_percent(dive_time_min: f64, po2: f64) -> f64 {
    dive_time_min / cns_limit_minutes(po2) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ascending() {
        for pair in CNS_LIMITS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "PO2 keys must ascend");
            assert!(pair[0].1 > pair[1].1, "limits must descend");
        }
    }

    #[test]
    fn test_limit_at_breakpoints() {
        for &(po2, limit) in &CNS_LIMITS {
            let got = cns_limit_minutes(po2);
            assert!(
                (got - limit).abs() < 1e-9,
                "limit at PO2 {po2} should be {limit}, got {got}"
            );
        }
    }

    #[test]
    fn test_limit_interpolates_between_breakpoints() {
        // Halfway between 1.4 (300) and 1.5 (240)
        let got = cns_limit_minutes(1.45);
        assert!((got - 270.0).abs() < 1e-6, "expected 270, got {got}");

        // A quarter of the way from 1.6 (150) to 1.7 (120)
        let got = cns_limit_minutes(1.625);
        assert!((got - 142.5).abs() < 1e-6, "expected 142.5, got {got}");
    }

    #[test]
    fn test_limit_clamps_below_table() {
        assert_eq!(cns_limit_minutes(0.21), 570.0);
        assert_eq!(cns_limit_minutes(0.0), 570.0);
        assert_eq!(cns_limit_minutes(-1.0), 570.0);
        assert_eq!(cns_limit_minutes(f64::NAN), 570.0);
    }

    #[test]
    fn test_limit_clamps_above_table() {
        assert_eq!(cns_limit_minutes(3.0), 3.0);
        assert_eq!(cns_limit_minutes(4.2), 3.0);
        assert_eq!(cns_limit_minutes(f64::INFINITY), 3.0);
    }

    #[test]
    fn test_cns_percent() {
        let got = cns_percent(1.0, 1.5);
        assert!((got - 100.0 / 240.0).abs() < 1e-9, "got {got}");

        assert_eq!(cns_percent(0.0, 2.0), 0.0);
        assert!((cns_percent(570.0, 1.0) - 100.0).abs() < 1e-9);
    }
}
