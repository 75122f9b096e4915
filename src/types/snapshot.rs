//! Canonical, source-independent telemetry snapshot

use serde::{Deserialize, Serialize};

/// One normalized telemetry sample.
///
/// Every source is reduced to this shape before any metric is computed.
/// Values are stored in metric units (km/h, metres, milliseconds); display
/// conversion happens in [`MetricsCalculator`](crate::metrics::MetricsCalculator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct TelemetrySnapshot {
    /// Vehicle speed in km/h
    pub speed_kph: f64,
    /// Engine speed in rev/min
    pub rpm: f64,
    /// Selected gear: -1 reverse, 0 neutral, 1.. forward
    pub gear: i32,
    /// Throttle pedal, 0..1
    pub throttle: f64,
    /// Brake pedal, 0..1
    pub brake: f64,
    /// Elapsed time on the current lap or stage
    pub current_lap_ms: i64,
    /// Best lap or stage time, 0 when none is set
    pub best_lap_ms: i64,
    /// Fraction of the lap or stage completed, 0..1; negative when unknown
    pub normalized_progress: f64,
    /// Distance covered on the current lap or stage in metres
    pub distance_meters: f64,
    pub engine_damage_pct: f64,
    pub tyre_wear_avg_pct: f64,
    pub suspension_damage_max_pct: f64,
    pub flat_tyre_count: i32,
    /// Traction control intervention level
    pub traction_control_level: f64,
    /// ABS intervention level
    pub abs_level: f64,
    /// Redline reported by the simulator, 0 when unknown
    pub static_max_rpm: f64,
}

impl TelemetrySnapshot {
    /// Progress through the lap as a percentage, treating unknown as 0.
    pub fn progress_percent(&self) -> f64 {
        if self.normalized_progress >= 0.0 { self.normalized_progress * 100.0 } else { 0.0 }
    }

    /// Distance covered in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}
