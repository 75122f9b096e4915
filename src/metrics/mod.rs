//! Derived racing metrics.
//!
//! [`MetricsCalculator`] turns each [`TelemetrySnapshot`] into a
//! [`DerivedMetrics`] record. The only state carried between ticks is the
//! learned redline, a watermark used when the simulator does not publish one.
//!
//! ```rust
//! use pacenote::metrics::{LapDelta, MetricsCalculator, UnitSystem};
//! use pacenote::TelemetrySnapshot;
//!
//! let mut calc = MetricsCalculator::new(UnitSystem::Metric);
//! let snapshot = TelemetrySnapshot {
//!     current_lap_ms: 60_000,
//!     best_lap_ms: 120_000,
//!     normalized_progress: 0.5,
//!     ..Default::default()
//! };
//!
//! let metrics = calc.update(&snapshot);
//! assert_eq!(metrics.lap_delta, LapDelta::Valid(0));
//! assert_eq!(metrics.estimated_stage_ms, Some(120_000));
//! ```

mod color;
mod display;

pub use color::{Rgb, rpm_color};
pub use display::{format_delta, format_lap_time};

use serde::{Deserialize, Serialize};

use crate::types::TelemetrySnapshot;

/// Kilometres per mile, as shown on the dashboard.
pub const KM_PER_MILE: f64 = 1.609;

/// Floor for the rpm ratio denominator before any rpm has been seen.
const MIN_EFFECTIVE_MAX_RPM: f64 = 100.0;

/// Ratio above which the shift light is lit.
const SHIFT_LIGHT_RATIO: f64 = 0.95;

/// Display unit preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SpeedUnit {
    #[serde(rename = "KPH")]
    Kph,
    #[serde(rename = "MPH")]
    Mph,
}

impl SpeedUnit {
    pub fn label(self) -> &'static str {
        match self {
            SpeedUnit::Kph => "KPH",
            SpeedUnit::Mph => "MPH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum DistanceUnit {
    #[serde(rename = "KM")]
    Km,
    #[serde(rename = "Mi")]
    Mi,
}

impl DistanceUnit {
    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Km => "KM",
            DistanceUnit::Mi => "Mi",
        }
    }
}

/// Time gained or lost against the best lap at the current progress.
///
/// Positive means slower than best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum LapDelta {
    Valid(i64),
    Invalid,
}

impl LapDelta {
    pub fn ms(self) -> Option<i64> {
        match self {
            LapDelta::Valid(ms) => Some(ms),
            LapDelta::Invalid => None,
        }
    }
}

/// How hard an assist is intervening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum InterventionState {
    Off,
    Active,
    Heavy,
}

impl InterventionState {
    /// Traction control: below 0.1 off, below 0.5 active, otherwise heavy.
    pub fn traction_control(level: f64) -> Self {
        if level < 0.1 {
            InterventionState::Off
        } else if level < 0.5 {
            InterventionState::Active
        } else {
            InterventionState::Heavy
        }
    }

    /// ABS has no graded state: below 0.1 off, otherwise active.
    pub fn abs(level: f64) -> Self {
        if level < 0.1 { InterventionState::Off } else { InterventionState::Active }
    }

    pub fn is_active(self) -> bool {
        self != InterventionState::Off
    }
}

/// Everything computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DerivedMetrics {
    /// rpm over effective max, clamped to `[0, 1]`
    pub rpm_ratio: f64,
    /// Redline used for the ratio: static when published, learned otherwise
    pub effective_max_rpm: f64,
    pub learned_max_rpm: f64,
    pub lap_delta: LapDelta,
    /// Projected stage time at the current relative pace
    pub estimated_stage_ms: Option<i64>,
    pub display_speed: f64,
    pub display_distance: f64,
    pub speed_unit: SpeedUnit,
    pub distance_unit: DistanceUnit,
    pub rpm_color: Rgb,
    pub shift_light: bool,
    pub gear_label: String,
    pub progress_pct: f64,
    pub traction_control: InterventionState,
    pub abs: InterventionState,
}

impl DerivedMetrics {
    pub fn lap_delta_valid(&self) -> bool {
        matches!(self.lap_delta, LapDelta::Valid(_))
    }

    pub fn traction_control_label(&self) -> &'static str {
        match self.traction_control {
            InterventionState::Off => "OFF",
            InterventionState::Active => "TC",
            InterventionState::Heavy => "TC !",
        }
    }

    pub fn abs_label(&self) -> &'static str {
        match self.abs {
            InterventionState::Off => "OFF",
            InterventionState::Active | InterventionState::Heavy => "ABS !",
        }
    }
}

/// Stateful calculator owned by the engine for the whole session.
#[derive(Debug, Clone, Default)]
pub struct MetricsCalculator {
    learned_max_rpm: f64,
    units: UnitSystem,
}

impl MetricsCalculator {
    pub fn new(units: UnitSystem) -> Self {
        Self { learned_max_rpm: 0.0, units }
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn learned_max_rpm(&self) -> f64 {
        self.learned_max_rpm
    }

    /// Compute metrics for one snapshot, advancing the learned redline.
    pub fn update(&mut self, snapshot: &TelemetrySnapshot) -> DerivedMetrics {
        let effective_max_rpm = self.resolve_max_rpm(snapshot);
        let rpm_ratio = rpm_ratio(snapshot.rpm, effective_max_rpm);
        let progress_pct = snapshot.progress_percent();

        let (display_speed, display_distance, speed_unit, distance_unit) = match self.units {
            UnitSystem::Metric => {
                (snapshot.speed_kph, snapshot.distance_km(), SpeedUnit::Kph, DistanceUnit::Km)
            }
            UnitSystem::Imperial => (
                snapshot.speed_kph / KM_PER_MILE,
                snapshot.distance_km() / KM_PER_MILE,
                SpeedUnit::Mph,
                DistanceUnit::Mi,
            ),
        };

        DerivedMetrics {
            rpm_ratio,
            effective_max_rpm,
            learned_max_rpm: self.learned_max_rpm,
            lap_delta: lap_delta(snapshot),
            estimated_stage_ms: estimate_stage_ms(snapshot.current_lap_ms, snapshot.best_lap_ms, progress_pct),
            display_speed,
            display_distance,
            speed_unit,
            distance_unit,
            rpm_color: rpm_color(rpm_ratio),
            shift_light: rpm_ratio > SHIFT_LIGHT_RATIO,
            gear_label: gear_label(snapshot.gear),
            progress_pct,
            traction_control: InterventionState::traction_control(snapshot.traction_control_level),
            abs: InterventionState::abs(snapshot.abs_level),
        }
    }

    /// A published redline is used verbatim and never learned.
    fn resolve_max_rpm(&mut self, snapshot: &TelemetrySnapshot) -> f64 {
        if snapshot.static_max_rpm > 0.0 {
            return snapshot.static_max_rpm;
        }
        self.learned_max_rpm = self.learned_max_rpm.max(snapshot.rpm);
        self.learned_max_rpm
    }
}

/// `rpm / max(100, max_rpm)` clamped to `[0, 1]`.
pub fn rpm_ratio(rpm: f64, max_rpm: f64) -> f64 {
    let ratio = rpm / max_rpm.max(MIN_EFFECTIVE_MAX_RPM);
    if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
}

/// Delta against the best lap scaled to the current progress.
///
/// Needs both a running and a best time. Progress is used as reported, so a
/// negative (unknown) value pushes the expected time below zero.
pub fn lap_delta(snapshot: &TelemetrySnapshot) -> LapDelta {
    if snapshot.best_lap_ms <= 0 || snapshot.current_lap_ms <= 0 {
        return LapDelta::Invalid;
    }
    let expected = snapshot.best_lap_ms as f64 * snapshot.normalized_progress;
    LapDelta::Valid((snapshot.current_lap_ms as f64 - expected) as i64)
}

/// Linear projection of the stage time from pace so far.
///
/// Needs a best time and more than 1% progress; only positive projections
/// are reported.
pub fn estimate_stage_ms(current_lap_ms: i64, best_lap_ms: i64, progress_pct: f64) -> Option<i64> {
    if best_lap_ms <= 0 || progress_pct <= 1.0 {
        return None;
    }
    let best = best_lap_ms as f64;
    let pace_factor = current_lap_ms as f64 / (best * (progress_pct / 100.0));
    let estimate = (best * pace_factor).round() as i64;
    (estimate > 0).then_some(estimate)
}

/// `R` for reverse, `N` for neutral, the gear number otherwise.
pub fn gear_label(gear: i32) -> String {
    match gear {
        g if g < 0 => "R".to_string(),
        0 => "N".to_string(),
        g => g.to_string(),
    }
}
