//! Mapping from shared memory pages to the canonical snapshot

use crate::fixed::FixedFrame;
use crate::types::TelemetrySnapshot;

/// Reduce the three fixed pages to a snapshot.
///
/// The pages number gears from 0 (reverse); the snapshot uses -1 for reverse.
/// Damage values are fractions and become percentages. Suspension damage is
/// the worst of the four corner entries after the front/rear pair.
pub(crate) fn normalize_fixed(frame: &FixedFrame) -> TelemetrySnapshot {
    let physics = &frame.physics;
    let graphics = &frame.graphics;

    let tyre_wear_avg =
        physics.tyre_wear.iter().map(|w| f64::from(*w)).sum::<f64>() / physics.tyre_wear.len() as f64;
    let suspension_max =
        physics.car_damage[2..].iter().copied().fold(f32::NEG_INFINITY, f32::max);

    TelemetrySnapshot {
        speed_kph: f64::from(physics.speed_kmh),
        rpm: f64::from(physics.rpms),
        gear: physics.gear.saturating_sub(1),
        throttle: f64::from(physics.gas),
        brake: f64::from(physics.brake),
        current_lap_ms: i64::from(graphics.i_current_time),
        best_lap_ms: i64::from(graphics.i_best_time),
        normalized_progress: f64::from(graphics.normalized_car_position),
        distance_meters: f64::from(graphics.distance_traveled),
        engine_damage_pct: f64::from(physics.car_damage[0]) * 100.0,
        tyre_wear_avg_pct: tyre_wear_avg,
        suspension_damage_max_pct: f64::from(suspension_max) * 100.0,
        flat_tyre_count: physics.number_of_tyres_out,
        traction_control_level: f64::from(physics.tc),
        abs_level: f64::from(physics.abs),
        static_max_rpm: f64::from(frame.static_info.max_rpm),
    }
}
