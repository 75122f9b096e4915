//! Normalization of raw source records into [`TelemetrySnapshot`]s.
//!
//! The normalizer works in two phases, like a decode plan:
//! - **Startup resolution**: each alias chain is narrowed to the channels the
//!   loaded [`DecodePlan`] actually carries, warning once for any canonical
//!   field no candidate can fill
//! - **Per-frame mapping**: a straight walk over the resolved chains, with no
//!   knowledge of what the source is beyond the [`RawRecord`] variant
//!
//! ```rust
//! use std::sync::Arc;
//! use pacenote::adapters::Normalizer;
//! use pacenote::schema::DecodePlan;
//! use pacenote::types::{ChannelDefinition, ChannelType, RawRecord, Value};
//! use pacenote::DynamicFrame;
//!
//! let plan = Arc::new(DecodePlan::new("session_update", vec![
//!     ChannelDefinition::new("engine_rpm", ChannelType::Float32),
//!     ChannelDefinition::new("stage_current_time", ChannelType::Float64),
//! ]));
//! let datagram = plan.encode(&[Value::Float32(5200.0), Value::Float64(61.5)]).unwrap();
//! let frame = DynamicFrame::decode(&plan, &datagram).unwrap();
//!
//! let snapshot = Normalizer::new(&plan).normalize(&RawRecord::from(frame));
//! assert_eq!(snapshot.rpm, 5200.0);
//! assert_eq!(snapshot.current_lap_ms, 61_500);
//! ```

mod aliases;
mod fixed;

pub use aliases::{ALIAS_TABLE, Alias, AliasChain, AliasSource, CanonicalField};

use tracing::warn;

use crate::dynamic_frame::DynamicFrame;
use crate::schema::DecodePlan;
use crate::types::{RawRecord, TelemetrySnapshot};
use aliases::ResolvedChain;

/// Converts either source's raw record into the canonical snapshot.
#[derive(Debug, Clone)]
pub struct Normalizer {
    chains: Vec<ResolvedChain>,
}

impl Default for Normalizer {
    /// A normalizer that tries every alias candidate on each frame.
    fn default() -> Self {
        Self { chains: ALIAS_TABLE.iter().map(ResolvedChain::unresolved).collect() }
    }
}

impl Normalizer {
    /// Resolve the alias table against `plan`.
    pub fn new(plan: &DecodePlan) -> Self {
        let chains: Vec<ResolvedChain> =
            ALIAS_TABLE.iter().map(|chain| ResolvedChain::resolve(chain, plan)).collect();

        for (chain, resolved) in ALIAS_TABLE.iter().zip(&chains) {
            if resolved.candidates.is_empty() {
                let candidates: Vec<&str> =
                    chain.candidates.iter().flat_map(Alias::channels).copied().collect();
                warn!(
                    field = chain.field.name(),
                    packet = plan.packet(),
                    ?candidates,
                    "No channel in the decode plan feeds this field; it will read as 0"
                );
            }
        }

        Self { chains }
    }

    /// Map one raw record to a snapshot.
    pub fn normalize(&self, record: &RawRecord) -> TelemetrySnapshot {
        match record {
            RawRecord::Fixed(frame) => fixed::normalize_fixed(frame),
            RawRecord::Dynamic(frame) => self.normalize_dynamic(frame),
        }
    }

    /// Canonical fields that resolved to at least one channel.
    pub fn resolved_fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.chains.iter().filter(|c| !c.candidates.is_empty()).map(|c| c.field)
    }

    fn normalize_dynamic(&self, frame: &DynamicFrame) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::default();
        for chain in &self.chains {
            let value = chain.pick(frame);
            match chain.field {
                CanonicalField::SpeedKph => snapshot.speed_kph = value,
                CanonicalField::Rpm => snapshot.rpm = value,
                CanonicalField::Gear => snapshot.gear = value as i32,
                CanonicalField::Throttle => snapshot.throttle = value,
                CanonicalField::Brake => snapshot.brake = value,
                CanonicalField::CurrentLapMs => snapshot.current_lap_ms = value as i64,
                CanonicalField::BestLapMs => snapshot.best_lap_ms = value as i64,
                CanonicalField::NormalizedProgress => snapshot.normalized_progress = value,
                CanonicalField::DistanceMeters => snapshot.distance_meters = value,
                CanonicalField::StaticMaxRpm => snapshot.static_max_rpm = value,
                CanonicalField::TractionControlLevel => snapshot.traction_control_level = value,
                CanonicalField::AbsLevel => snapshot.abs_level = value,
                CanonicalField::EngineDamagePct => snapshot.engine_damage_pct = value,
                CanonicalField::TyreWearAvgPct => snapshot.tyre_wear_avg_pct = value,
                CanonicalField::SuspensionDamageMaxPct => snapshot.suspension_damage_max_pct = value,
                CanonicalField::FlatTyreCount => snapshot.flat_tyre_count = value as i32,
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{SessionUpdate, session_update_plan};
    use crate::types::{ChannelDefinition, Value};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn frame_for(channels: &[(&str, Value)]) -> (Arc<DecodePlan>, DynamicFrame) {
        let plan = Arc::new(DecodePlan::new(
            "session_update",
            channels.iter().map(|(id, v)| ChannelDefinition::new(*id, v.channel_type())).collect(),
        ));
        let values: Vec<Value> = channels.iter().map(|(_, v)| *v).collect();
        let datagram = plan.encode(&values).unwrap();
        let frame = DynamicFrame::decode(&plan, &datagram).unwrap();
        (plan, frame)
    }

    #[test]
    fn session_update_maps_every_field() {
        let plan = session_update_plan();
        let datagram = SessionUpdate::default().encode(&plan);
        let frame = DynamicFrame::decode(&plan, &datagram).unwrap();

        let snapshot = Normalizer::new(&plan).normalize(&frame.into());
        assert_eq!(snapshot.speed_kph, 100.0);
        assert_eq!(snapshot.rpm, 5000.0);
        assert_eq!(snapshot.static_max_rpm, 7500.0);
        assert_eq!(snapshot.gear, 3);
        assert_eq!(snapshot.throttle, 1.0);
        assert_eq!(snapshot.current_lap_ms, 60_000);
        assert_eq!(snapshot.best_lap_ms, 120_000);
        assert!((snapshot.normalized_progress - 0.5).abs() < 1e-9);
        assert_eq!(snapshot.distance_meters, 3500.0);
    }

    #[test]
    fn first_present_candidate_wins() {
        let (plan, frame) = frame_for(&[
            ("rpm", Value::Float32(4000.0)),
            ("engine_rpm", Value::Float32(9999.0)),
        ]);
        assert_eq!(Normalizer::new(&plan).normalize(&frame.into()).rpm, 4000.0);
    }

    #[test]
    fn zero_falls_through_to_next_candidate() {
        let (plan, frame) = frame_for(&[
            ("normalized_spline_position", Value::Float32(0.0)),
            ("stage_progress", Value::Float32(25.0)),
            ("stage_current_time", Value::Float64(0.0)),
            ("current_time_ms", Value::Int32(4321)),
        ]);
        let snapshot = Normalizer::new(&plan).normalize(&frame.into());
        assert!((snapshot.normalized_progress - 0.25).abs() < 1e-9);
        assert_eq!(snapshot.current_lap_ms, 4321);
    }

    #[test]
    fn absent_fields_read_as_zero() {
        let (plan, frame) = frame_for(&[("speed", Value::Float32(88.0))]);
        let normalizer = Normalizer::new(&plan);
        let snapshot = normalizer.normalize(&frame.into());

        assert_eq!(snapshot.speed_kph, 88.0);
        assert_eq!(snapshot.rpm, 0.0);
        assert_eq!(snapshot.best_lap_ms, 0);
        assert_eq!(normalizer.resolved_fields().collect::<Vec<_>>(), [CanonicalField::SpeedKph]);
    }

    #[test]
    fn damage_fractions_become_percentages() {
        let (plan, frame) = frame_for(&[
            ("engine_damage", Value::Float32(0.25)),
            ("tyre_wear_average", Value::Float32(0.5)),
            ("suspension_damage", Value::Float32(1.0)),
            ("flat_tyres", Value::UInt8(2)),
            ("tc_intervention", Value::Float32(0.6)),
            ("abs_intervention", Value::Float32(0.2)),
        ]);
        let snapshot = Normalizer::new(&plan).normalize(&frame.into());
        assert_eq!(snapshot.engine_damage_pct, 25.0);
        assert_eq!(snapshot.tyre_wear_avg_pct, 50.0);
        assert_eq!(snapshot.suspension_damage_max_pct, 100.0);
        assert_eq!(snapshot.flat_tyre_count, 2);
        assert!((snapshot.traction_control_level - 0.6).abs() < 1e-6);
        assert!((snapshot.abs_level - 0.2).abs() < 1e-6);
    }

    #[test]
    fn tyre_wear_falls_back_to_wheel_mean() {
        let wheels = [
            ("tyre_wear_average", Value::Float32(0.0)),
            ("tyre_wear_fl", Value::Float32(0.5)),
            ("tyre_wear_fr", Value::Float32(0.25)),
            ("tyre_wear_rl", Value::Float32(0.75)),
            ("tyre_wear_rr", Value::Float32(0.5)),
        ];
        let (plan, frame) = frame_for(&wheels);
        assert_eq!(Normalizer::new(&plan).normalize(&frame.into()).tyre_wear_avg_pct, 50.0);

        // A published average still wins.
        let mut with_average = wheels;
        with_average[0].1 = Value::Float32(0.125);
        let (plan, frame) = frame_for(&with_average);
        assert_eq!(Normalizer::new(&plan).normalize(&frame.into()).tyre_wear_avg_pct, 12.5);
    }

    #[test]
    fn wheel_mean_needs_every_wheel() {
        let (plan, frame) = frame_for(&[
            ("tyre_wear_fl", Value::Float32(0.5)),
            ("tyre_wear_fr", Value::Float32(0.5)),
            ("tyre_wear_rl", Value::Float32(0.5)),
        ]);
        let normalizer = Normalizer::new(&plan);
        assert!(!normalizer.resolved_fields().any(|field| field == CanonicalField::TyreWearAvgPct));
        assert_eq!(normalizer.normalize(&frame.into()).tyre_wear_avg_pct, 0.0);
    }

    #[test]
    fn gear_passes_through_signed() {
        let (plan, frame) = frame_for(&[("gear", Value::Int8(-1))]);
        assert_eq!(Normalizer::new(&plan).normalize(&frame.into()).gear, -1);
    }

    #[test]
    fn default_normalizer_tries_every_candidate() {
        let (_plan, frame) = frame_for(&[("gas", Value::Float32(0.4))]);
        let snapshot = Normalizer::default().normalize(&frame.into());
        assert!((snapshot.throttle - 0.4).abs() < 1e-6);
    }

    #[test]
    fn alias_table_covers_every_field_once() {
        let fields: std::collections::HashSet<_> = ALIAS_TABLE.iter().map(|c| c.field).collect();
        assert_eq!(fields.len(), ALIAS_TABLE.len());
        assert_eq!(ALIAS_TABLE.len(), 16);
    }

    proptest! {
        #[test]
        fn prop_millisecond_fields_truncate_seconds(seconds in 0.001f64..10_000.0) {
            let (plan, frame) = frame_for(&[("stage_best_time", Value::Float64(seconds))]);
            let snapshot = Normalizer::new(&plan).normalize(&frame.into());
            prop_assert_eq!(snapshot.best_lap_ms, (seconds * 1000.0) as i64);
        }
    }
}
