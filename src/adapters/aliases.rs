//! Alias chains mapping canonical snapshot fields to network channel ids

use crate::schema::DecodePlan;
use crate::dynamic_frame::DynamicFrame;

/// A canonical [`TelemetrySnapshot`](crate::TelemetrySnapshot) field fed by
/// the network source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    SpeedKph,
    Rpm,
    Gear,
    Throttle,
    Brake,
    CurrentLapMs,
    BestLapMs,
    NormalizedProgress,
    DistanceMeters,
    StaticMaxRpm,
    TractionControlLevel,
    AbsLevel,
    EngineDamagePct,
    TyreWearAvgPct,
    SuspensionDamageMaxPct,
    FlatTyreCount,
}

impl CanonicalField {
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::SpeedKph => "speed_kph",
            CanonicalField::Rpm => "rpm",
            CanonicalField::Gear => "gear",
            CanonicalField::Throttle => "throttle",
            CanonicalField::Brake => "brake",
            CanonicalField::CurrentLapMs => "current_lap_ms",
            CanonicalField::BestLapMs => "best_lap_ms",
            CanonicalField::NormalizedProgress => "normalized_progress",
            CanonicalField::DistanceMeters => "distance_meters",
            CanonicalField::StaticMaxRpm => "static_max_rpm",
            CanonicalField::TractionControlLevel => "traction_control_level",
            CanonicalField::AbsLevel => "abs_level",
            CanonicalField::EngineDamagePct => "engine_damage_pct",
            CanonicalField::TyreWearAvgPct => "tyre_wear_avg_pct",
            CanonicalField::SuspensionDamageMaxPct => "suspension_damage_max_pct",
            CanonicalField::FlatTyreCount => "flat_tyre_count",
        }
    }
}

/// Where a candidate's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSource {
    /// A single channel.
    Channel(&'static str),
    /// The mean of several channels, present only when all of them are.
    Mean(&'static [&'static str]),
}

/// One candidate and the factor applied to its raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alias {
    pub source: AliasSource,
    pub scale: f64,
}

impl Alias {
    /// Every channel id this candidate reads.
    pub fn channels(&self) -> &[&'static str] {
        match &self.source {
            AliasSource::Channel(channel) => std::slice::from_ref(channel),
            AliasSource::Mean(channels) => channels,
        }
    }

    fn read(&self, frame: &DynamicFrame) -> Option<f64> {
        let raw = match self.source {
            AliasSource::Channel(channel) => frame.f64(channel)?,
            AliasSource::Mean(channels) => {
                let mut sum = 0.0;
                for channel in channels {
                    sum += frame.f64(channel)?;
                }
                sum / channels.len() as f64
            }
        };
        Some(raw * self.scale)
    }
}

const fn alias(channel: &'static str) -> Alias {
    Alias { source: AliasSource::Channel(channel), scale: 1.0 }
}

const fn scaled(channel: &'static str, scale: f64) -> Alias {
    Alias { source: AliasSource::Channel(channel), scale }
}

const fn mean_scaled(channels: &'static [&'static str], scale: f64) -> Alias {
    Alias { source: AliasSource::Mean(channels), scale }
}

/// Per-wheel wear channels, front left to rear right.
const TYRE_WEAR_WHEELS: &[&str] = &["tyre_wear_fl", "tyre_wear_fr", "tyre_wear_rl", "tyre_wear_rr"];

/// Ordered candidates for one canonical field. The first candidate that is
/// present and non-zero after scaling wins.
#[derive(Debug, Clone, Copy)]
pub struct AliasChain {
    pub field: CanonicalField,
    pub candidates: &'static [Alias],
}

/// Every canonical field the network source can fill, in snapshot order.
pub const ALIAS_TABLE: &[AliasChain] = &[
    AliasChain { field: CanonicalField::SpeedKph, candidates: &[alias("speed")] },
    AliasChain { field: CanonicalField::Rpm, candidates: &[alias("rpm"), alias("engine_rpm")] },
    AliasChain { field: CanonicalField::Gear, candidates: &[alias("gear")] },
    AliasChain { field: CanonicalField::Throttle, candidates: &[alias("throttle"), alias("gas")] },
    AliasChain { field: CanonicalField::Brake, candidates: &[alias("brake")] },
    AliasChain {
        field: CanonicalField::CurrentLapMs,
        candidates: &[scaled("stage_current_time", 1000.0), alias("current_time_ms")],
    },
    AliasChain {
        field: CanonicalField::BestLapMs,
        candidates: &[scaled("stage_best_time", 1000.0), alias("best_time_ms")],
    },
    AliasChain {
        field: CanonicalField::NormalizedProgress,
        candidates: &[alias("normalized_spline_position"), scaled("stage_progress", 0.01)],
    },
    AliasChain {
        field: CanonicalField::DistanceMeters,
        candidates: &[alias("distance_completed"), alias("distance_traveled")],
    },
    AliasChain { field: CanonicalField::StaticMaxRpm, candidates: &[alias("max_rpm")] },
    AliasChain { field: CanonicalField::TractionControlLevel, candidates: &[alias("tc_intervention")] },
    AliasChain { field: CanonicalField::AbsLevel, candidates: &[alias("abs_intervention")] },
    AliasChain { field: CanonicalField::EngineDamagePct, candidates: &[scaled("engine_damage", 100.0)] },
    AliasChain {
        field: CanonicalField::TyreWearAvgPct,
        candidates: &[scaled("tyre_wear_average", 100.0), mean_scaled(TYRE_WEAR_WHEELS, 100.0)],
    },
    AliasChain {
        field: CanonicalField::SuspensionDamageMaxPct,
        candidates: &[scaled("suspension_damage", 100.0)],
    },
    AliasChain { field: CanonicalField::FlatTyreCount, candidates: &[alias("flat_tyres")] },
];

/// An alias chain narrowed to the candidates a decode plan actually carries.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedChain {
    pub(crate) field: CanonicalField,
    pub(crate) candidates: Vec<Alias>,
}

impl ResolvedChain {
    pub(crate) fn resolve(chain: &AliasChain, plan: &DecodePlan) -> Self {
        let candidates = chain
            .candidates
            .iter()
            .filter(|alias| alias.channels().iter().all(|id| plan.contains(id)))
            .copied()
            .collect();
        Self { field: chain.field, candidates }
    }

    pub(crate) fn unresolved(chain: &AliasChain) -> Self {
        Self { field: chain.field, candidates: chain.candidates.to_vec() }
    }

    /// First present, non-zero scaled candidate; 0 when none qualifies.
    pub(crate) fn pick(&self, frame: &DynamicFrame) -> f64 {
        self.candidates
            .iter()
            .filter_map(|alias| alias.read(frame))
            .find(|value| *value != 0.0)
            .unwrap_or(0.0)
    }
}
