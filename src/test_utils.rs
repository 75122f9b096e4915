//! Test utilities for building synthetic telemetry buffers and locating fixtures
//!
//! Shared by unit tests, integration tests and benches so that every caller
//! produces pages and datagrams the same way.

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fixed::{FixedLayout, GraphicsPage, PhysicsPage, StaticPage};
use crate::schema::{DecodePlan, SESSION_UPDATE_PACKET};
use crate::types::{ChannelDefinition, ChannelType, Value};

/// Error returned when a required fixture cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// Directory holding the JSON descriptor fixtures.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Resolve a fixture under `tests/fixtures`, failing loudly when it is absent.
pub fn require_fixture(relative: impl AsRef<Path>) -> Result<PathBuf, FixtureError> {
    let path = fixtures_dir().join(relative);
    if path.exists() {
        Ok(path)
    } else {
        Err(FixtureError { message: format!("Missing test fixture: {}", path.display()) })
    }
}

/// Writes little-endian fields at explicit byte offsets into a zeroed page.
///
/// Offsets are given by hand so tests check the decoder against the
/// producer's layout rather than against itself.
#[derive(Debug, Clone)]
pub struct PageBuilder {
    data: Vec<u8>,
}

impl PageBuilder {
    pub fn new(size: usize) -> Self {
        Self { data: vec![0; size] }
    }

    pub fn bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn i32(self, offset: usize, value: i32) -> Self {
        self.bytes(offset, &value.to_le_bytes())
    }

    pub fn f32(self, offset: usize, value: f32) -> Self {
        self.bytes(offset, &value.to_le_bytes())
    }

    pub fn f32_array(mut self, offset: usize, values: &[f32]) -> Self {
        for (i, value) in values.iter().enumerate() {
            self = self.f32(offset + i * 4, *value);
        }
        self
    }

    /// Write `text` as UTF-16LE into a slot of `chars` code units, NUL padded.
    pub fn wide(self, offset: usize, text: &str, chars: usize) -> Self {
        let mut units: Vec<u16> = text.encode_utf16().take(chars).collect();
        units.resize(chars, 0);
        let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        self.bytes(offset, &bytes)
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// A small set of shared memory pages describing a car mid-stage.
#[derive(Debug, Clone)]
pub struct SamplePages {
    pub physics: Vec<u8>,
    pub graphics: Vec<u8>,
    pub static_info: Vec<u8>,
}

impl SamplePages {
    /// Third gear at 6000 rpm, 120 km/h, half way through a 2:00.000 best.
    pub fn mid_stage(packet_id: i32) -> Self {
        let physics = PageBuilder::new(PhysicsPage::SIZE)
            .i32(0, packet_id)
            .f32(4, 0.8)
            .f32(8, 0.0)
            .i32(16, 4)
            .i32(20, 6000)
            .f32(28, 120.0)
            .f32_array(120, &[90.0, 92.0, 94.0, 96.0])
            .f32(204, 0.2)
            .f32_array(224, &[0.05, 0.0, 0.1, 0.3, 0.2])
            .i32(244, 1)
            .f32(252, 0.0)
            .build();
        let graphics = PageBuilder::new(GraphicsPage::SIZE)
            .i32(0, packet_id)
            .i32(140, 62_000)
            .i32(148, 120_000)
            .f32(156, 4200.0)
            .f32(248, 0.5)
            .build();
        let static_info = PageBuilder::new(StaticPage::SIZE)
            .wide(68, "ks_lancia_delta", 33)
            .i32(412, 8000)
            .build();
        Self { physics, graphics, static_info }
    }
}

/// Decode plan shaped like the game's `session_update` packet.
pub fn session_update_plan() -> Arc<DecodePlan> {
    let channel = |id: &str, ty| ChannelDefinition::new(id, ty);
    Arc::new(DecodePlan::new(
        SESSION_UPDATE_PACKET,
        vec![
            channel("packet_uid", ChannelType::UInt64),
            channel("speed", ChannelType::Float32),
            channel("rpm", ChannelType::Float32),
            channel("max_rpm", ChannelType::Float32),
            channel("gear", ChannelType::Int8),
            channel("throttle", ChannelType::Float32),
            channel("brake", ChannelType::Float32),
            channel("stage_current_time", ChannelType::Float64),
            channel("stage_best_time", ChannelType::Float64),
            channel("stage_progress", ChannelType::Float32),
            channel("distance_completed", ChannelType::Float64),
        ],
    ))
}

/// Values for [`session_update_plan`] in plan order.
pub struct SessionUpdate {
    pub packet_uid: u64,
    pub speed: f32,
    pub rpm: f32,
    pub max_rpm: f32,
    pub gear: i8,
    pub throttle: f32,
    pub brake: f32,
    pub stage_current_time: f64,
    pub stage_best_time: f64,
    pub stage_progress: f32,
    pub distance_completed: f64,
}

impl Default for SessionUpdate {
    fn default() -> Self {
        Self {
            packet_uid: 1,
            speed: 100.0,
            rpm: 5000.0,
            max_rpm: 7500.0,
            gear: 3,
            throttle: 1.0,
            brake: 0.0,
            stage_current_time: 60.0,
            stage_best_time: 120.0,
            stage_progress: 50.0,
            distance_completed: 3500.0,
        }
    }
}

impl SessionUpdate {
    pub fn values(&self) -> Vec<Value> {
        vec![
            Value::UInt64(self.packet_uid),
            Value::Float32(self.speed),
            Value::Float32(self.rpm),
            Value::Float32(self.max_rpm),
            Value::Int8(self.gear),
            Value::Float32(self.throttle),
            Value::Float32(self.brake),
            Value::Float64(self.stage_current_time),
            Value::Float64(self.stage_best_time),
            Value::Float32(self.stage_progress),
            Value::Float64(self.distance_completed),
        ]
    }

    /// Encode against `plan`; the plan must be [`session_update_plan`].
    pub fn encode(&self, plan: &DecodePlan) -> Vec<u8> {
        plan.encode(&self.values()).expect("session_update values match the sample plan")
    }
}
