//! Physics, graphics and static page layouts.
//!
//! Field order, widths and padding mirror the producer's `#pragma pack(4)`
//! structures byte for byte. Offsets noted in comments are from the start of
//! each page.

use serde::Serialize;

use super::reader::PageReader;
use super::{FixedLayout, ReadFields, decode_page, sealed};
use crate::DecodeError;

/// Length of the short text slots (versions, lap time strings).
const SHORT_TEXT: usize = 15;
/// Length of the long text slots (car, track, driver names, compound).
const LONG_TEXT: usize = 33;

/// Per-step vehicle state, rewritten at the simulator's physics rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhysicsPage {
    pub packet_id: i32,
    pub gas: f32,
    pub brake: f32,
    pub fuel: f32,
    /// 0 reverse, 1 neutral, 2 first gear, ...
    pub gear: i32,
    pub rpms: i32,
    pub steer_angle: f32,
    pub speed_kmh: f32,
    pub velocity: [f32; 3],
    pub acc_g: [f32; 3],
    pub wheel_slip: [f32; 4],
    pub wheel_load: [f32; 4],
    pub wheels_pressure: [f32; 4],
    pub wheel_angular_speed: [f32; 4],
    pub tyre_wear: [f32; 4],
    pub tyre_dirty_level: [f32; 4],
    pub tyre_core_temperature: [f32; 4],
    pub camber_rad: [f32; 4],
    pub suspension_travel: [f32; 4],
    pub drs: f32,
    pub tc: f32,
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
    pub cg_height: f32,
    /// Front, rear, left, right, centre
    pub car_damage: [f32; 5],
    pub number_of_tyres_out: i32,
    pub pit_limiter_on: i32,
    pub abs: f32,
    pub kers_charge: f32,
    pub kers_input: f32,
    pub auto_shifter_on: i32,
    pub ride_height: [f32; 2],
}

impl FixedLayout for PhysicsPage {
    const SIZE: usize = 276;
    const NAME: &'static str = "physics";
    const REGION: &'static str = "acpmf_physics";

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode_page(data)
    }
}

impl sealed::Sealed for PhysicsPage {}

impl ReadFields for PhysicsPage {
    fn read_fields(r: &mut PageReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            packet_id: r.read()?,
            gas: r.read()?,
            brake: r.read()?,
            fuel: r.read()?,
            gear: r.read()?,
            rpms: r.read()?,
            steer_angle: r.read()?,
            speed_kmh: r.read()?, // 28
            velocity: r.array()?,
            acc_g: r.array()?,
            wheel_slip: r.array()?, // 56
            wheel_load: r.array()?,
            wheels_pressure: r.array()?,
            wheel_angular_speed: r.array()?,
            tyre_wear: r.array()?, // 120
            tyre_dirty_level: r.array()?,
            tyre_core_temperature: r.array()?,
            camber_rad: r.array()?,
            suspension_travel: r.array()?,
            drs: r.read()?, // 200
            tc: r.read()?,
            heading: r.read()?,
            pitch: r.read()?,
            roll: r.read()?,
            cg_height: r.read()?,
            car_damage: r.array()?, // 224
            number_of_tyres_out: r.read()?,
            pit_limiter_on: r.read()?,
            abs: r.read()?,
            kers_charge: r.read()?,
            kers_input: r.read()?,
            auto_shifter_on: r.read()?,
            ride_height: r.array()?, // 268
        })
    }
}

/// Session and timing state, rewritten at the simulator's graphics rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphicsPage {
    pub packet_id: i32,
    pub status: i32,
    pub session: i32,
    pub current_time: String,
    pub last_time: String,
    pub best_time: String,
    pub split: String,
    pub completed_laps: i32,
    pub position: i32,
    pub i_current_time: i32,
    pub i_last_time: i32,
    pub i_best_time: i32,
    pub session_time_left: f32,
    pub distance_traveled: f32,
    pub is_in_pit: i32,
    pub current_sector_index: i32,
    pub last_sector_time: i32,
    pub number_of_laps: i32,
    pub tyre_compound: String,
    pub replay_time_multiplier: f32,
    pub normalized_car_position: f32,
    pub car_coordinates: [f32; 3],
    pub penalty_time: f32,
    pub flag: i32,
    pub ideal_line_on: i32,
}

impl FixedLayout for GraphicsPage {
    const SIZE: usize = 276;
    const NAME: &'static str = "graphics";
    const REGION: &'static str = "acpmf_graphics";

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode_page(data)
    }
}

impl sealed::Sealed for GraphicsPage {}

impl ReadFields for GraphicsPage {
    fn read_fields(r: &mut PageReader<'_>) -> Result<Self, DecodeError> {
        let packet_id = r.read()?;
        let status = r.read()?;
        let session = r.read()?;
        let current_time = r.wide_str(SHORT_TEXT)?; // 12
        let last_time = r.wide_str(SHORT_TEXT)?;
        let best_time = r.wide_str(SHORT_TEXT)?;
        let split = r.wide_str(SHORT_TEXT)?;
        let completed_laps = r.read()?; // 132
        let position = r.read()?;
        let i_current_time = r.read()?;
        let i_last_time = r.read()?;
        let i_best_time = r.read()?;
        let session_time_left = r.read()?;
        let distance_traveled = r.read()?;
        let is_in_pit = r.read()?;
        let current_sector_index = r.read()?;
        let last_sector_time = r.read()?;
        let number_of_laps = r.read()?;
        let tyre_compound = r.wide_str(LONG_TEXT)?; // 176
        r.pad(2)?; // 242 -> 244
        Ok(Self {
            packet_id,
            status,
            session,
            current_time,
            last_time,
            best_time,
            split,
            completed_laps,
            position,
            i_current_time,
            i_last_time,
            i_best_time,
            session_time_left,
            distance_traveled,
            is_in_pit,
            current_sector_index,
            last_sector_time,
            number_of_laps,
            tyre_compound,
            replay_time_multiplier: r.read()?,
            normalized_car_position: r.read()?,
            car_coordinates: r.array()?,
            penalty_time: r.read()?,
            flag: r.read()?,
            ideal_line_on: r.read()?,
        })
    }
}

/// Values fixed for the session: versions, car and track identity, limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StaticPage {
    pub sm_version: String,
    pub ac_version: String,
    pub number_of_sessions: i32,
    pub num_cars: i32,
    pub car_model: String,
    pub track: String,
    pub player_name: String,
    pub player_surname: String,
    pub player_nick: String,
    pub sector_count: i32,
    pub max_torque: f32,
    pub max_power: f32,
    pub max_rpm: i32,
    pub max_fuel: f32,
    pub suspension_max_travel: [f32; 4],
    pub tyre_radius: [f32; 4],
}

impl FixedLayout for StaticPage {
    const SIZE: usize = 452;
    const NAME: &'static str = "static";
    const REGION: &'static str = "acpmf_static";

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode_page(data)
    }
}

impl sealed::Sealed for StaticPage {}

impl ReadFields for StaticPage {
    fn read_fields(r: &mut PageReader<'_>) -> Result<Self, DecodeError> {
        let sm_version = r.wide_str(SHORT_TEXT)?;
        let ac_version = r.wide_str(SHORT_TEXT)?;
        let number_of_sessions = r.read()?; // 60
        let num_cars = r.read()?;
        let car_model = r.wide_str(LONG_TEXT)?; // 68
        let track = r.wide_str(LONG_TEXT)?;
        let player_name = r.wide_str(LONG_TEXT)?;
        let player_surname = r.wide_str(LONG_TEXT)?;
        let player_nick = r.wide_str(LONG_TEXT)?;
        r.pad(2)?; // 398 -> 400
        Ok(Self {
            sm_version,
            ac_version,
            number_of_sessions,
            num_cars,
            car_model,
            track,
            player_name,
            player_surname,
            player_nick,
            sector_count: r.read()?,
            max_torque: r.read()?,
            max_power: r.read()?,
            max_rpm: r.read()?,
            max_fuel: r.read()?,
            suspension_max_travel: r.array()?,
            tyre_radius: r.array()?,
        })
    }
}
