//! Core types for telemetry data representation.
//!
//! - [`ChannelType`] is the primitive codec table shared by every decoder
//! - [`ChannelDefinition`] names one typed channel from the channel dictionary
//! - [`VarData`] reads bounds-checked little-endian primitives from raw buffers
//! - [`RawRecord`] is what a source yields per poll, before normalization
//! - [`TelemetrySnapshot`] is the canonical record every metric is computed from
//!
//! ```rust
//! use pacenote::types::{ChannelType, VarData};
//!
//! let data = 4500.0f32.to_le_bytes();
//! assert_eq!(ChannelType::Float32.size(), 4);
//! assert_eq!(f32::read_le(&data, 0), Some(4500.0));
//! ```

mod channel;
mod channel_type;
mod frame;
mod snapshot;
mod var_data;

pub use channel::ChannelDefinition;
pub use channel_type::{ChannelType, Value};
pub use frame::RawRecord;
pub use snapshot::TelemetrySnapshot;
pub use var_data::VarData;
