//! Primitive channel types and runtime values

use serde::{Deserialize, Serialize};

use super::VarData;

/// Primitive wire types a telemetry channel can carry.
///
/// Deserializes from the spellings used by the game's channel dictionary
/// (`"uint16"`, `"float32"`, `"boolean"`, ...). Short Rust-style aliases are
/// accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[serde(rename = "boolean", alias = "bool")]
    Bool,
    #[serde(alias = "u8")]
    UInt8,
    #[serde(alias = "i8")]
    Int8,
    #[serde(alias = "u16")]
    UInt16,
    #[serde(alias = "i16")]
    Int16,
    #[serde(alias = "u32")]
    UInt32,
    #[serde(alias = "i32")]
    Int32,
    #[serde(alias = "u64")]
    UInt64,
    #[serde(alias = "i64")]
    Int64,
    #[serde(alias = "f32")]
    Float32,
    #[serde(alias = "f64")]
    Float64,
}

impl ChannelType {
    /// Every supported primitive, in codec-table order.
    pub const ALL: [ChannelType; 11] = [
        ChannelType::Bool,
        ChannelType::UInt8,
        ChannelType::Int8,
        ChannelType::UInt16,
        ChannelType::Int16,
        ChannelType::UInt32,
        ChannelType::Int32,
        ChannelType::UInt64,
        ChannelType::Int64,
        ChannelType::Float32,
        ChannelType::Float64,
    ];

    /// Returns the packed size in bytes of this type on the wire.
    pub const fn size(&self) -> usize {
        match self {
            ChannelType::Bool | ChannelType::UInt8 | ChannelType::Int8 => 1,
            ChannelType::UInt16 | ChannelType::Int16 => 2,
            ChannelType::UInt32 | ChannelType::Int32 | ChannelType::Float32 => 4,
            ChannelType::UInt64 | ChannelType::Int64 | ChannelType::Float64 => 8,
        }
    }

    /// Name used by the channel dictionary.
    pub const fn name(&self) -> &'static str {
        match self {
            ChannelType::Bool => "boolean",
            ChannelType::UInt8 => "uint8",
            ChannelType::Int8 => "int8",
            ChannelType::UInt16 => "uint16",
            ChannelType::Int16 => "int16",
            ChannelType::UInt32 => "uint32",
            ChannelType::Int32 => "int32",
            ChannelType::UInt64 => "uint64",
            ChannelType::Int64 => "int64",
            ChannelType::Float32 => "float32",
            ChannelType::Float64 => "float64",
        }
    }

    /// Decode one value of this type at `offset`.
    ///
    /// Returns `None` when the slice is too short.
    pub fn read(&self, data: &[u8], offset: usize) -> Option<Value> {
        Some(match self {
            ChannelType::Bool => Value::Bool(bool::read_le(data, offset)?),
            ChannelType::UInt8 => Value::UInt8(u8::read_le(data, offset)?),
            ChannelType::Int8 => Value::Int8(i8::read_le(data, offset)?),
            ChannelType::UInt16 => Value::UInt16(u16::read_le(data, offset)?),
            ChannelType::Int16 => Value::Int16(i16::read_le(data, offset)?),
            ChannelType::UInt32 => Value::UInt32(u32::read_le(data, offset)?),
            ChannelType::Int32 => Value::Int32(i32::read_le(data, offset)?),
            ChannelType::UInt64 => Value::UInt64(u64::read_le(data, offset)?),
            ChannelType::Int64 => Value::Int64(i64::read_le(data, offset)?),
            ChannelType::Float32 => Value::Float32(f32::read_le(data, offset)?),
            ChannelType::Float64 => Value::Float64(f64::read_le(data, offset)?),
        })
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value holding one decoded channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Value {
    Bool(bool),
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl Value {
    /// The primitive type this value was decoded as.
    pub const fn channel_type(&self) -> ChannelType {
        match self {
            Value::Bool(_) => ChannelType::Bool,
            Value::UInt8(_) => ChannelType::UInt8,
            Value::Int8(_) => ChannelType::Int8,
            Value::UInt16(_) => ChannelType::UInt16,
            Value::Int16(_) => ChannelType::Int16,
            Value::UInt32(_) => ChannelType::UInt32,
            Value::Int32(_) => ChannelType::Int32,
            Value::UInt64(_) => ChannelType::UInt64,
            Value::Int64(_) => ChannelType::Int64,
            Value::Float32(_) => ChannelType::Float32,
            Value::Float64(_) => ChannelType::Float64,
        }
    }

    /// Numeric view of the value. Booleans map to 0 and 1.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Bool(v) => f64::from(u8::from(v)),
            Value::UInt8(v) => f64::from(v),
            Value::Int8(v) => f64::from(v),
            Value::UInt16(v) => f64::from(v),
            Value::Int16(v) => f64::from(v),
            Value::UInt32(v) => f64::from(v),
            Value::Int32(v) => f64::from(v),
            Value::UInt64(v) => v as f64,
            Value::Int64(v) => v as f64,
            Value::Float32(v) => f64::from(v),
            Value::Float64(v) => v,
        }
    }

    /// Append the little-endian wire bytes of this value to `out`.
    pub fn encode_le(&self, out: &mut Vec<u8>) {
        match *self {
            Value::Bool(v) => out.push(u8::from(v)),
            Value::UInt8(v) => out.push(v),
            Value::Int8(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
}
