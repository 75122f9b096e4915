//! Telemetry channel definitions

use serde::{Deserialize, Serialize};

use super::ChannelType;

/// One named, typed channel from the channel dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ChannelDefinition {
    /// Channel id as published by the game (e.g. `"vehicle_speed"`)
    pub id: String,
    /// Wire type of the channel
    #[serde(rename = "type")]
    pub primitive_type: ChannelType,
}

impl ChannelDefinition {
    pub fn new(id: impl Into<String>, primitive_type: ChannelType) -> Self {
        Self { id: id.into(), primitive_type }
    }

    /// Packed size of this channel in bytes.
    pub fn size(&self) -> usize {
        self.primitive_type.size()
    }
}
