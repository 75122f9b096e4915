//! Resolved, fixed-width decode plan for one packet kind

use serde::Serialize;

use crate::DecodeError;
use crate::types::{ChannelDefinition, Value};

/// Ordered channel list plus the packed byte length of one datagram.
///
/// Channels are laid out back to back with no alignment padding, little-endian,
/// exactly as the game writes them. A plan is built once at startup and shared
/// read-only for the lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DecodePlan {
    packet: String,
    channels: Vec<ChannelDefinition>,
    byte_len: usize,
}

impl DecodePlan {
    /// Build a plan from an already-resolved channel order.
    pub fn new(packet: impl Into<String>, channels: Vec<ChannelDefinition>) -> Self {
        let byte_len = channels.iter().map(ChannelDefinition::size).sum();
        Self { packet: packet.into(), channels, byte_len }
    }

    /// Id of the packet this plan decodes.
    pub fn packet(&self) -> &str {
        &self.packet
    }

    /// Channels in wire order.
    pub fn channels(&self) -> &[ChannelDefinition] {
        &self.channels
    }

    /// Exact length every accepted datagram must have.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Check if a channel id is carried by this packet.
    pub fn contains(&self, id: &str) -> bool {
        self.channels.iter().any(|channel| channel.id == id)
    }

    /// Encode one value per channel, in plan order, into a datagram.
    ///
    /// Used to synthesize datagrams for replay and testing. Each value must
    /// carry the channel's exact primitive type.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>, DecodeError> {
        if values.len() != self.channels.len() {
            return Err(DecodeError::LengthMismatch {
                expected: self.channels.len(),
                actual: values.len(),
            });
        }

        let mut out = Vec::with_capacity(self.byte_len);
        for (channel, value) in self.channels.iter().zip(values) {
            if value.channel_type() != channel.primitive_type {
                return Err(DecodeError::TypeMismatch {
                    channel: channel.id.clone(),
                    expected: channel.primitive_type.name(),
                    found: value.channel_type().name(),
                });
            }
            value.encode_le(&mut out);
        }

        debug_assert_eq!(out.len(), self.byte_len);
        Ok(out)
    }
}
