//! Serde models of the two descriptor documents shipped with the game

use serde::Deserialize;

use crate::types::ChannelDefinition;

/// `channels.json`: the flat dictionary of every channel the game can emit.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelDictionary {
    pub channels: Vec<ChannelDefinition>,
}

/// `udp/<structure>.json`: which channels each packet carries, in order.
#[derive(Debug, Clone, Deserialize)]
pub struct PacketLayout {
    pub header: PacketHeader,
    #[serde(default)]
    pub packets: Vec<PacketDefinition>,
}

/// Channels prefixed to every packet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacketHeader {
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacketDefinition {
    pub id: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

impl PacketLayout {
    pub fn packet(&self, id: &str) -> Option<&PacketDefinition> {
        self.packets.iter().find(|packet| packet.id == id)
    }
}
