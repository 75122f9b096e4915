//! Schema loading for the network telemetry source.
//!
//! The game publishes two JSON descriptors next to its telemetry readme:
//!
//! - a channel dictionary (`channels.json`) listing every channel id with its
//!   primitive type, and
//! - a packet layout (`udp/wrc.json`) listing which channel ids each packet
//!   carries, after a common header.
//!
//! [`SchemaLoader`] joins the two into a [`DecodePlan`] for one packet kind.
//! Any problem here is a configuration problem: it is reported once at startup
//! and the engine never starts.
//!
//! ```rust
//! use pacenote::schema::SchemaLoader;
//!
//! let channels = r#"{"channels": [
//!     {"id": "packet_uid", "type": "uint64"},
//!     {"id": "speed", "type": "float32"},
//!     {"id": "gear", "type": "int8"}
//! ]}"#;
//! let layout = r#"{
//!     "header": {"channels": ["packet_uid"]},
//!     "packets": [{"id": "session_update", "channels": ["speed", "gear"]}]
//! }"#;
//!
//! let plan = SchemaLoader::from_documents(channels, layout, "session_update").unwrap();
//! assert_eq!(plan.byte_len(), 8 + 4 + 1);
//! ```

mod documents;
mod plan;

pub use documents::{ChannelDictionary, PacketDefinition, PacketHeader, PacketLayout};
pub use plan::DecodePlan;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::SchemaError;
use crate::types::{ChannelDefinition, ChannelType};

/// Packet id carrying the per-frame vehicle and stage state.
pub const SESSION_UPDATE_PACKET: &str = "session_update";

/// Builds a [`DecodePlan`] from the game's descriptor documents.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Read both documents from disk and resolve `packet`.
    pub fn load(
        channels_path: impl AsRef<Path>,
        layout_path: impl AsRef<Path>,
        packet: &str,
    ) -> Result<DecodePlan, SchemaError> {
        let channels_path = channels_path.as_ref();
        let layout_path = layout_path.as_ref();

        let dictionary: ChannelDictionary = read_document(channels_path)?;
        let layout: PacketLayout = read_document(layout_path)?;

        let plan = Self::resolve(&dictionary, &layout, packet)?;
        info!(
            packet = plan.packet(),
            channels = plan.channel_count(),
            byte_len = plan.byte_len(),
            dictionary = %channels_path.display(),
            layout = %layout_path.display(),
            "Loaded telemetry decode plan"
        );
        Ok(plan)
    }

    /// Resolve `packet` from in-memory JSON documents.
    pub fn from_documents(
        channels_json: &str,
        layout_json: &str,
        packet: &str,
    ) -> Result<DecodePlan, SchemaError> {
        let dictionary: ChannelDictionary = parse_document(channels_json, "<channels>")?;
        let layout: PacketLayout = parse_document(layout_json, "<layout>")?;
        Self::resolve(&dictionary, &layout, packet)
    }

    /// Join a parsed dictionary and layout into a plan.
    ///
    /// The effective channel order is the layout header followed by the
    /// packet's own channels.
    pub fn resolve(
        dictionary: &ChannelDictionary,
        layout: &PacketLayout,
        packet: &str,
    ) -> Result<DecodePlan, SchemaError> {
        let mut types: HashMap<&str, ChannelType> =
            HashMap::with_capacity(dictionary.channels.len());
        for channel in &dictionary.channels {
            if types.insert(channel.id.as_str(), channel.primitive_type).is_some() {
                return Err(SchemaError::DuplicateChannel(channel.id.clone()));
            }
        }

        let definition =
            layout.packet(packet).ok_or_else(|| SchemaError::UnknownPacket(packet.to_string()))?;

        let channels = layout
            .header
            .channels
            .iter()
            .chain(&definition.channels)
            .map(|id| {
                types
                    .get(id.as_str())
                    .map(|ty| ChannelDefinition::new(id.clone(), *ty))
                    .ok_or_else(|| SchemaError::UnknownChannel(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            packet,
            header_channels = layout.header.channels.len(),
            payload_channels = definition.channels.len(),
            "Resolved packet channel order"
        );

        Ok(DecodePlan::new(packet, channels))
    }
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SchemaError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| SchemaError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text)
        .map_err(|source| SchemaError::Malformed { path: path.to_path_buf(), source })
}

fn parse_document<T: serde::de::DeserializeOwned>(
    text: &str,
    label: &str,
) -> Result<T, SchemaError> {
    serde_json::from_str(text)
        .map_err(|source| SchemaError::Malformed { path: PathBuf::from(label), source })
}
