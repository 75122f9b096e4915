//! Startup configuration
//!
//! Everything is read once from a YAML file before the engine starts; every
//! key is optional.
//!
//! ```rust
//! use pacenote::config::{DashConfig, SourceKind};
//!
//! let config = DashConfig::from_yaml_str("source: network\nnetwork:\n  port: 20777\n").unwrap();
//! assert_eq!(config.source, SourceKind::Network);
//! assert_eq!(config.network.port, 20777);
//! assert_eq!(config.refresh_rate_hz, 60);
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::UnitSystem;
use crate::schema::SESSION_UPDATE_PACKET;
use crate::{Result, TelemetryError};

/// Which telemetry host to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    SharedMemory,
    Network,
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub source: SourceKind,
    pub units: UnitSystem,
    /// Engine ticks per second, independent of either source's update rate
    pub refresh_rate_hz: u32,
    pub network: NetworkConfig,
    pub schema: SchemaConfig,
    /// Passed through to the renderer untouched
    pub window: WindowConfig,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            units: UnitSystem::default(),
            refresh_rate_hz: 60,
            network: NetworkConfig::default(),
            schema: SchemaConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Longest a tick waits for the first datagram
    pub recv_wait_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: 9999, recv_wait_ms: 10 }
    }
}

impl NetworkConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn recv_wait(&self) -> Duration {
        Duration::from_millis(self.recv_wait_ms)
    }
}

/// Location of the game's telemetry descriptor documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directory holding the descriptors; a leading `~` is the home directory
    pub telemetry_dir: PathBuf,
    /// Channel dictionary, relative to `telemetry_dir`
    pub channels_file: PathBuf,
    /// Packet layout, relative to `telemetry_dir`
    pub layout_file: PathBuf,
    pub packet: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            telemetry_dir: PathBuf::from("~/Documents/My Games/WRC/telemetry/readme"),
            channels_file: PathBuf::from("channels.json"),
            layout_file: PathBuf::from("udp").join("wrc.json"),
            packet: SESSION_UPDATE_PACKET.to_string(),
        }
    }
}

impl SchemaConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        expand_home(&self.telemetry_dir)
    }

    pub fn channels_path(&self) -> PathBuf {
        self.resolved_dir().join(&self.channels_file)
    }

    pub fn layout_path(&self) -> PathBuf {
        self.resolved_dir().join(&self.layout_file)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub position: WindowPosition,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1024, height: 600, position: WindowPosition { x: 100, y: 100 }, fullscreen: false }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl DashConfig {
    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        let config = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), source = ?config.source, "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty document is null, which would not deserialize as a mapping.
        let config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(text)
                .map_err(|e| TelemetryError::config_error("Parsing configuration YAML", e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.refresh_rate_hz) {
            return Err(TelemetryError::config_error(
                "refresh_rate_hz",
                format!("must be between 1 and 1000, got {}", self.refresh_rate_hz),
            ));
        }
        if self.network.port == 0 {
            return Err(TelemetryError::config_error("network.port", "must not be 0"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.refresh_rate_hz))
    }
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
