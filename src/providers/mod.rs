//! Concrete telemetry sources
//!
//! - [`SharedMemorySource`] copies the fixed-layout pages out of named shared
//!   memory regions
//! - [`NetworkSource`] receives schema-described datagrams over UDP

mod network;
mod shared_memory;

pub use network::{DEFAULT_RECV_WAIT, NetworkSource};
pub use shared_memory::{
    DEFAULT_REOPEN_INTERVAL, MemoryOpener, MemoryRegion, Region, RegionOpener, SharedMemorySource,
    UnsupportedOpener, platform_opener,
};
