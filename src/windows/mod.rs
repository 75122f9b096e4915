//! Windows shared memory access
//!
//! Maps the producer's named file mappings (`Local\acpmf_*`) read-only and
//! exposes them as [`Region`](crate::providers::Region)s. Only the mapping
//! handle and view live here; layout and consistency checks belong to the
//! shared memory source.

mod region;

pub use region::{MappedRegion, MappedRegionOpener};
