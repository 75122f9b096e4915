//! Raw decoded records as produced by a telemetry source

use crate::dynamic_frame::DynamicFrame;
use crate::fixed::FixedFrame;

/// The latest record a source decoded on one poll.
///
/// The shape depends on the source; [`Normalizer`](crate::adapters::Normalizer)
/// reduces either variant to a [`TelemetrySnapshot`](super::TelemetrySnapshot).
#[derive(Debug, Clone)]
pub enum RawRecord {
    /// Physics, graphics and static pages copied from shared memory
    Fixed(Box<FixedFrame>),
    /// One datagram decoded against the loaded decode plan
    Dynamic(DynamicFrame),
}

impl RawRecord {
    /// Human readable name of the record's origin.
    pub fn kind(&self) -> &'static str {
        match self {
            RawRecord::Fixed(_) => "shared_memory",
            RawRecord::Dynamic(_) => "network",
        }
    }
}

impl From<FixedFrame> for RawRecord {
    fn from(frame: FixedFrame) -> Self {
        RawRecord::Fixed(Box::new(frame))
    }
}

impl From<DynamicFrame> for RawRecord {
    fn from(frame: DynamicFrame) -> Self {
        RawRecord::Dynamic(frame)
    }
}
