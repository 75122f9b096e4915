//! Source trait for telemetry hosts

use serde::Serialize;

use crate::Result;
use crate::types::RawRecord;

/// Whether a source currently has a live producer behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Availability {
    #[default]
    Unavailable,
    Available,
}

impl Availability {
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone)]
pub enum SourcePoll {
    /// No producer is reachable; the engine shows standby.
    Unavailable,
    /// The producer is there but nothing new arrived this tick.
    NoChange,
    /// The newest decodable record.
    Record(RawRecord),
}

/// Trait for telemetry sources polled once per engine tick.
///
/// Sources own their transport and decoder. A poll must return within a
/// bounded time so it never stalls the tick; there is no blocking wait for
/// data. Per-tick problems (a torn read, a short datagram) are reported as
/// [`SourcePoll::NoChange`] and logged by the source, not returned as errors.
/// `Err` is reserved for failures of the transport itself.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + 'static {
    /// Poll for the newest record.
    async fn poll(&mut self) -> Result<SourcePoll>;

    /// Availability as of the last poll.
    fn availability(&self) -> Availability;

    /// Short source name for logs.
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
impl SourceAdapter for Box<dyn SourceAdapter> {
    async fn poll(&mut self) -> Result<SourcePoll> {
        (**self).poll().await
    }

    fn availability(&self) -> Availability {
        (**self).availability()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
