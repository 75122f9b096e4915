//! Shared memory source for the fixed-layout pages

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::fixed::{FixedFrame, FixedLayout, GraphicsPage, PhysicsPage, StaticPage};
use crate::provider::{Availability, SourceAdapter, SourcePoll};
use crate::types::RawRecord;
use crate::{Result, TelemetryError};

/// Minimum time between attempts to open missing regions. Zero retries on
/// every poll.
pub const DEFAULT_REOPEN_INTERVAL: Duration = Duration::ZERO;

/// A readable view of one named shared memory region.
///
/// Reads copy out of the region; the producer may be writing concurrently, so
/// callers never hold references into it.
pub trait Region: Send {
    /// Mapped length in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `out.len()` bytes starting at `offset`. Returns `false` when the
    /// range falls outside the region.
    fn read_into(&self, offset: usize, out: &mut [u8]) -> bool;
}

/// Opens named regions. The platform opener maps `Local\{name}`; tests and
/// replays hand in pages held in memory.
pub trait RegionOpener: Send {
    fn open(&mut self, name: &str, size: usize) -> Result<Box<dyn Region>>;
}

/// Opener for the host platform's shared memory.
#[cfg(windows)]
pub fn platform_opener() -> Box<dyn RegionOpener> {
    Box::new(crate::windows::MappedRegionOpener)
}

/// Opener for the host platform's shared memory.
#[cfg(not(windows))]
pub fn platform_opener() -> Box<dyn RegionOpener> {
    Box::new(UnsupportedOpener)
}

/// Opener used where the producer cannot run; every open fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedOpener;

impl RegionOpener for UnsupportedOpener {
    fn open(&mut self, name: &str, _size: usize) -> Result<Box<dyn Region>> {
        Err(TelemetryError::unsupported_platform(format!("shared memory region {name}"), "Windows"))
    }
}

/// Page bytes held in memory, shared between a writer and the source.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegion {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryRegion {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes: Arc::new(Mutex::new(bytes)) }
    }

    /// Replace the region's contents.
    pub fn write(&self, bytes: &[u8]) {
        if let Ok(mut guard) = self.bytes.lock() {
            guard.clear();
            guard.extend_from_slice(bytes);
        }
    }
}

impl Region for MemoryRegion {
    fn len(&self) -> usize {
        self.bytes.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn read_into(&self, offset: usize, out: &mut [u8]) -> bool {
        let Ok(guard) = self.bytes.lock() else {
            return false;
        };
        match guard.get(offset..offset + out.len()) {
            Some(src) => {
                out.copy_from_slice(src);
                true
            }
            None => false,
        }
    }
}

/// Opener serving [`MemoryRegion`]s by region name. Regions not yet inserted
/// fail to open, like a producer that has not started.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    regions: Arc<Mutex<Vec<(String, MemoryRegion)>>>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a region, returning a handle for later writes.
    pub fn insert(&self, name: &str, bytes: Vec<u8>) -> MemoryRegion {
        let region = MemoryRegion::new(bytes);
        if let Ok(mut regions) = self.regions.lock() {
            regions.retain(|(existing, _)| existing != name);
            regions.push((name.to_string(), region.clone()));
        }
        region
    }
}

impl RegionOpener for MemoryOpener {
    fn open(&mut self, name: &str, _size: usize) -> Result<Box<dyn Region>> {
        let regions = self
            .regions
            .lock()
            .map_err(|_| TelemetryError::connection_failed("memory opener lock poisoned"))?;
        regions
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, region)| Box::new(region.clone()) as Box<dyn Region>)
            .ok_or_else(|| TelemetryError::connection_failed(format!("region {name} not published")))
    }
}

struct Regions {
    physics: Box<dyn Region>,
    graphics: Box<dyn Region>,
    static_info: Box<dyn Region>,
}

impl Regions {
    fn open(opener: &mut dyn RegionOpener) -> Result<Self> {
        Ok(Self {
            physics: opener.open(PhysicsPage::REGION, PhysicsPage::SIZE)?,
            graphics: opener.open(GraphicsPage::REGION, GraphicsPage::SIZE)?,
            static_info: opener.open(StaticPage::REGION, StaticPage::SIZE)?,
        })
    }
}

/// Source reading the physics, graphics and static pages.
///
/// Regions are opened lazily and, while missing, retried on every poll unless
/// a reopen interval is set. Each poll copies the pages out with a before/after
/// `packet_id` check; a page rewritten mid-copy is skipped for this tick.
pub struct SharedMemorySource {
    opener: Box<dyn RegionOpener>,
    regions: Option<Regions>,
    reopen_interval: Duration,
    last_open_attempt: Option<Instant>,
    last_ids: Option<(i32, i32)>,
    physics_buf: Vec<u8>,
    graphics_buf: Vec<u8>,
    static_buf: Vec<u8>,
    availability: Availability,
}

impl SharedMemorySource {
    pub fn new(opener: Box<dyn RegionOpener>) -> Self {
        Self {
            opener,
            regions: None,
            reopen_interval: DEFAULT_REOPEN_INTERVAL,
            last_open_attempt: None,
            last_ids: None,
            physics_buf: vec![0; PhysicsPage::SIZE],
            graphics_buf: vec![0; GraphicsPage::SIZE],
            static_buf: vec![0; StaticPage::SIZE],
            availability: Availability::Unavailable,
        }
    }

    /// Source over the host platform's shared memory.
    pub fn platform() -> Self {
        Self::new(platform_opener())
    }

    pub fn with_reopen_interval(mut self, interval: Duration) -> Self {
        self.reopen_interval = interval;
        self
    }

    fn try_open(&mut self) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_open_attempt {
            if now.duration_since(last) < self.reopen_interval {
                return false;
            }
        }
        self.last_open_attempt = Some(now);

        match Regions::open(self.opener.as_mut()) {
            Ok(regions) => {
                info!(
                    physics_len = regions.physics.len(),
                    graphics_len = regions.graphics.len(),
                    static_len = regions.static_info.len(),
                    "Opened shared memory regions"
                );
                self.regions = Some(regions);
                self.availability = Availability::Available;
                true
            }
            Err(e) => {
                debug!(error = %e, "Shared memory not available");
                false
            }
        }
    }

    /// Copy one page, checking its leading `packet_id` did not move during the copy.
    fn copy_consistent(region: &dyn Region, buf: &mut [u8]) -> Option<i32> {
        let before = read_packet_id(region)?;
        if !region.read_into(0, buf) {
            return None;
        }
        let after = read_packet_id(region)?;
        (before == after).then_some(after)
    }

    fn read_frame(&mut self) -> SourcePoll {
        let Some(regions) = self.regions.as_ref() else {
            return SourcePoll::Unavailable;
        };

        let Some(physics_id) = Self::copy_consistent(regions.physics.as_ref(), &mut self.physics_buf)
        else {
            debug!("Physics page changed during copy, skipping tick");
            return SourcePoll::NoChange;
        };
        let Some(graphics_id) =
            Self::copy_consistent(regions.graphics.as_ref(), &mut self.graphics_buf)
        else {
            debug!("Graphics page changed during copy, skipping tick");
            return SourcePoll::NoChange;
        };

        if self.last_ids == Some((physics_id, graphics_id)) {
            trace!(physics_id, "No new shared memory data");
            return SourcePoll::NoChange;
        }

        if !regions.static_info.read_into(0, &mut self.static_buf) {
            warn!(len = regions.static_info.len(), "Static region shorter than its layout");
            return SourcePoll::NoChange;
        }

        match FixedFrame::decode(&self.physics_buf, &self.graphics_buf, &self.static_buf) {
            Ok(frame) => {
                self.last_ids = Some((physics_id, graphics_id));
                trace!(physics_id, graphics_id, "Read shared memory frame");
                SourcePoll::Record(RawRecord::from(frame))
            }
            Err(e) => {
                warn!(error = %e, "Failed to decode shared memory pages");
                SourcePoll::NoChange
            }
        }
    }
}

fn read_packet_id(region: &dyn Region) -> Option<i32> {
    let mut bytes = [0u8; 4];
    region.read_into(0, &mut bytes).then(|| i32::from_le_bytes(bytes))
}

#[async_trait::async_trait]
impl SourceAdapter for SharedMemorySource {
    async fn poll(&mut self) -> Result<SourcePoll> {
        if self.regions.is_none() && !self.try_open() {
            return Ok(SourcePoll::Unavailable);
        }
        Ok(self.read_frame())
    }

    fn availability(&self) -> Availability {
        self.availability
    }

    fn name(&self) -> &'static str {
        "shared_memory"
    }
}
