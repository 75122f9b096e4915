//! Polling engine driving a source, the normalizer and the metrics calculator
//!
//! One [`Engine`] owns everything that runs per tick. It polls its source on a
//! fixed interval, turns new records into a snapshot and metrics, and hands a
//! [`FrameOutput`] to a [`Renderer`]. When nothing new arrived the previous
//! output is handed over again.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::adapters::Normalizer;
use crate::config::{DashConfig, SourceKind};
use crate::dynamic_frame::DynamicDecoder;
use crate::metrics::{DerivedMetrics, MetricsCalculator};
use crate::provider::{Availability, SourceAdapter, SourcePoll};
use crate::providers::{NetworkSource, SharedMemorySource};
use crate::schema::SchemaLoader;
use crate::types::TelemetrySnapshot;
use crate::{Result, TelemetryError};

/// What the renderer gets each tick.
///
/// Snapshot and metrics are both present or both absent; they are absent
/// whenever the source is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FrameOutput {
    pub source_available: bool,
    pub snapshot: Option<TelemetrySnapshot>,
    pub metrics: Option<DerivedMetrics>,
}

impl FrameOutput {
    /// Output shown while no producer is reachable.
    pub fn standby() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Presentation boundary. Implementations draw, log or forward each frame.
pub trait Renderer {
    fn render(&mut self, frame: &FrameOutput);
}

impl<F> Renderer for F
where
    F: FnMut(&FrameOutput),
{
    fn render(&mut self, frame: &FrameOutput) {
        self(frame)
    }
}

/// Counters reported when the engine stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub records: u64,
    pub source_errors: u64,
}

/// The per-tick pipeline: source, normalizer, metrics.
pub struct Engine<S> {
    source: S,
    normalizer: Normalizer,
    metrics: MetricsCalculator,
    tick: Duration,
    output: FrameOutput,
    availability: Availability,
    stats: EngineStats,
}

impl<S: SourceAdapter> Engine<S> {
    pub fn new(source: S, normalizer: Normalizer, metrics: MetricsCalculator, tick: Duration) -> Self {
        Self {
            source,
            normalizer,
            metrics,
            tick,
            output: FrameOutput::standby(),
            availability: Availability::Unavailable,
            stats: EngineStats::default(),
        }
    }

    /// The most recent output.
    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one tick without waiting for the interval.
    ///
    /// Transport errors that can clear up on their own are logged and the
    /// previous output is kept; any other error is returned.
    pub async fn tick(&mut self) -> Result<&FrameOutput> {
        self.stats.ticks += 1;

        match self.source.poll().await {
            Ok(SourcePoll::Record(record)) => {
                let snapshot = self.normalizer.normalize(&record);
                let metrics = self.metrics.update(&snapshot);
                trace!(kind = record.kind(), rpm = snapshot.rpm, ratio = metrics.rpm_ratio, "New frame");
                self.stats.records += 1;
                self.output =
                    FrameOutput { source_available: true, snapshot: Some(snapshot), metrics: Some(metrics) };
            }
            Ok(SourcePoll::NoChange) => {
                self.output.source_available = true;
            }
            Ok(SourcePoll::Unavailable) => {
                self.output = FrameOutput::standby();
            }
            Err(e) if e.is_retryable() => {
                self.stats.source_errors += 1;
                if self.stats.source_errors == 1 || self.stats.source_errors % 100 == 0 {
                    warn!(error = %e, count = self.stats.source_errors, "Source poll failed, keeping last frame");
                } else {
                    debug!(error = %e, "Source poll failed");
                }
            }
            Err(e) => return Err(e),
        }

        self.track_availability();
        Ok(&self.output)
    }

    fn track_availability(&mut self) {
        let now = self.source.availability();
        if now != self.availability {
            match now {
                Availability::Available => info!(source = self.source.name(), "Telemetry source available"),
                Availability::Unavailable => {
                    info!(source = self.source.name(), "Telemetry source unavailable, showing standby")
                }
            }
            self.availability = now;
        }
    }

    /// Tick at the configured rate until `cancel` fires.
    ///
    /// Late ticks are skipped rather than bunched up.
    pub async fn run<R: Renderer>(&mut self, renderer: &mut R, cancel: CancellationToken) -> Result<EngineStats> {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(source = self.source.name(), tick_ms = self.tick.as_secs_f64() * 1000.0, "Engine started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Engine cancelled");
                    break;
                }
                _ = interval.tick() => {}
            }

            let frame = self.tick().await?;
            renderer.render(frame);
        }

        info!(ticks = self.stats.ticks, records = self.stats.records, "Engine stopped");
        Ok(self.stats)
    }
}

impl Engine<Box<dyn SourceAdapter>> {
    /// Build the source named by `config`, loading the schema documents and
    /// binding the socket for the network source.
    pub async fn from_config(config: &DashConfig) -> Result<Self> {
        let (source, normalizer): (Box<dyn SourceAdapter>, Normalizer) = match config.source {
            SourceKind::SharedMemory => (Box::new(SharedMemorySource::platform()), Normalizer::default()),
            SourceKind::Network => {
                let plan = Arc::new(SchemaLoader::load(
                    config.schema.channels_path(),
                    config.schema.layout_path(),
                    &config.schema.packet,
                )?);
                let normalizer = Normalizer::new(&plan);
                let decoder = DynamicDecoder::new(plan);
                let source =
                    NetworkSource::bind(config.network.socket_addr(), decoder, config.network.recv_wait()).await?;
                (Box::new(source), normalizer)
            }
        };

        Ok(Self::new(source, normalizer, MetricsCalculator::new(config.units), config.tick_interval()))
    }
}

/// An engine running on its own task, publishing each frame on a watch channel.
pub struct EngineHandle {
    frames: watch::Receiver<Arc<FrameOutput>>,
    cancel: CancellationToken,
    task: JoinHandle<Result<EngineStats>>,
}

impl EngineHandle {
    /// Spawn `engine` onto the current runtime.
    pub fn spawn<S: SourceAdapter>(mut engine: Engine<S>) -> Self {
        let (tx, frames) = watch::channel(Arc::new(FrameOutput::standby()));
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move {
            let mut publish = |frame: &FrameOutput| {
                // Skip identical frames so subscribers only wake on change.
                tx.send_if_modified(|current| {
                    if **current == *frame {
                        false
                    } else {
                        *current = Arc::new(frame.clone());
                        true
                    }
                });
            };
            engine.run(&mut publish, cancel_task).await
        });

        Self { frames, cancel, task }
    }

    /// The most recently published frame.
    pub fn latest(&self) -> Arc<FrameOutput> {
        Arc::clone(&self.frames.borrow())
    }

    /// A receiver for frame changes.
    pub fn receiver(&self) -> watch::Receiver<Arc<FrameOutput>> {
        self.frames.clone()
    }

    /// Frames as a stream, starting with the current one.
    pub fn stream(&self) -> impl Stream<Item = Arc<FrameOutput>> + Send + 'static {
        WatchStream::new(self.frames.clone())
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the engine and wait for it to finish.
    pub async fn stop(self) -> Result<EngineStats> {
        self.cancel.cancel();
        self.task
            .await
            .map_err(|e| TelemetryError::connection_failed_with_source("Engine task failed", Box::new(e)))?
    }
}
