//! Telemetry acquisition and derived metrics for rally dashboards.
//!
//! Pacenote reads live telemetry from two kinds of simulator and reduces both
//! to one [`TelemetrySnapshot`] per tick, plus the [`DerivedMetrics`] a
//! dashboard shows: delta to best, stage projection, redline and rpm colour,
//! unit conversion and assist states.
//!
//! # Sources
//!
//! - **Shared memory**: three fixed-layout pages (`acpmf_physics`,
//!   `acpmf_graphics`, `acpmf_static`) decoded by [`fixed`]
//! - **Network**: UDP datagrams whose layout comes from the game's JSON
//!   descriptors, resolved by [`schema`] and decoded by [`DynamicFrame`]
//!
//! # Pipeline
//!
//! A [`SourceAdapter`] is polled once per tick; the [`Normalizer`] maps its
//! [`RawRecord`] to a snapshot; the [`MetricsCalculator`] derives metrics; the
//! [`Engine`] hands the resulting [`FrameOutput`] to a [`Renderer`].
//!
//! ```rust,no_run
//! use pacenote::config::DashConfig;
//! use pacenote::{Engine, FrameOutput};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> pacenote::Result<()> {
//!     let config = DashConfig::load("pacenote.yaml")?;
//!     let mut engine = Engine::from_config(&config).await?;
//!
//!     let mut renderer = |frame: &FrameOutput| {
//!         if let Some(metrics) = &frame.metrics {
//!             println!("{} {:.0} {}", metrics.gear_label, metrics.display_speed, metrics.speed_unit.label());
//!         }
//!     };
//!     engine.run(&mut renderer, CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod adapters;
mod dynamic_frame;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoders
pub mod fixed;
pub mod schema;

// Sources and the engine loop
pub mod config;
pub mod engine;
pub mod metrics;
pub mod provider;
pub mod providers;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use adapters::Normalizer;
pub use dynamic_frame::*;
pub use error::*;
pub use types::*;

// Pipeline exports
pub use engine::{Engine, EngineHandle, EngineStats, FrameOutput, Renderer};
pub use fixed::{FixedFrame, FixedLayout};
pub use metrics::{DerivedMetrics, MetricsCalculator};
pub use provider::{Availability, SourceAdapter, SourcePoll};
pub use providers::{NetworkSource, SharedMemorySource};
pub use schema::{DecodePlan, SchemaLoader};
