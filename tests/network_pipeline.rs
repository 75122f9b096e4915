//! End to end: descriptor documents, a real UDP socket, the engine and its
//! derived metrics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use pacenote::metrics::{DistanceUnit, InterventionState, LapDelta, SpeedUnit, UnitSystem, format_delta};
use pacenote::schema::SESSION_UPDATE_PACKET;
use pacenote::{
    DecodePlan, DynamicDecoder, Engine, EngineHandle, MetricsCalculator, NetworkSource, Normalizer, SchemaLoader,
    SourceAdapter, Value,
};
use tokio::net::UdpSocket;

fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

fn load_plan() -> Arc<DecodePlan> {
    Arc::new(
        SchemaLoader::load(fixture("channels.json"), fixture("udp/wrc.json"), SESSION_UPDATE_PACKET)
            .expect("fixture schema should load"),
    )
}

/// A mid-stage datagram: 62 s into a stage whose best is 120 s, half way.
fn mid_stage_datagram(plan: &DecodePlan, packet_uid: u64) -> Vec<u8> {
    plan.encode(&[
        Value::UInt64(packet_uid),
        Value::Float32(300.0),  // game_total_time
        Value::Float32(161.0),  // speed
        Value::Float32(6000.0), // rpm
        Value::Float32(8000.0), // max_rpm
        Value::Int8(4),         // gear
        Value::Float32(0.75),   // throttle
        Value::Float32(0.0),    // brake
        Value::Bool(false),     // handbrake
        Value::Float64(62.0),   // stage_current_time
        Value::Float64(120.0),  // stage_best_time
        Value::Float32(50.0),   // stage_progress
        Value::Float64(4200.0), // distance_completed
        Value::Float32(0.25),   // tc_intervention
        Value::Float32(0.0),    // abs_intervention
        Value::Float32(0.5),    // engine_damage
        Value::Float32(0.25),   // tyre_wear_average
        Value::Float32(0.125),  // suspension_damage
        Value::UInt8(1),        // flat_tyres
    ])
    .expect("values match the fixture layout")
}

async fn network_engine(units: UnitSystem) -> (Engine<NetworkSource>, UdpSocket) {
    let plan = load_plan();
    let normalizer = Normalizer::new(&plan);
    let source = NetworkSource::bind(
        "127.0.0.1:0".parse().unwrap(),
        DynamicDecoder::new(plan),
        Duration::from_millis(500),
    )
    .await
    .unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.connect(source.local_addr().unwrap()).await.unwrap();

    let engine = Engine::new(source, normalizer, MetricsCalculator::new(units), Duration::from_millis(5));
    (engine, sender)
}

#[tokio::test]
async fn datagram_becomes_dashboard_frame() {
    let (mut engine, sender) = network_engine(UnitSystem::Metric).await;
    let plan = load_plan();
    sender.send(&mid_stage_datagram(&plan, 1)).await.unwrap();

    let frame = engine.tick().await.unwrap().clone();
    assert!(frame.source_available);

    let snapshot = frame.snapshot.expect("snapshot after a datagram");
    assert_eq!(snapshot.speed_kph, 161.0);
    assert_eq!(snapshot.gear, 4);
    assert_eq!(snapshot.current_lap_ms, 62_000);
    assert_eq!(snapshot.best_lap_ms, 120_000);
    assert_eq!(snapshot.static_max_rpm, 8000.0);
    assert_eq!(snapshot.flat_tyre_count, 1);
    assert_eq!(snapshot.engine_damage_pct, 50.0);
    assert_eq!(snapshot.suspension_damage_max_pct, 12.5);

    let metrics = frame.metrics.expect("metrics after a datagram");
    assert_eq!(metrics.rpm_ratio, 0.75);
    assert_eq!(metrics.effective_max_rpm, 8000.0);
    assert_eq!(metrics.lap_delta, LapDelta::Valid(2000));
    assert_eq!(format_delta(metrics.lap_delta), "+2.000");
    assert_eq!(metrics.estimated_stage_ms, Some(124_000));
    assert_eq!(metrics.progress_pct, 50.0);
    assert_eq!(metrics.display_distance, 4.2);
    assert_eq!(metrics.speed_unit, SpeedUnit::Kph);
    assert_eq!(metrics.gear_label, "4");
    assert_eq!(metrics.traction_control, InterventionState::Active);
    assert_eq!(metrics.abs, InterventionState::Off);
    assert!(!metrics.shift_light);
}

#[tokio::test]
async fn imperial_units_convert_speed_and_distance() {
    let (mut engine, sender) = network_engine(UnitSystem::Imperial).await;
    sender.send(&mid_stage_datagram(&load_plan(), 1)).await.unwrap();

    let metrics = engine.tick().await.unwrap().metrics.clone().unwrap();
    assert_eq!(metrics.speed_unit, SpeedUnit::Mph);
    assert_eq!(metrics.distance_unit, DistanceUnit::Mi);
    assert!((metrics.display_speed - 161.0 / 1.609).abs() < 1e-9);
    assert!((metrics.display_distance - 4.2 / 1.609).abs() < 1e-9);
}

#[tokio::test]
async fn quiet_socket_holds_last_frame_then_short_datagram_is_ignored() {
    let (mut engine, sender) = network_engine(UnitSystem::Metric).await;
    let plan = load_plan();

    assert!(!engine.tick().await.unwrap().source_available);

    sender.send(&mid_stage_datagram(&plan, 1)).await.unwrap();
    let first = engine.tick().await.unwrap().clone();
    assert!(first.has_data());

    // Nothing new: the previous frame stays on screen.
    assert_eq!(engine.tick().await.unwrap(), &first);

    // Truncated datagram is discarded without an error.
    let datagram = mid_stage_datagram(&plan, 2);
    sender.send(&datagram[..datagram.len() - 1]).await.unwrap();
    assert_eq!(engine.tick().await.unwrap(), &first);

    let (received, discarded) = engine.source().counts();
    assert_eq!(received, 1);
    assert_eq!(discarded, 1);
    assert!(engine.source().availability().is_available());
}

#[tokio::test]
async fn handle_publishes_frames_to_subscribers() {
    let (engine, sender) = network_engine(UnitSystem::Metric).await;
    let handle = EngineHandle::spawn(engine);
    let mut frames = handle.stream();

    let initial = frames.next().await.unwrap();
    assert!(!initial.has_data());

    sender.send(&mid_stage_datagram(&load_plan(), 7)).await.unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = frames.next().await.expect("engine still running");
            if frame.has_data() {
                return frame;
            }
        }
    })
    .await
    .expect("frame published within timeout");

    assert_eq!(frame.metrics.as_ref().unwrap().lap_delta, LapDelta::Valid(2000));
    assert_eq!(handle.latest(), frame);

    let stats = handle.stop().await.unwrap();
    assert!(stats.records >= 1);
}
