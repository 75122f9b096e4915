//! End to end: fixed-layout pages in memory regions, the engine and its
//! derived metrics.

use std::time::Duration;

use pacenote::metrics::{InterventionState, LapDelta, UnitSystem};
use pacenote::providers::{MemoryOpener, MemoryRegion};
use pacenote::{Engine, MetricsCalculator, Normalizer, SharedMemorySource, SourceAdapter};

const PHYSICS_SIZE: usize = 276;
const GRAPHICS_SIZE: usize = 276;
const STATIC_SIZE: usize = 452;

fn put_i32(page: &mut [u8], offset: usize, value: i32) {
    page[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_f32(page: &mut [u8], offset: usize, value: f32) {
    page[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

struct Pages {
    physics: MemoryRegion,
    graphics: MemoryRegion,
}

fn physics_page(packet_id: i32, rpm: i32) -> Vec<u8> {
    let mut page = vec![0u8; PHYSICS_SIZE];
    put_i32(&mut page, 0, packet_id);
    put_f32(&mut page, 4, 1.0); // gas
    put_i32(&mut page, 16, 5); // fourth gear
    put_i32(&mut page, 20, rpm);
    put_f32(&mut page, 28, 142.0); // speed
    put_f32(&mut page, 204, 0.6); // tc
    put_f32(&mut page, 224, 0.25); // front damage
    put_f32(&mut page, 236, 0.5); // left damage
    put_i32(&mut page, 244, 2); // tyres out
    put_f32(&mut page, 252, 0.3); // abs
    page
}

fn graphics_page(packet_id: i32, current_ms: i32, best_ms: i32, progress: f32) -> Vec<u8> {
    let mut page = vec![0u8; GRAPHICS_SIZE];
    put_i32(&mut page, 0, packet_id);
    put_i32(&mut page, 140, current_ms);
    put_i32(&mut page, 148, best_ms);
    put_f32(&mut page, 156, 2500.0); // distance traveled
    put_f32(&mut page, 248, progress);
    page
}

fn static_page(max_rpm: i32) -> Vec<u8> {
    let mut page = vec![0u8; STATIC_SIZE];
    put_i32(&mut page, 412, max_rpm);
    page
}

fn publish(opener: &MemoryOpener, max_rpm: i32) -> Pages {
    let physics = opener.insert("acpmf_physics", physics_page(1, 7000));
    let graphics = opener.insert("acpmf_graphics", graphics_page(1, 45_000, 100_000, 0.5));
    opener.insert("acpmf_static", static_page(max_rpm));
    Pages { physics, graphics }
}

fn engine(opener: &MemoryOpener) -> Engine<SharedMemorySource> {
    let source = SharedMemorySource::new(Box::new(opener.clone()));
    Engine::new(source, Normalizer::default(), MetricsCalculator::new(UnitSystem::Metric), Duration::from_millis(16))
}

#[tokio::test]
async fn pages_become_dashboard_frame() {
    let opener = MemoryOpener::new();
    publish(&opener, 8000);
    let mut engine = engine(&opener);

    let frame = engine.tick().await.unwrap().clone();
    assert!(frame.source_available);

    let snapshot = frame.snapshot.unwrap();
    assert_eq!(snapshot.gear, 4);
    assert_eq!(snapshot.speed_kph, 142.0);
    assert_eq!(snapshot.current_lap_ms, 45_000);
    assert_eq!(snapshot.distance_meters, 2500.0);
    assert_eq!(snapshot.engine_damage_pct, 25.0);
    assert_eq!(snapshot.suspension_damage_max_pct, 50.0);
    assert_eq!(snapshot.flat_tyre_count, 2);

    let metrics = frame.metrics.unwrap();
    assert_eq!(metrics.rpm_ratio, 0.875);
    assert_eq!(metrics.lap_delta, LapDelta::Valid(-5000));
    assert_eq!(metrics.estimated_stage_ms, Some(90_000));
    assert_eq!(metrics.gear_label, "4");
    assert_eq!(metrics.traction_control, InterventionState::Heavy);
    assert_eq!(metrics.traction_control_label(), "TC !");
    assert_eq!(metrics.abs_label(), "ABS !");
}

#[tokio::test]
async fn producer_starting_late_moves_from_standby() {
    let opener = MemoryOpener::new();
    let mut engine = engine(&opener);

    let frame = engine.tick().await.unwrap();
    assert!(!frame.source_available);
    assert!(!frame.has_data());
    assert!(!engine.source().availability().is_available());

    publish(&opener, 8000);
    let frame = engine.tick().await.unwrap();
    assert!(frame.has_data());
    assert!(engine.source().availability().is_available());
}

#[tokio::test]
async fn unchanged_packet_ids_hold_the_frame() {
    let opener = MemoryOpener::new();
    let pages = publish(&opener, 8000);
    let mut engine = engine(&opener);

    let first = engine.tick().await.unwrap().clone();
    assert_eq!(engine.tick().await.unwrap(), &first);
    assert_eq!(engine.stats().records, 1);

    pages.physics.write(&physics_page(2, 7800));
    pages.graphics.write(&graphics_page(2, 46_000, 100_000, 0.5));
    let next = engine.tick().await.unwrap().clone();
    assert_eq!(next.snapshot.unwrap().rpm, 7800.0);
    assert!(next.metrics.unwrap().shift_light);
    assert_eq!(engine.stats().records, 2);
}

#[tokio::test]
async fn missing_redline_is_learned_from_rpm() {
    let opener = MemoryOpener::new();
    let pages = publish(&opener, 0);
    let mut engine = engine(&opener);

    let metrics = engine.tick().await.unwrap().metrics.clone().unwrap();
    assert_eq!(metrics.effective_max_rpm, 7000.0);
    assert_eq!(metrics.rpm_ratio, 1.0);

    pages.physics.write(&physics_page(2, 3500));
    let metrics = engine.tick().await.unwrap().metrics.clone().unwrap();
    assert_eq!(metrics.learned_max_rpm, 7000.0);
    assert_eq!(metrics.rpm_ratio, 0.5);
}
