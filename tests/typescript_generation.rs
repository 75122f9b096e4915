//! TypeScript Generation Tests
//!
//! Validates that the frame types handed to a UI can be exported to
//! TypeScript when the tauri feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_frame_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, every type reachable from a frame is exportable.
    fn assert_type<T: Type>() {}

    assert_type::<pacenote::FrameOutput>();
    assert_type::<pacenote::TelemetrySnapshot>();
    assert_type::<pacenote::DerivedMetrics>();
    assert_type::<pacenote::metrics::LapDelta>();
    assert_type::<pacenote::metrics::Rgb>();
    assert_type::<pacenote::Availability>();
    assert_type::<pacenote::DecodePlan>();
    assert_type::<pacenote::ChannelType>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Frame types still build and serialize without specta::Type.
    let frame = pacenote::FrameOutput::standby();
    assert!(!frame.source_available);
}
