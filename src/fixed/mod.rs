//! Fixed-layout shared memory pages.
//!
//! The shared-memory producer publishes three pages with hard-coded C layouts:
//!
//! | page | region | size |
//! |------|--------|------|
//! | [`PhysicsPage`] | `acpmf_physics` | 276 bytes |
//! | [`GraphicsPage`] | `acpmf_graphics` | 276 bytes |
//! | [`StaticPage`] | `acpmf_static` | 452 bytes |
//!
//! All primitives are 4-byte little-endian; text slots are NUL-padded UTF-16.
//! The producer packs to 4 bytes, so a 33-character text slot is followed by
//! two padding bytes before the next field. That padding is spelled out in the
//! decoder rather than left to a compiler's struct layout.
//!
//! Live regions are usually larger than these layouts (the producer appends
//! fields over time); sources hand the decoder the leading `SIZE` bytes.

mod pages;
mod reader;

pub use pages::{GraphicsPage, PhysicsPage, StaticPage};

use serde::Serialize;

use crate::DecodeError;
use reader::PageReader;

/// Version of the page layouts below. Any field change must bump this and be
/// agreed with the producer.
pub const FIXED_LAYOUT_VERSION: u32 = 1;

mod sealed {
    pub trait Sealed {}
}

/// A page with a hard-coded, versioned binary layout.
///
/// Implemented by the three pages of this module only.
pub trait FixedLayout: Sized + sealed::Sealed {
    /// Exact byte size of the layout.
    const SIZE: usize;
    /// Short page name used in errors and logs.
    const NAME: &'static str;
    /// Name of the shared memory region publishing this page.
    const REGION: &'static str;

    /// Decode a page, rejecting any buffer that is not exactly `SIZE` bytes.
    fn decode(data: &[u8]) -> Result<Self, DecodeError>;
}

/// Field-by-field reader behind [`FixedLayout::decode`].
pub(crate) trait ReadFields: FixedLayout {
    /// Read every field in layout order.
    fn read_fields(reader: &mut PageReader<'_>) -> Result<Self, DecodeError>;
}

fn decode_page<T: ReadFields>(data: &[u8]) -> Result<T, DecodeError> {
    if data.len() != T::SIZE {
        return Err(DecodeError::SizeMismatch { layout: T::NAME, expected: T::SIZE, actual: data.len() });
    }

    let mut reader = PageReader::new(data, T::NAME, T::SIZE);
    let page = T::read_fields(&mut reader)?;
    debug_assert_eq!(reader.position(), T::SIZE, "{} layout does not fill its size", T::NAME);
    Ok(page)
}

/// The three pages as read together on one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FixedFrame {
    pub physics: PhysicsPage,
    pub graphics: GraphicsPage,
    pub static_info: StaticPage,
}

impl FixedFrame {
    /// Decode all three pages.
    pub fn decode(physics: &[u8], graphics: &[u8], static_info: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            physics: PhysicsPage::decode(physics)?,
            graphics: GraphicsPage::decode(graphics)?,
            static_info: StaticPage::decode(static_info)?,
        })
    }

    /// Change detector for the frame; not a timestamp.
    pub fn packet_id(&self) -> i32 {
        self.physics.packet_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::PageBuilder;
    use proptest::prelude::*;

    #[test]
    fn layout_sizes_match_producer() {
        assert_eq!(PhysicsPage::SIZE, 276);
        assert_eq!(GraphicsPage::SIZE, 276);
        assert_eq!(StaticPage::SIZE, 452);
    }

    #[test]
    fn zeroed_pages_decode_to_defaults() {
        assert_eq!(PhysicsPage::decode(&[0; PhysicsPage::SIZE]).unwrap(), PhysicsPage::default());
        assert_eq!(GraphicsPage::decode(&[0; GraphicsPage::SIZE]).unwrap(), GraphicsPage::default());
        assert_eq!(StaticPage::decode(&[0; StaticPage::SIZE]).unwrap(), StaticPage::default());
    }

    #[test]
    fn physics_fields_land_at_producer_offsets() {
        let data = PageBuilder::new(PhysicsPage::SIZE)
            .i32(0, 981)
            .f32(4, 0.75)
            .f32(8, 0.25)
            .i32(16, 4)
            .i32(20, 6200)
            .f32(28, 143.5)
            .f32_array(120, &[91.0, 92.0, 93.0, 94.0])
            .f32(204, 0.3)
            .f32_array(224, &[0.1, 0.0, 0.2, 0.4, 0.3])
            .i32(244, 2)
            .f32(252, 0.6)
            .f32_array(268, &[0.05, 0.07])
            .build();

        let page = PhysicsPage::decode(&data).unwrap();
        assert_eq!(page.packet_id, 981);
        assert_eq!(page.gas, 0.75);
        assert_eq!(page.brake, 0.25);
        assert_eq!(page.gear, 4);
        assert_eq!(page.rpms, 6200);
        assert_eq!(page.speed_kmh, 143.5);
        assert_eq!(page.tyre_wear, [91.0, 92.0, 93.0, 94.0]);
        assert_eq!(page.tc, 0.3);
        assert_eq!(page.car_damage, [0.1, 0.0, 0.2, 0.4, 0.3]);
        assert_eq!(page.number_of_tyres_out, 2);
        assert_eq!(page.abs, 0.6);
        assert_eq!(page.ride_height, [0.05, 0.07]);
    }

    #[test]
    fn graphics_padding_follows_tyre_compound() {
        let data = PageBuilder::new(GraphicsPage::SIZE)
            .i32(0, 77)
            .wide(12, "1:02.345", 15)
            .i32(140, 62_345)
            .i32(148, 181_002)
            .f32(156, 1523.5)
            .wide(176, "Gravel Soft", 33)
            .bytes(242, &[0xFF, 0xFF])
            .f32(248, 0.42)
            .i32(272, 1)
            .build();

        let page = GraphicsPage::decode(&data).unwrap();
        assert_eq!(page.packet_id, 77);
        assert_eq!(page.current_time, "1:02.345");
        assert_eq!(page.i_current_time, 62_345);
        assert_eq!(page.i_best_time, 181_002);
        assert_eq!(page.distance_traveled, 1523.5);
        assert_eq!(page.tyre_compound, "Gravel Soft");
        assert_eq!(page.normalized_car_position, 0.42);
        assert_eq!(page.ideal_line_on, 1);
    }

    #[test]
    fn static_fields_follow_name_padding() {
        let data = PageBuilder::new(StaticPage::SIZE)
            .wide(0, "1.7", 15)
            .wide(30, "1.16.4", 15)
            .wide(68, "ks_lancia_delta", 33)
            .wide(134, "rally_finland", 33)
            .i32(412, 7800)
            .f32(416, 70.0)
            .f32_array(436, &[0.31, 0.31, 0.32, 0.32])
            .build();

        let page = StaticPage::decode(&data).unwrap();
        assert_eq!(page.sm_version, "1.7");
        assert_eq!(page.ac_version, "1.16.4");
        assert_eq!(page.car_model, "ks_lancia_delta");
        assert_eq!(page.track, "rally_finland");
        assert_eq!(page.max_rpm, 7800);
        assert_eq!(page.max_fuel, 70.0);
        assert_eq!(page.tyre_radius, [0.31, 0.31, 0.32, 0.32]);
    }

    #[test]
    fn wrong_sizes_are_rejected() {
        let err = PhysicsPage::decode(&[0; 275]).unwrap_err();
        assert_eq!(err, DecodeError::SizeMismatch { layout: "physics", expected: 276, actual: 275 });

        let err = StaticPage::decode(&[0; 1024]).unwrap_err();
        assert_eq!(err, DecodeError::SizeMismatch { layout: "static", expected: 452, actual: 1024 });
    }

    #[test]
    fn frame_decodes_all_pages() {
        let physics = PageBuilder::new(PhysicsPage::SIZE).i32(0, 12).build();
        let graphics = PageBuilder::new(GraphicsPage::SIZE).build();
        let static_info = PageBuilder::new(StaticPage::SIZE).i32(412, 9000).build();

        let frame = FixedFrame::decode(&physics, &graphics, &static_info).unwrap();
        assert_eq!(frame.packet_id(), 12);
        assert_eq!(frame.static_info.max_rpm, 9000);

        assert!(FixedFrame::decode(&physics, &graphics[..10], &static_info).is_err());
    }

    proptest! {
        #[test]
        fn prop_any_page_sized_buffer_decodes(
            physics in prop::collection::vec(any::<u8>(), PhysicsPage::SIZE),
            graphics in prop::collection::vec(any::<u8>(), GraphicsPage::SIZE),
            static_info in prop::collection::vec(any::<u8>(), StaticPage::SIZE),
        ) {
            prop_assert!(FixedFrame::decode(&physics, &graphics, &static_info).is_ok());
        }

        #[test]
        fn prop_other_sizes_never_decode(len in 0..1024usize) {
            prop_assume!(len != PhysicsPage::SIZE);
            let is_size_mismatch =
                matches!(PhysicsPage::decode(&vec![0; len]), Err(DecodeError::SizeMismatch { .. }));
            prop_assert!(is_size_mismatch);
        }
    }
}
