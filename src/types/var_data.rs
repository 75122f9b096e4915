//! Little-endian primitive extraction from raw telemetry buffers

/// Types that can be read from a little-endian byte buffer at an offset.
///
/// Both the fixed page layouts and the dynamic decode plans are read through
/// this trait, so every primitive is bounds-checked the same way.
pub trait VarData: Sized {
    /// Packed width of the type in bytes.
    const WIDTH: usize;

    /// Read a value starting at `offset`, or `None` if the buffer is too short.
    fn read_le(data: &[u8], offset: usize) -> Option<Self>;
}

macro_rules! impl_var_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl VarData for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn read_le(data: &[u8], offset: usize) -> Option<Self> {
                    let end = offset.checked_add(Self::WIDTH)?;
                    let bytes = data.get(offset..end)?;
                    Some(<$ty>::from_le_bytes(bytes.try_into().ok()?))
                }
            }
        )*
    };
}

impl_var_data!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl VarData for bool {
    const WIDTH: usize = 1;

    fn read_le(data: &[u8], offset: usize) -> Option<Self> {
        data.get(offset).map(|byte| *byte != 0)
    }
}
