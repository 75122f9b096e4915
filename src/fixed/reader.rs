//! Sequential little-endian reader over one fixed-size page

use crate::DecodeError;
use crate::types::VarData;

/// Cursor that walks a page field by field.
///
/// Every read advances by the field's packed width; explicit padding is
/// skipped with [`PageReader::pad`]. A read past the end reports the page as
/// undersized rather than panicking.
pub(crate) struct PageReader<'a> {
    data: &'a [u8],
    offset: usize,
    layout: &'static str,
    expected: usize,
}

impl<'a> PageReader<'a> {
    pub(crate) fn new(data: &'a [u8], layout: &'static str, expected: usize) -> Self {
        Self { data, offset: 0, layout, expected }
    }

    pub(crate) fn position(&self) -> usize {
        self.offset
    }

    fn undersized(&self) -> DecodeError {
        DecodeError::SizeMismatch {
            layout: self.layout,
            expected: self.expected,
            actual: self.data.len(),
        }
    }

    pub(crate) fn read<T: VarData>(&mut self) -> Result<T, DecodeError> {
        let value = T::read_le(self.data, self.offset).ok_or_else(|| self.undersized())?;
        self.offset += T::WIDTH;
        Ok(value)
    }

    pub(crate) fn array<T: VarData + Copy + Default, const N: usize>(
        &mut self,
    ) -> Result<[T; N], DecodeError> {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = self.read()?;
        }
        Ok(out)
    }

    /// Read a NUL-padded UTF-16LE text slot of `chars` code units.
    ///
    /// Decoding stops at the first NUL or the first unpaired surrogate; the
    /// cursor always advances by the full slot.
    pub(crate) fn wide_str(&mut self, chars: usize) -> Result<String, DecodeError> {
        let mut units = Vec::with_capacity(chars);
        for _ in 0..chars {
            units.push(self.read::<u16>()?);
        }

        let text = char::decode_utf16(units.into_iter().take_while(|unit| *unit != 0))
            .map_while(|decoded| decoded.ok())
            .collect();
        Ok(text)
    }

    pub(crate) fn pad(&mut self, bytes: usize) -> Result<(), DecodeError> {
        let end = self.offset + bytes;
        if end > self.data.len() {
            return Err(self.undersized());
        }
        self.offset = end;
        Ok(())
    }
}
