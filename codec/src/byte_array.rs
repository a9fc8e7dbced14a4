// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use byteorder::{BigEndian, ByteOrder};

use crate::error::DecodeError;

/// Read cursor over a borrowed byte slice.
///
/// Every `read_*` method advances the cursor and returns a view into the
/// original slice, not an owned copy — decoded packet fields borrow directly
/// from whatever buffer the `ByteArray` was built over (typically an
/// instance's receive buffer), per the zero-copy ownership model.
pub struct ByteArray<'a> {
    offset: usize,
    data: &'a [u8],
}

impl<'a> ByteArray<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { offset: 0, data }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes available to read past the current offset.
    #[must_use]
    pub const fn remaining_bytes(&self) -> usize {
        self.data.len() - self.offset
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// # Errors
    /// Returns [`DecodeError::OutOfRange`] if no byte remains.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.data.get(self.offset).ok_or(DecodeError::OutOfRange)?;
        self.offset += 1;
        Ok(byte)
    }

    /// # Errors
    /// Returns [`DecodeError::OutOfRange`] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    /// Read `len` raw bytes, advancing the cursor.
    ///
    /// # Errors
    /// Returns [`DecodeError::OutOfRange`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.offset.checked_add(len).ok_or(DecodeError::OutOfRange)?;
        if end > self.data.len() {
            return Err(DecodeError::OutOfRange);
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Read an MQTT string: `len` raw bytes validated as UTF-8.
    ///
    /// # Errors
    /// Returns [`DecodeError::OutOfRange`] if `len` exceeds the remaining
    /// body, or [`DecodeError::InvalidString`] if the bytes are not valid
    /// UTF-8.
    pub fn read_str(&mut self, len: usize) -> Result<&'a str, DecodeError> {
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidString)
    }
}
