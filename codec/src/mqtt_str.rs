// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};

/// Decode a length-prefixed MQTT string: a 16-bit big-endian length followed
/// by that many UTF-8 bytes. Not NUL-terminated on the wire.
///
/// When `required_non_empty` is set, a declared length of 0 is rejected —
/// used for fields the protocol requires non-empty (publish topic,
/// subscribe/unsubscribe filters).
///
/// # Errors
/// [`DecodeError::OutOfRange`] if fewer than 2 bytes remain for the length
/// prefix or the declared length exceeds the remaining body;
/// [`DecodeError::InvalidString`] if the prefix is 0 and `required_non_empty`
/// is set, or the bytes are not valid UTF-8.
pub fn decode_str<'a>(
    ba: &mut ByteArray<'a>,
    required_non_empty: bool,
) -> Result<&'a str, DecodeError> {
    let len = ba.read_u16()?;
    if required_non_empty && len == 0 {
        return Err(DecodeError::InvalidString);
    }
    ba.read_str(len as usize)
}

/// Encode `s` as a length-prefixed MQTT string: two bytes of big-endian
/// length, then the raw UTF-8 bytes. An empty string encodes as two zero
/// bytes and nothing else.
///
/// # Errors
/// [`EncodeError::InvalidData`] if `s` is longer than 65,535 bytes.
pub fn encode_str(s: &str, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    if s.len() > u16::from(u16::MAX) as usize {
        return Err(EncodeError::InvalidData("string exceeds 65535 bytes"));
    }
    #[allow(clippy::cast_possible_truncation)]
    let len = s.len() as u16;
    buf.write_u16::<BigEndian>(len)
        .expect("writing to Vec<u8> is infallible");
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Byte length `s` would occupy once encoded, including the 2-byte prefix.
#[must_use]
pub const fn encoded_len(s: &str) -> usize {
    2 + s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_non_empty() {
        let mut buf = Vec::new();
        encode_str("a/b", &mut buf).unwrap();
        assert_eq!(buf, [0x00, 0x03, b'a', b'/', b'b']);
        let mut ba = ByteArray::new(&buf);
        assert_eq!(decode_str(&mut ba, false).unwrap(), "a/b");
    }

    #[test]
    fn empty_string_is_two_zero_bytes() {
        let mut buf = Vec::new();
        encode_str("", &mut buf).unwrap();
        assert_eq!(buf, [0x00, 0x00]);
    }

    #[test]
    fn required_non_empty_rejects_zero_length() {
        let buf = [0x00, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(decode_str(&mut ba, true), Err(DecodeError::InvalidString));
    }

    #[test]
    fn declared_length_past_body_is_out_of_range() {
        let buf = [0x00, 0x05, b'h', b'i'];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(decode_str(&mut ba, false), Err(DecodeError::OutOfRange));
    }
}
