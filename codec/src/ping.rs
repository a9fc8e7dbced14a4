// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::var_int;

/// PINGREQ and PINGRESP both have an empty variable header and payload —
/// the fixed header alone is the whole packet.
///
/// # Errors
/// [`DecodeError::InvalidRemainingLength`] if `remaining_length` isn't 0.
pub fn decode_empty_body(remaining_length: u32) -> Result<(), DecodeError> {
    if remaining_length == 0 {
        Ok(())
    } else {
        Err(DecodeError::InvalidRemainingLength)
    }
}

/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_request(buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    buf.push(FixedHeader::encode_first_byte(
        PacketType::PingRequest,
        HeaderFlags::default(),
    ));
    var_int::encode(0, buf)
}

/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_response(buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    buf.push(FixedHeader::encode_first_byte(
        PacketType::PingResponse,
        HeaderFlags::default(),
    ));
    var_int::encode(0, buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_two_bytes() {
        let mut buf = Vec::new();
        encode_request(&mut buf).unwrap();
        assert_eq!(buf, [0xC0, 0x00]);
    }

    #[test]
    fn response_is_two_bytes() {
        let mut buf = Vec::new();
        encode_response(&mut buf).unwrap();
        assert_eq!(buf, [0xD0, 0x00]);
    }

    #[test]
    fn rejects_nonzero_remaining_length() {
        assert_eq!(
            decode_empty_body(1),
            Err(DecodeError::InvalidRemainingLength)
        );
    }
}
