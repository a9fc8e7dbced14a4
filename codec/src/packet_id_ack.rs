// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::var_int;

/// Shared wire shape of PUBACK, PUBREC, PUBREL, PUBCOMP and UNSUBACK: a fixed
/// header followed by nothing but the 2-byte packet id.
///
/// # Errors
/// [`DecodeError::InvalidPacketLength`] if `remaining_length` isn't exactly
/// 2.
pub fn decode(ba: &mut ByteArray<'_>, remaining_length: u32) -> Result<u16, DecodeError> {
    if remaining_length != 2 {
        return Err(DecodeError::InvalidPacketLength);
    }
    ba.read_u16()
}

/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode(
    packet_type: PacketType,
    flags: HeaderFlags,
    packet_id: u16,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    buf.push(FixedHeader::encode_first_byte(packet_type, flags));
    var_int::encode(2, buf)?;
    buf.extend_from_slice(&packet_id.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let mut buf = Vec::new();
        encode(PacketType::PublishAck, HeaderFlags::default(), 42, &mut buf).unwrap();
        let mut ba = ByteArray::new(&buf[2..]);
        assert_eq!(decode(&mut ba, 2).unwrap(), 42);
    }

    #[test]
    fn rejects_wrong_remaining_length() {
        let buf = [0x00, 0x01, 0x02];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(decode(&mut ba, 3), Err(DecodeError::InvalidPacketLength));
    }
}
