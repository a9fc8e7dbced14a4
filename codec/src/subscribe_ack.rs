// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::qos::QoS;
use crate::var_int;

/// Per-topic SUBACK result: the granted QoS, or failure (`0x80`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscribeReturnCode {
    Success(QoS),
    Failure,
}

impl SubscribeReturnCode {
    fn decode_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0x80 => Ok(Self::Failure),
            0x00..=0x02 => Ok(Self::Success(QoS::try_from(byte)?)),
            _ => Err(DecodeError::InvalidPacketLength),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Success(qos) => u8::from(qos),
            Self::Failure => 0x80,
        }
    }
}

/// Parsed SUBACK: packet id plus one return code per topic in the matching
/// SUBSCRIBE, in the same order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscribeAckPacket {
    pub packet_id: u16,
    pub return_codes: Vec<SubscribeReturnCode>,
}

impl SubscribeAckPacket {
    /// # Errors
    /// [`DecodeError::InvalidPacketLength`] if `remaining_length` is fewer
    /// than 3 bytes (packet id plus at least one return code) or a return
    /// code byte is not 0x00/0x01/0x02/0x80.
    pub fn decode(ba: &mut ByteArray<'_>, remaining_length: u32) -> Result<Self, DecodeError> {
        if remaining_length < 3 {
            return Err(DecodeError::InvalidPacketLength);
        }
        let packet_id = ba.read_u16()?;
        let mut return_codes = Vec::new();
        for _ in 0..(remaining_length - 2) {
            return_codes.push(SubscribeReturnCode::decode_byte(ba.read_byte()?)?);
        }
        Ok(Self {
            packet_id,
            return_codes,
        })
    }

    /// # Errors
    /// Never fails; returns `Result` for symmetry with the other encoders.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let remaining_length = 2 + self.return_codes.len();
        let remaining_length =
            u32::try_from(remaining_length).map_err(|_| EncodeError::InvalidVarInt)?;
        buf.push(FixedHeader::encode_first_byte(
            PacketType::SubscribeAck,
            HeaderFlags::default(),
        ));
        var_int::encode(remaining_length, buf)?;
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
        for code in &self.return_codes {
            buf.push(code.to_byte());
        }
        Ok(())
    }
}
