// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::var_int;

/// Reply code the Server grants in the CONNACK variable header byte 2.
///
/// Only 0..5 are defined by the spec; any other byte is still surfaced
/// (as `Other`) rather than rejected, so an otherwise well-formed CONNACK
/// from a server using a return code this crate doesn't know about is still
/// delivered to the callback.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectReturnCode {
    Accepted,
    UnacceptableProtocolVersion,
    IdentifierRejected,
    ServerUnavailable,
    BadUserNameOrPassword,
    NotAuthorized,
    Other(u8),
}

impl ConnectReturnCode {
    fn from_byte(v: u8) -> Self {
        match v {
            0 => Self::Accepted,
            1 => Self::UnacceptableProtocolVersion,
            2 => Self::IdentifierRejected,
            3 => Self::ServerUnavailable,
            4 => Self::BadUserNameOrPassword,
            5 => Self::NotAuthorized,
            other => Self::Other(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Accepted => 0,
            Self::UnacceptableProtocolVersion => 1,
            Self::IdentifierRejected => 2,
            Self::ServerUnavailable => 3,
            Self::BadUserNameOrPassword => 4,
            Self::NotAuthorized => 5,
            Self::Other(v) => v,
        }
    }
}

/// Parsed CONNACK variable header: session-present flag and return code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectAckPacket {
    pub session_present: bool,
    pub return_code: ConnectReturnCode,
}

impl ConnectAckPacket {
    /// # Errors
    /// [`DecodeError::InvalidPacketFlags`] if the reserved bits of the
    /// session-present byte are set. The return code byte never fails to
    /// decode — an undefined value surfaces as [`ConnectReturnCode::Other`].
    pub fn decode(ba: &mut ByteArray<'_>) -> Result<Self, DecodeError> {
        let ack_flags = ba.read_byte()?;
        if ack_flags & 0b1111_1110 != 0 {
            return Err(DecodeError::InvalidPacketFlags);
        }
        let session_present = ack_flags & 0b0000_0001 != 0;
        let return_code = ConnectReturnCode::from_byte(ba.read_byte()?);
        Ok(Self {
            session_present,
            return_code,
        })
    }

    /// # Errors
    /// Never fails; returns `Result` for symmetry with the other encoders.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(FixedHeader::encode_first_byte(
            PacketType::ConnectAck,
            HeaderFlags::default(),
        ));
        var_int::encode(2, buf)?;
        buf.push(u8::from(self.session_present));
        buf.push(self.return_code.to_byte());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_spec_vector_accepted_no_session() {
        // Full wire bytes `20 02 00 00`; body is the last two.
        let buf = [0x00, 0x00];
        let mut ba = ByteArray::new(&buf);
        let ack = ConnectAckPacket::decode(&mut ba).unwrap();
        assert!(!ack.session_present);
        assert_eq!(ack.return_code, ConnectReturnCode::Accepted);
    }

    #[test]
    fn decodes_accepted_with_session_present() {
        let buf = [0x01, 0x00];
        let mut ba = ByteArray::new(&buf);
        let ack = ConnectAckPacket::decode(&mut ba).unwrap();
        assert!(ack.session_present);
        assert_eq!(ack.return_code, ConnectReturnCode::Accepted);
    }

    #[test]
    fn surfaces_undefined_return_code_instead_of_rejecting() {
        let buf = [0x00, 0x2A];
        let mut ba = ByteArray::new(&buf);
        let ack = ConnectAckPacket::decode(&mut ba).unwrap();
        assert_eq!(ack.return_code, ConnectReturnCode::Other(0x2A));
    }

    #[test]
    fn rejects_reserved_bits() {
        let buf = [0x02, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            ConnectAckPacket::decode(&mut ba),
            Err(DecodeError::InvalidPacketFlags)
        );
    }

    #[test]
    fn round_trips() {
        let ack = ConnectAckPacket {
            session_present: false,
            return_code: ConnectReturnCode::NotAuthorized,
        };
        let mut buf = Vec::new();
        ack.encode(&mut buf).unwrap();
        let mut ba = ByteArray::new(&buf[2..]);
        assert_eq!(ConnectAckPacket::decode(&mut ba).unwrap(), ack);
    }
}
