// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::error::DecodeError;
use crate::qos::QoS;

/// The 14 MQTT 3.1.1 control packet kinds, numbered 1..14 as on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PacketType {
    Connect = 1,
    ConnectAck = 2,
    Publish = 3,
    PublishAck = 4,
    PublishReceived = 5,
    PublishRelease = 6,
    PublishComplete = 7,
    Subscribe = 8,
    SubscribeAck = 9,
    Unsubscribe = 10,
    UnsubscribeAck = 11,
    PingRequest = 12,
    PingResponse = 13,
    Disconnect = 14,
}

impl From<PacketType> for u8 {
    fn from(t: PacketType) -> Self {
        t as u8
    }
}

/// The byte-1 flag bits of the fixed header. Only PUBLISH gives DUP/QoS/RETAIN
/// wire meaning; every other packet type carries a fixed required nibble.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderFlags {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
}

impl HeaderFlags {
    const fn from_nibble_unchecked(nibble: u8) -> Self {
        Self {
            dup: nibble & 0b1000 != 0,
            qos: match (nibble & 0b0110) >> 1 {
                1 => QoS::AtLeastOnce,
                2 => QoS::ExactOnce,
                _ => QoS::AtMostOnce,
            },
            retain: nibble & 0b0001 != 0,
        }
    }

    #[must_use]
    pub fn to_nibble(self) -> u8 {
        let dup = u8::from(self.dup) << 3;
        let qos = u8::from(self.qos) << 1;
        let retain = u8::from(self.retain);
        dup | qos | retain
    }
}

/// Parse the type nibble and flags nibble of the first fixed-header byte.
///
/// Where a flag bit is reserved for a packet type, it must match the fixed
/// pattern the protocol requires for that type; a receiver that sees
/// anything else must close the connection (MQTT-2.2.2-1/2). PUBLISH is the
/// only type whose flag bits carry real information, and its QoS sub-field
/// rejects the reserved value `0b11`.
///
/// # Errors
/// [`DecodeError::InvalidPacketType`] if the high nibble is outside 1..14;
/// [`DecodeError::InvalidPacketFlags`] if the low nibble doesn't match what
/// this packet type requires, or PUBLISH declares QoS 3.
pub fn decode_type_and_flags(byte: u8) -> Result<(PacketType, HeaderFlags), DecodeError> {
    let type_bits = (byte & 0b1111_0000) >> 4;
    let flag = byte & 0b0000_1111;

    let packet_type = match type_bits {
        1 => PacketType::Connect,
        2 => PacketType::ConnectAck,
        3 => PacketType::Publish,
        4 => PacketType::PublishAck,
        5 => PacketType::PublishReceived,
        6 => PacketType::PublishRelease,
        7 => PacketType::PublishComplete,
        8 => PacketType::Subscribe,
        9 => PacketType::SubscribeAck,
        10 => PacketType::Unsubscribe,
        11 => PacketType::UnsubscribeAck,
        12 => PacketType::PingRequest,
        13 => PacketType::PingResponse,
        14 => PacketType::Disconnect,
        _ => {
            log::error!("header: invalid packet type nibble: {type_bits:#06b}");
            return Err(DecodeError::InvalidPacketType);
        }
    };

    if packet_type == PacketType::Publish {
        if flag & 0b0110 == 0b0110 {
            log::error!("header: publish declared reserved QoS 3");
            return Err(DecodeError::InvalidPacketFlags);
        }
        return Ok((packet_type, HeaderFlags::from_nibble_unchecked(flag)));
    }

    let required = required_flags(packet_type);
    if flag != required {
        log::error!("header: packet type {packet_type:?} got flags {flag:#06b}, expected {required:#06b}");
        return Err(DecodeError::InvalidPacketFlags);
    }
    Ok((packet_type, HeaderFlags::from_nibble_unchecked(flag)))
}

/// Fixed nibble of header flags required for packet types that don't carry
/// DUP/QoS/RETAIN. SUBSCRIBE, UNSUBSCRIBE and PUBREL reserve bit 1; every
/// other non-PUBLISH type reserves all four flag bits as zero.
#[must_use]
pub const fn required_flags(packet_type: PacketType) -> u8 {
    match packet_type {
        PacketType::Subscribe | PacketType::Unsubscribe | PacketType::PublishRelease => 0b0010,
        _ => 0b0000,
    }
}

/// Parsed fixed header: packet type, flag bits, and `Remaining Length`.
#[derive(Clone, Copy, Debug)]
pub struct FixedHeader {
    pub packet_type: PacketType,
    pub flags: HeaderFlags,
    pub remaining_length: u32,
}

impl FixedHeader {
    /// Encode the first byte (type nibble | flags nibble) of the fixed
    /// header. The caller is responsible for appending the `Remaining
    /// Length` bytes via [`crate::var_int::encode`].
    #[must_use]
    pub fn encode_first_byte(packet_type: PacketType, flags: HeaderFlags) -> u8 {
        let type_bits = u8::from(packet_type) << 4;
        let flag_bits = if packet_type == PacketType::Publish {
            flags.to_nibble()
        } else {
            required_flags(packet_type)
        };
        type_bits | flag_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_type_zero_and_fifteen() {
        assert_eq!(decode_type_and_flags(0x00), Err(DecodeError::InvalidPacketType));
        assert_eq!(decode_type_and_flags(0xF0), Err(DecodeError::InvalidPacketType));
    }

    #[test]
    fn subscribe_requires_reserved_bit() {
        assert_eq!(
            decode_type_and_flags(0b1000_0010).unwrap().0,
            PacketType::Subscribe
        );
        assert_eq!(
            decode_type_and_flags(0b1000_0000),
            Err(DecodeError::InvalidPacketFlags)
        );
    }

    #[test]
    fn publish_decodes_flags() {
        let (packet_type, flags) = decode_type_and_flags(0b0011_1101).unwrap();
        assert_eq!(packet_type, PacketType::Publish);
        assert!(flags.dup);
        assert_eq!(flags.qos, QoS::ExactOnce);
        assert!(flags.retain);
    }

    #[test]
    fn publish_rejects_qos_three() {
        assert_eq!(
            decode_type_and_flags(0b0011_0110),
            Err(DecodeError::InvalidPacketFlags)
        );
    }

    #[test]
    fn first_byte_round_trip() {
        let flags = HeaderFlags {
            dup: false,
            qos: QoS::AtLeastOnce,
            retain: true,
        };
        let byte = FixedHeader::encode_first_byte(PacketType::Publish, flags);
        let (packet_type, decoded) = decode_type_and_flags(byte).unwrap();
        assert_eq!(packet_type, PacketType::Publish);
        assert_eq!(decoded, flags);
    }

    #[test]
    fn ping_request_has_no_flags() {
        let byte = FixedHeader::encode_first_byte(PacketType::PingRequest, HeaderFlags::default());
        assert_eq!(byte, 0b1100_0000);
    }
}
