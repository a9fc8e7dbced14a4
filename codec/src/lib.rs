// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

//! MQTT 3.1.1 wire format: the fixed header, the variable-length integer,
//! and the encoders/decoders for each of the 14 control packet types.
//!
//! Decoding is zero-copy: every string or byte slice a decoded packet
//! exposes borrows directly from the buffer it was parsed out of. Encoding
//! writes into a caller-supplied `Vec<u8>`.

mod byte_array;
mod connect;
mod connect_ack;
mod connect_flags;
mod disconnect;
mod error;
mod header;
mod mqtt_str;
mod packet;
mod packet_id_ack;
mod ping;
mod publish;
mod qos;
mod subscribe;
mod subscribe_ack;
mod topic;
mod unsubscribe;
mod var_int;

pub use byte_array::ByteArray;
pub use connect::{ConnectBuilder, ConnectPacket};
pub use connect_ack::{ConnectAckPacket, ConnectReturnCode};
pub use connect_flags::ConnectFlags;
pub use error::{DecodeError, EncodeError};
pub use header::{decode_type_and_flags, required_flags, FixedHeader, HeaderFlags, PacketType};
pub use packet::{decode_body, IncomingPacket};
pub use publish::PublishPacket;
pub use qos::QoS;
pub use subscribe::SubscribePacket;
pub use subscribe_ack::{SubscribeAckPacket, SubscribeReturnCode};
pub use topic::{validate_filter, validate_publish_topic};
pub use unsubscribe::UnsubscribePacket;
pub use var_int::{
    decode as decode_remaining_length, encode as encode_remaining_length,
    encoded_len as remaining_length_encoded_len, RemainingLengthAccumulator,
    MAX_REMAINING_LENGTH,
};

/// Encode a PINGREQ packet.
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_ping_request(buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    ping::encode_request(buf)
}

/// Encode a PINGRESP packet.
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_ping_response(buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    ping::encode_response(buf)
}

/// Encode a DISCONNECT packet.
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_disconnect(buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    disconnect::encode(buf)
}

/// Encode a PUBACK/PUBREC/PUBCOMP/UNSUBACK-shaped packet: fixed header plus
/// a bare 2-byte packet id.
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_packet_id_only(
    packet_type: PacketType,
    packet_id: u16,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    packet_id_ack::encode(packet_type, HeaderFlags::default(), packet_id, buf)
}

/// Encode a PUBREL packet, whose fixed header reserves flag bit 1.
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode_publish_release(packet_id: u16, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    let flags = HeaderFlags {
        dup: false,
        qos: QoS::AtMostOnce,
        retain: false,
    };
    packet_id_ack::encode(PacketType::PublishRelease, flags, packet_id, buf)
}
