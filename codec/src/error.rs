// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use std::fmt;

/// Failure decoding bytes into a packet or a wire primitive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// Fewer bytes remain than a field declares it needs.
    OutOfRange,

    /// A `Remaining Length` field required a fifth continuation byte.
    InvalidVarInt,

    /// High nibble of the first fixed-header byte is not 1..14.
    InvalidPacketType,

    /// Reserved flag bits in the fixed header did not match the fixed value
    /// the protocol requires for this packet type.
    InvalidPacketFlags,

    /// `QoS` byte was not 0, 1 or 2.
    InvalidQoS,

    /// Packet body was not valid UTF-8 where a string was expected.
    InvalidString,

    /// Body length did not match what this packet type requires
    /// (e.g. CONNACK body must be exactly 2 bytes).
    InvalidPacketLength,

    /// SUBSCRIBE/UNSUBSCRIBE body named zero topics.
    EmptyTopics,

    /// Decoded `Remaining Length` exceeds the MQTT-spec maximum
    /// (268,435,455) or this packet's declared body is otherwise malformed.
    InvalidRemainingLength,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::OutOfRange => "ran out of bytes while decoding",
            Self::InvalidVarInt => "malformed variable-length integer",
            Self::InvalidPacketType => "invalid packet type",
            Self::InvalidPacketFlags => "invalid fixed header flags",
            Self::InvalidQoS => "invalid QoS value",
            Self::InvalidString => "invalid UTF-8 string",
            Self::InvalidPacketLength => "invalid packet body length",
            Self::EmptyTopics => "empty topic list",
            Self::InvalidRemainingLength => "remaining length exceeds protocol maximum",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for DecodeError {}

/// Failure building bytes for an outbound packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    /// A required string or combination of CONNECT flags was missing.
    InvalidData(&'static str),

    /// Computed `Remaining Length` exceeds the MQTT-spec maximum.
    InvalidVarInt,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidData(reason) => write!(f, "invalid packet data: {reason}"),
            Self::InvalidVarInt => f.write_str("remaining length exceeds protocol maximum"),
        }
    }
}

impl std::error::Error for EncodeError {}
