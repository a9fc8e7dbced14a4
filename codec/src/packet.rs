// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::connect::ConnectPacket;
use crate::connect_ack::ConnectAckPacket;
use crate::error::DecodeError;
use crate::header::{HeaderFlags, PacketType};
use crate::ping;
use crate::publish::PublishPacket;
use crate::subscribe::SubscribePacket;
use crate::subscribe_ack::SubscribeAckPacket;
use crate::packet_id_ack;
use crate::unsubscribe::UnsubscribePacket;

/// A fully decoded packet body, tagged by the fixed header's packet type.
///
/// Every variant that carries string or byte slices borrows them from the
/// buffer the packet was decoded out of — valid only for the duration of the
/// call that produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum IncomingPacket<'a> {
    Connect(ConnectPacket<'a>),
    ConnectAck(ConnectAckPacket),
    Publish(PublishPacket<'a>),
    PublishAck { packet_id: u16 },
    PublishReceived { packet_id: u16 },
    PublishRelease { packet_id: u16 },
    PublishComplete { packet_id: u16 },
    Subscribe(SubscribePacket<'a>),
    SubscribeAck(SubscribeAckPacket),
    Unsubscribe(UnsubscribePacket<'a>),
    UnsubscribeAck { packet_id: u16 },
    PingRequest,
    PingResponse,
    Disconnect,
}

/// Decode the body that follows an already-parsed fixed header.
///
/// `ba` must be positioned at the first byte of the variable header, and
/// `remaining_length` is the value the fixed header declared (the caller is
/// responsible for having buffered at least that many bytes).
///
/// # Errors
/// Propagates whatever decode error the matching per-type decoder returns.
pub fn decode_body<'a>(
    packet_type: PacketType,
    flags: HeaderFlags,
    remaining_length: u32,
    ba: &mut ByteArray<'a>,
) -> Result<IncomingPacket<'a>, DecodeError> {
    match packet_type {
        PacketType::Connect => Ok(IncomingPacket::Connect(ConnectPacket::decode(ba)?)),
        PacketType::ConnectAck => Ok(IncomingPacket::ConnectAck(ConnectAckPacket::decode(ba)?)),
        PacketType::Publish => Ok(IncomingPacket::Publish(PublishPacket::decode(
            ba,
            flags,
            remaining_length,
        )?)),
        PacketType::PublishAck => Ok(IncomingPacket::PublishAck {
            packet_id: packet_id_ack::decode(ba, remaining_length)?,
        }),
        PacketType::PublishReceived => Ok(IncomingPacket::PublishReceived {
            packet_id: packet_id_ack::decode(ba, remaining_length)?,
        }),
        PacketType::PublishRelease => Ok(IncomingPacket::PublishRelease {
            packet_id: packet_id_ack::decode(ba, remaining_length)?,
        }),
        PacketType::PublishComplete => Ok(IncomingPacket::PublishComplete {
            packet_id: packet_id_ack::decode(ba, remaining_length)?,
        }),
        PacketType::Subscribe => Ok(IncomingPacket::Subscribe(SubscribePacket::decode(
            ba,
            remaining_length,
        )?)),
        PacketType::SubscribeAck => Ok(IncomingPacket::SubscribeAck(SubscribeAckPacket::decode(
            ba,
            remaining_length,
        )?)),
        PacketType::Unsubscribe => Ok(IncomingPacket::Unsubscribe(UnsubscribePacket::decode(
            ba,
            remaining_length,
        )?)),
        PacketType::UnsubscribeAck => Ok(IncomingPacket::UnsubscribeAck {
            packet_id: packet_id_ack::decode(ba, remaining_length)?,
        }),
        PacketType::PingRequest => {
            ping::decode_empty_body(remaining_length)?;
            Ok(IncomingPacket::PingRequest)
        }
        PacketType::PingResponse => {
            ping::decode_empty_body(remaining_length)?;
            Ok(IncomingPacket::PingResponse)
        }
        PacketType::Disconnect => {
            ping::decode_empty_body(remaining_length)?;
            Ok(IncomingPacket::Disconnect)
        }
    }
}
