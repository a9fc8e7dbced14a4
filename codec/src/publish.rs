// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::mqtt_str;
use crate::qos::QoS;
use crate::topic;
use crate::var_int;

/// Parsed PUBLISH packet. `topic` and `payload` borrow from the buffer the
/// packet was decoded out of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublishPacket<'a> {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub topic: &'a str,
    pub packet_id: Option<u16>,
    pub payload: &'a [u8],
}

impl<'a> PublishPacket<'a> {
    /// Decode the PUBLISH variable header and payload. `flags` is the fixed
    /// header's flag nibble already parsed into DUP/QoS/RETAIN by
    /// [`crate::header::decode_type_and_flags`]; `remaining_length` bounds how
    /// much of `ba` belongs to this packet's payload.
    ///
    /// A zero-length topic is not rejected here — MQTT treats that as a
    /// publish-time validation rule, not a parse-time one.
    ///
    /// # Errors
    /// Propagates [`crate::mqtt_str::decode_str`] and [`ByteArray::read_u16`]
    /// errors. Returns [`DecodeError::InvalidPacketLength`] if
    /// `remaining_length` is smaller than the bytes consumed decoding the
    /// topic (and packet id, for QoS > 0).
    pub fn decode(
        ba: &mut ByteArray<'a>,
        flags: HeaderFlags,
        remaining_length: u32,
    ) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let topic = mqtt_str::decode_str(ba, false)?;
        let packet_id = if flags.qos == QoS::AtMostOnce {
            None
        } else {
            Some(ba.read_u16()?)
        };
        let consumed = ba.offset() - start;
        let consumed = u32::try_from(consumed).map_err(|_| DecodeError::InvalidPacketLength)?;
        if consumed > remaining_length {
            return Err(DecodeError::InvalidPacketLength);
        }
        let payload_len = (remaining_length - consumed) as usize;
        let payload = ba.read_bytes(payload_len)?;

        Ok(Self {
            dup: flags.dup,
            qos: flags.qos,
            retain: flags.retain,
            topic,
            packet_id,
            payload,
        })
    }

    /// Encode this PUBLISH onto `buf`. `packet_id` must be `Some` for QoS > 0
    /// and `None` for QoS 0; callers allocate the id from the owning
    /// instance's counter before calling this.
    ///
    /// # Errors
    /// [`EncodeError::InvalidData`] if `topic` is empty or contains a
    /// wildcard character, or `packet_id`'s presence disagrees with `qos`.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        topic::validate_publish_topic(self.topic)?;
        if (self.qos == QoS::AtMostOnce) != self.packet_id.is_none() {
            return Err(EncodeError::InvalidData(
                "packet id presence disagrees with QoS",
            ));
        }

        let packet_id_len = if self.packet_id.is_some() { 2 } else { 0 };
        let remaining_length = mqtt_str::encoded_len(self.topic) + packet_id_len + self.payload.len();
        let remaining_length =
            u32::try_from(remaining_length).map_err(|_| EncodeError::InvalidVarInt)?;

        let flags = HeaderFlags {
            dup: self.dup,
            qos: self.qos,
            retain: self.retain,
        };
        buf.push(FixedHeader::encode_first_byte(PacketType::Publish, flags));
        var_int::encode(remaining_length, buf)?;
        mqtt_str::encode_str(self.topic, buf)?;
        if let Some(packet_id) = self.packet_id {
            buf.write_u16::<BigEndian>(packet_id)
                .expect("writing to Vec<u8> is infallible");
        }
        buf.extend_from_slice(self.payload);
        Ok(())
    }
}
