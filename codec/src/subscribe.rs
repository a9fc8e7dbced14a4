// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::mqtt_str;
use crate::qos::QoS;
use crate::topic;
use crate::var_int;

/// Parsed SUBSCRIBE packet: packet id plus a non-empty list of (topic
/// filter, requested QoS) pairs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscribePacket<'a> {
    pub packet_id: u16,
    pub topics: Vec<(&'a str, QoS)>,
}

impl<'a> SubscribePacket<'a> {
    /// # Errors
    /// [`DecodeError::EmptyTopics`] if the body names zero topics;
    /// propagates string- and QoS-decode errors otherwise.
    pub fn decode(ba: &mut ByteArray<'a>, remaining_length: u32) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let packet_id = ba.read_u16()?;
        let mut topics = Vec::new();
        while (ba.offset() - start) < remaining_length as usize {
            let topic = mqtt_str::decode_str(ba, true)?;
            let qos = QoS::try_from(ba.read_byte()? & 0b0000_0011)?;
            topics.push((topic, qos));
        }
        if topics.is_empty() {
            return Err(DecodeError::EmptyTopics);
        }
        Ok(Self { packet_id, topics })
    }

    /// # Errors
    /// [`EncodeError::InvalidData`] if `topics` is empty or any topic filter
    /// is syntactically invalid (empty, or a malformed wildcard).
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.topics.is_empty() {
            return Err(EncodeError::InvalidData("subscribe list must not be empty"));
        }
        let mut remaining_length = 2;
        for (filter, _) in &self.topics {
            topic::validate_filter(filter)?;
            remaining_length += mqtt_str::encoded_len(filter) + 1;
        }
        let remaining_length =
            u32::try_from(remaining_length).map_err(|_| EncodeError::InvalidVarInt)?;

        buf.push(FixedHeader::encode_first_byte(
            PacketType::Subscribe,
            HeaderFlags::default(),
        ));
        var_int::encode(remaining_length, buf)?;
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
        for (topic, qos) in &self.topics {
            mqtt_str::encode_str(topic, buf)?;
            buf.push(u8::from(*qos));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_topics_matches_spec_vector() {
        let packet = SubscribePacket {
            packet_id: 1,
            topics: vec![("a", QoS::AtLeastOnce), ("b", QoS::AtLeastOnce)],
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                0x82, 0x0C, 0x00, 0x01, 0x00, 0x01, b'a', 0x01, 0x00, 0x01, b'b', 0x01
            ]
        );
    }

    #[test]
    fn rejects_empty_topic_list() {
        let packet = SubscribePacket {
            packet_id: 1,
            topics: vec![],
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn rejects_malformed_wildcard_filter() {
        let packet = SubscribePacket {
            packet_id: 1,
            topics: vec![("a/b#", QoS::AtMostOnce)],
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn decode_rejects_empty_topic_list() {
        let buf = [0x00, 0x01];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            SubscribePacket::decode(&mut ba, 2),
            Err(DecodeError::EmptyTopics)
        );
    }

    #[test]
    fn round_trips() {
        let packet = SubscribePacket {
            packet_id: 7,
            topics: vec![("a/b", QoS::ExactOnce)],
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        let mut ba = ByteArray::new(&buf[2..]);
        let remaining_length = (buf.len() - 2) as u32;
        assert_eq!(
            SubscribePacket::decode(&mut ba, remaining_length).unwrap(),
            packet
        );
    }
}
