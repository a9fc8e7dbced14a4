// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::mqtt_str;
use crate::topic;
use crate::var_int;

/// Parsed UNSUBSCRIBE packet: packet id plus a non-empty list of topic
/// filters to remove.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnsubscribePacket<'a> {
    pub packet_id: u16,
    pub topics: Vec<&'a str>,
}

impl<'a> UnsubscribePacket<'a> {
    /// # Errors
    /// [`DecodeError::EmptyTopics`] if the body names zero topics;
    /// propagates string-decode errors otherwise.
    pub fn decode(ba: &mut ByteArray<'a>, remaining_length: u32) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let packet_id = ba.read_u16()?;
        let mut topics = Vec::new();
        while (ba.offset() - start) < remaining_length as usize {
            topics.push(mqtt_str::decode_str(ba, true)?);
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
            return Err(EncodeError::InvalidData(
                "unsubscribe list must not be empty",
            ));
        }
        let mut remaining_length = 2;
        for filter in &self.topics {
            topic::validate_filter(filter)?;
            remaining_length += mqtt_str::encoded_len(filter);
        }
        let remaining_length =
            u32::try_from(remaining_length).map_err(|_| EncodeError::InvalidVarInt)?;

        buf.push(FixedHeader::encode_first_byte(
            PacketType::Unsubscribe,
            HeaderFlags::default(),
        ));
        var_int::encode(remaining_length, buf)?;
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
        for topic in &self.topics {
            mqtt_str::encode_str(topic, buf)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let packet = UnsubscribePacket {
            packet_id: 9,
            topics: vec!["a/b", "c"],
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        let mut ba = ByteArray::new(&buf[2..]);
        let remaining_length = (buf.len() - 2) as u32;
        assert_eq!(
            UnsubscribePacket::decode(&mut ba, remaining_length).unwrap(),
            packet
        );
    }

    #[test]
    fn rejects_empty_topic_list() {
        let packet = UnsubscribePacket {
            packet_id: 1,
            topics: vec![],
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn rejects_malformed_wildcard_filter() {
        let packet = UnsubscribePacket {
            packet_id: 1,
            topics: vec!["a/#/b"],
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }
}
