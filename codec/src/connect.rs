// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use std::convert::TryFrom;

use byteorder::{BigEndian, WriteBytesExt};

use crate::byte_array::ByteArray;
use crate::connect_flags::ConnectFlags;
use crate::error::{DecodeError, EncodeError};
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::mqtt_str;
use crate::qos::QoS;
use crate::var_int;

const PROTOCOL_NAME: &str = "MQTT";
const PROTOCOL_LEVEL: u8 = 4;

/// Parsed CONNECT variable header and payload. Every string borrows directly
/// from the buffer the packet was decoded out of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectPacket<'a> {
    pub flags: ConnectFlags,
    pub keep_alive: u16,
    pub client_id: &'a str,
    pub will_topic: Option<&'a str>,
    pub will_message: Option<&'a [u8]>,
    pub username: Option<&'a str>,
    pub password: Option<&'a [u8]>,
}

impl<'a> ConnectPacket<'a> {
    /// # Errors
    /// [`DecodeError::InvalidString`] if the protocol name isn't `"MQTT"` or
    /// the protocol level isn't 4; propagates every other field's decode
    /// errors, including [`ConnectFlags::from_byte`]'s validation.
    pub fn decode(ba: &mut ByteArray<'a>) -> Result<Self, DecodeError> {
        let protocol_name = mqtt_str::decode_str(ba, false)?;
        if protocol_name != PROTOCOL_NAME {
            return Err(DecodeError::InvalidString);
        }
        let protocol_level = ba.read_byte()?;
        if protocol_level != PROTOCOL_LEVEL {
            return Err(DecodeError::InvalidPacketLength);
        }
        let flags = ConnectFlags::from_byte(ba.read_byte()?)?;
        let keep_alive = ba.read_u16()?;
        let client_id = mqtt_str::decode_str(ba, false)?;

        let (will_topic, will_message) = if flags.has_will {
            let topic = mqtt_str::decode_str(ba, true)?;
            let message_len = ba.read_u16()? as usize;
            let message = ba.read_bytes(message_len)?;
            (Some(topic), Some(message))
        } else {
            (None, None)
        };
        let username = if flags.has_username {
            Some(mqtt_str::decode_str(ba, false)?)
        } else {
            None
        };
        let password = if flags.has_password {
            let password_len = ba.read_u16()? as usize;
            Some(ba.read_bytes(password_len)?)
        } else {
            None
        };

        Ok(Self {
            flags,
            keep_alive,
            client_id,
            will_topic,
            will_message,
            username,
            password,
        })
    }

    /// # Errors
    /// [`EncodeError::InvalidData`] if the will/username/password flags and
    /// the corresponding `Option` fields disagree, if `flags.has_will` is set
    /// without both `will_topic` and `will_message` present, if the password
    /// flag is set without the username flag, or if `client_id` is empty
    /// without `flags.clean_session` set.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.flags.has_will != (self.will_topic.is_some() && self.will_message.is_some()) {
            return Err(EncodeError::InvalidData(
                "will flag disagrees with will topic/message presence",
            ));
        }
        if self.flags.has_username != self.username.is_some() {
            return Err(EncodeError::InvalidData(
                "username flag disagrees with username presence",
            ));
        }
        if self.flags.has_password != self.password.is_some() {
            return Err(EncodeError::InvalidData(
                "password flag disagrees with password presence",
            ));
        }
        if self.flags.has_password && !self.flags.has_username {
            return Err(EncodeError::InvalidData(
                "password flag set without username flag",
            ));
        }
        if self.client_id.is_empty() && !self.flags.clean_session {
            return Err(EncodeError::InvalidData(
                "empty client id requires clean session",
            ));
        }

        let mut remaining_length = mqtt_str::encoded_len(PROTOCOL_NAME)
            + 1 // protocol level
            + 1 // connect flags
            + 2 // keep alive
            + mqtt_str::encoded_len(self.client_id);
        if let (Some(topic), Some(message)) = (self.will_topic, self.will_message) {
            remaining_length += mqtt_str::encoded_len(topic) + 2 + message.len();
        }
        if let Some(username) = self.username {
            remaining_length += mqtt_str::encoded_len(username);
        }
        if let Some(password) = self.password {
            remaining_length += 2 + password.len();
        }

        let remaining_length =
            u32::try_from(remaining_length).map_err(|_| EncodeError::InvalidVarInt)?;
        buf.push(FixedHeader::encode_first_byte(
            PacketType::Connect,
            HeaderFlags::default(),
        ));
        var_int::encode(remaining_length, buf)?;

        mqtt_str::encode_str(PROTOCOL_NAME, buf)?;
        buf.push(PROTOCOL_LEVEL);
        buf.push(self.flags.to_byte());
        buf.write_u16::<BigEndian>(self.keep_alive)
            .expect("writing to Vec<u8> is infallible");
        mqtt_str::encode_str(self.client_id, buf)?;
        if let (Some(topic), Some(message)) = (self.will_topic, self.will_message) {
            mqtt_str::encode_str(topic, buf)?;
            buf.write_u16::<BigEndian>(
                u16::try_from(message.len()).map_err(|_| EncodeError::InvalidVarInt)?,
            )
            .expect("writing to Vec<u8> is infallible");
            buf.extend_from_slice(message);
        }
        if let Some(username) = self.username {
            mqtt_str::encode_str(username, buf)?;
        }
        if let Some(password) = self.password {
            buf.write_u16::<BigEndian>(
                u16::try_from(password.len()).map_err(|_| EncodeError::InvalidVarInt)?,
            )
            .expect("writing to Vec<u8> is infallible");
            buf.extend_from_slice(password);
        }
        Ok(())
    }
}

/// Assembles a [`ConnectPacket`] field by field, owning the strings/bytes it
/// is given so the caller doesn't have to hand-compute [`ConnectFlags`] from
/// which optional fields are present.
///
/// `build()` borrows back from the builder, so the builder must outlive the
/// `ConnectPacket` it produces.
#[derive(Clone, Debug, Default)]
pub struct ConnectBuilder {
    client_id: String,
    keep_alive: u16,
    clean_session: bool,
    will: Option<(String, Vec<u8>, QoS, bool)>,
    username: Option<String>,
    password: Option<Vec<u8>>,
}

impl ConnectBuilder {
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            clean_session: true,
            ..Self::default()
        }
    }

    pub fn set_keep_alive(&mut self, keep_alive: u16) -> &mut Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn set_clean_session(&mut self, clean_session: bool) -> &mut Self {
        self.clean_session = clean_session;
        self
    }

    pub fn set_will(
        &mut self,
        topic: impl Into<String>,
        message: impl Into<Vec<u8>>,
        qos: QoS,
        retain: bool,
    ) -> &mut Self {
        self.will = Some((topic.into(), message.into(), qos, retain));
        self
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> &mut Self {
        self.username = Some(username.into());
        self
    }

    pub fn set_password(&mut self, password: impl Into<Vec<u8>>) -> &mut Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn build(&self) -> ConnectPacket<'_> {
        let (will_topic, will_message, will_qos, will_retain) = match &self.will {
            Some((topic, message, qos, retain)) => {
                (Some(topic.as_str()), Some(message.as_slice()), *qos, *retain)
            }
            None => (None, None, QoS::AtMostOnce, false),
        };
        ConnectPacket {
            flags: ConnectFlags {
                has_username: self.username.is_some(),
                has_password: self.password.is_some(),
                will_retain,
                will_qos,
                has_will: self.will.is_some(),
                clean_session: self.clean_session,
            },
            keep_alive: self.keep_alive,
            client_id: &self.client_id,
            will_topic,
            will_message,
            username: self.username.as_deref(),
            password: self.password.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_connect_matches_spec_vector() {
        let packet = ConnectPacket {
            flags: ConnectFlags {
                clean_session: true,
                ..ConnectFlags::default()
            },
            keep_alive: 30,
            client_id: "c",
            will_topic: None,
            will_message: None,
            username: None,
            password: None,
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                0x10, 0x0D, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x1E, 0x00,
                0x01, b'c'
            ]
        );
    }

    #[test]
    fn round_trips_through_decode() {
        let packet = ConnectPacket {
            flags: ConnectFlags {
                has_username: true,
                has_password: true,
                has_will: true,
                clean_session: true,
                will_retain: false,
                will_qos: crate::qos::QoS::AtLeastOnce,
            },
            keep_alive: 60,
            client_id: "device-1",
            will_topic: Some("status/device-1"),
            will_message: Some(b"offline"),
            username: Some("bob"),
            password: Some(b"secret"),
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();

        // Skip the fixed header to decode just the variable header + payload.
        let mut ba = ByteArray::new(&buf);
        ba.read_byte().unwrap();
        var_int::decode(&mut ba).unwrap();
        let decoded = ConnectPacket::decode(&mut ba).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn rejects_will_flag_without_will_topic() {
        let packet = ConnectPacket {
            flags: ConnectFlags {
                has_will: true,
                ..ConnectFlags::default()
            },
            keep_alive: 0,
            client_id: "c",
            will_topic: None,
            will_message: None,
            username: None,
            password: None,
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn rejects_password_flag_without_username_flag() {
        let packet = ConnectPacket {
            flags: ConnectFlags {
                has_password: true,
                clean_session: true,
                ..ConnectFlags::default()
            },
            keep_alive: 0,
            client_id: "c",
            will_topic: None,
            will_message: None,
            username: None,
            password: Some(b"secret"),
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn rejects_empty_client_id_without_clean_session() {
        let packet = ConnectPacket {
            flags: ConnectFlags::default(),
            keep_alive: 0,
            client_id: "",
            will_topic: None,
            will_message: None,
            username: None,
            password: None,
        };
        let mut buf = Vec::new();
        assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn empty_client_id_encodes_zero_length() {
        let packet = ConnectPacket {
            flags: ConnectFlags {
                clean_session: true,
                ..ConnectFlags::default()
            },
            keep_alive: 0,
            client_id: "",
            will_topic: None,
            will_message: None,
            username: None,
            password: None,
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf).unwrap();
        assert!(buf.ends_with(&[0x00, 0x00]));
    }

    #[test]
    fn builder_matches_spec_vector() {
        let mut builder = ConnectBuilder::new("c");
        builder.set_keep_alive(30).set_clean_session(true);
        let mut buf = Vec::new();
        builder.build().encode(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                0x10, 0x0D, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x1E, 0x00,
                0x01, b'c'
            ]
        );
    }

    #[test]
    fn builder_derives_flags_from_will_and_credentials() {
        let mut builder = ConnectBuilder::new("device-1");
        builder
            .set_will("status/device-1", b"offline".to_vec(), QoS::AtLeastOnce, true)
            .set_username("bob")
            .set_password(b"secret".to_vec());
        let packet = builder.build();
        assert!(packet.flags.has_will);
        assert!(packet.flags.will_retain);
        assert_eq!(packet.flags.will_qos, QoS::AtLeastOnce);
        assert_eq!(packet.will_topic, Some("status/device-1"));
        assert_eq!(packet.will_message, Some(&b"offline"[..]));
        assert_eq!(packet.username, Some("bob"));
        assert_eq!(packet.password, Some(&b"secret"[..]));
    }
}
