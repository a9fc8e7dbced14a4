// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use std::convert::TryFrom;

use crate::error::DecodeError;
use crate::qos::QoS;

/// Byte 8 of the CONNECT variable header.
///
/// ```txt
///         7               6              5          4-3          2            1             0
/// +---------------+---------------+-------------+----------+-----------+---------------+----------+
/// | Username Flag | Password Flag | Will Retain | Will QoS | Will Flag | Clean Session | Reserved |
/// +---------------+---------------+-------------+----------+-----------+---------------+----------+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConnectFlags {
    pub has_username: bool,
    pub has_password: bool,
    pub will_retain: bool,
    pub will_qos: QoS,
    pub has_will: bool,
    pub clean_session: bool,
}

impl ConnectFlags {
    #[must_use]
    pub fn to_byte(self) -> u8 {
        let username = u8::from(self.has_username) << 7;
        let password = u8::from(self.has_password) << 6;
        let will_retain = u8::from(self.will_retain) << 5;
        let will_qos = u8::from(self.will_qos) << 3;
        let will = u8::from(self.has_will) << 2;
        let clean_session = u8::from(self.clean_session) << 1;
        username | password | will_retain | will_qos | will | clean_session
    }

    /// # Errors
    /// [`DecodeError::InvalidPacketFlags`] if the reserved bit 0 is set, or if
    /// the password flag is set without the username flag (MQTT-3.1.2-22).
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        if byte & 0b0000_0001 != 0 {
            return Err(DecodeError::InvalidPacketFlags);
        }
        let has_username = byte & 0b1000_0000 != 0;
        let has_password = byte & 0b0100_0000 != 0;
        if has_password && !has_username {
            return Err(DecodeError::InvalidPacketFlags);
        }
        Ok(Self {
            has_username,
            has_password,
            will_retain: byte & 0b0010_0000 != 0,
            will_qos: QoS::try_from((byte & 0b0001_1000) >> 3)?,
            has_will: byte & 0b0000_0100 != 0,
            clean_session: byte & 0b0000_0010 != 0,
        })
    }
}
