// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use crate::error::EncodeError;
use crate::header::{FixedHeader, HeaderFlags, PacketType};
use crate::var_int;

/// DISCONNECT has an empty variable header and payload; decoding it is
/// handled the same way as [`crate::ping::decode_empty_body`].
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other encoders.
pub fn encode(buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    buf.push(FixedHeader::encode_first_byte(
        PacketType::Disconnect,
        HeaderFlags::default(),
    ));
    var_int::encode(0, buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_two_bytes() {
        let mut buf = Vec::new();
        encode(&mut buf).unwrap();
        assert_eq!(buf, [0xE0, 0x00]);
    }
}
