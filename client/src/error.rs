// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use std::fmt::{self, Display};

use mqtt_wire::{DecodeError, EncodeError};

/// Which failure category a [`ClientError`] falls into. `Success` isn't a
/// variant here since it's represented by `Result::Ok` rather than this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Caller-supplied packet descriptor violates a structural rule.
    InvalidData,

    /// The write handler reported the transport refused the write.
    InvalidState,

    /// Inbound decoder rejected a malformed body.
    CannotParse,
}

#[derive(Clone, Debug)]
pub struct ClientError {
    kind: ErrorKind,
    message: String,
}

impl ClientError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_owned(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ClientError {}

impl From<EncodeError> for ClientError {
    fn from(err: EncodeError) -> Self {
        Self::new(ErrorKind::InvalidData, &err.to_string())
    }
}

impl From<DecodeError> for ClientError {
    fn from(err: DecodeError) -> Self {
        Self::new(ErrorKind::CannotParse, &err.to_string())
    }
}
