// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

//! MQTT 3.1.1 client-side state machine for resource-constrained and
//! embedded hosts.
//!
//! This crate owns the streaming framer, the packet decoder dispatch, and
//! the outbound encoder calls; it knows nothing about sockets, TLS, or
//! timers. The host supplies those through [`Handlers`] and drives bytes
//! into an [`Instance`] via [`Instance::feed`].

mod enabled;
mod error;
mod handlers;
mod instance;

pub use enabled::EnabledPackets;
pub use error::{ClientError, ErrorKind};
pub use handlers::{Handlers, Session};
pub use instance::{Instance, DEFAULT_RECV_BUFFER_CAPACITY};

pub use mqtt_wire::{
    ConnectFlags, ConnectPacket, ConnectAckPacket, ConnectReturnCode, IncomingPacket, PacketType,
    PublishPacket, QoS, SubscribeAckPacket, SubscribeReturnCode, SubscribePacket,
    UnsubscribePacket,
};
