// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use mqtt_wire::{IncomingPacket, PacketType};

use crate::error::ClientError;

/// Advance a packet-id counter, skipping zero: MQTT-2.3.1-1 reserves 0 as
/// "no packet id", so a wrap from 0xFFFF must land on 1 rather than 0.
/// Shared between [`Session`] (used from inside `packet_handler`) and
/// `Instance`'s own outbound calls (publish, subscribe, unsubscribe).
pub(crate) fn allocate_packet_id(counter: &mut u16) -> u16 {
    let id = counter.wrapping_add(1);
    *counter = if id == 0 { 1 } else { id };
    *counter
}

/// Host-supplied callbacks, as plain function pointers rather than closures
/// or trait objects. `Ctx` carries whatever state the host needs (a socket
/// handle, a ring buffer, a peripheral register) and is threaded through
/// every call explicitly; nothing here stores a `Ctx` itself.
pub struct Handlers<Ctx, const N: usize> {
    /// Write `bytes` to the transport. Returns `false` if the transport
    /// refused the write (closed socket, full buffer).
    pub write: fn(ctx: &mut Ctx, bytes: &[u8]) -> bool,

    /// The transport should be torn down; the instance has decided the
    /// connection cannot continue (protocol violation, watchdog expiry).
    pub disconnect: fn(ctx: &mut Ctx),

    /// Arm or pat a host timeout watchdog. `None` if the host does not
    /// supply timeout detection.
    pub timeout_pat: Option<fn(ctx: &mut Ctx)>,

    /// Disarm the watchdog armed by `timeout_pat`.
    pub timeout_stop: Option<fn(ctx: &mut Ctx)>,

    /// Invoked once per fully decoded, enabled packet type. `packet` borrows
    /// from the instance's receive buffer and must not be retained past the
    /// call. `session` exposes the packet-id counter and the QoS ack
    /// helpers without exposing that buffer.
    pub packet_handler: fn(ctx: &mut Ctx, session: &mut Session<'_, Ctx, N>, packet: IncomingPacket<'_>),
}

/// A view into an [`Instance`](crate::instance::Instance) passed to
/// `packet_handler`, disjoint from the receive buffer backing the decoded
/// packet handed to the same call.
///
/// Holding only the handler table and the packet-id counter (not the
/// buffer) is what lets a handler both read a zero-copy
/// [`IncomingPacket`] and send a QoS ack in the same callback.
pub struct Session<'i, Ctx, const N: usize> {
    handlers: &'i Handlers<Ctx, N>,
    next_packet_id: &'i mut u16,
}

impl<'i, Ctx, const N: usize> Session<'i, Ctx, N> {
    pub(crate) fn new(handlers: &'i Handlers<Ctx, N>, next_packet_id: &'i mut u16) -> Self {
        Self {
            handlers,
            next_packet_id,
        }
    }

    /// Allocate the next outgoing packet id, skipping zero: MQTT-2.3.1-1
    /// reserves 0, so a wrap from 0xFFFF lands on 1 rather than 0. Exposed
    /// so a `packet_handler` that re-publishes on receipt (e.g. a bridge)
    /// can mint its own outbound id without a second counter.
    pub fn allocate_packet_id(&mut self) -> u16 {
        allocate_packet_id(self.next_packet_id)
    }

    fn write(&self, ctx: &mut Ctx, buf: &[u8]) -> Result<(), ClientError> {
        if (self.handlers.write)(ctx, buf) {
            Ok(())
        } else {
            Err(ClientError::new(
                crate::error::ErrorKind::InvalidState,
                "write handler refused bytes",
            ))
        }
    }

    /// Send a PUBACK in response to a QoS 1 PUBLISH.
    ///
    /// # Errors
    /// Returns an error if encoding fails or the transport refuses the
    /// write.
    pub fn send_publish_ack(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        self.send_packet_id_only(ctx, PacketType::PublishAck, packet_id)
    }

    /// Send a PUBREC, the first half of the QoS 2 handshake.
    ///
    /// # Errors
    /// Returns an error if encoding fails or the transport refuses the
    /// write.
    pub fn send_publish_received(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        self.send_packet_id_only(ctx, PacketType::PublishReceived, packet_id)
    }

    /// Send a PUBREL in response to a received PUBREC.
    ///
    /// # Errors
    /// Returns an error if encoding fails or the transport refuses the
    /// write.
    pub fn send_publish_release(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        let mut buf = Vec::new();
        mqtt_wire::encode_publish_release(packet_id, &mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a PUBCOMP, completing the QoS 2 handshake.
    ///
    /// # Errors
    /// Returns an error if encoding fails or the transport refuses the
    /// write.
    pub fn send_publish_complete(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        self.send_packet_id_only(ctx, PacketType::PublishComplete, packet_id)
    }

    fn send_packet_id_only(
        &self,
        ctx: &mut Ctx,
        packet_type: PacketType,
        packet_id: u16,
    ) -> Result<(), ClientError> {
        let mut buf = Vec::new();
        mqtt_wire::encode_packet_id_only(packet_type, packet_id, &mut buf)?;
        self.write(ctx, &buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_ok(_ctx: &mut (), _bytes: &[u8]) -> bool {
        true
    }

    fn noop_disconnect(_ctx: &mut ()) {}

    fn noop_handler(_ctx: &mut (), _session: &mut Session<'_, (), 16>, _packet: IncomingPacket<'_>) {}

    fn handlers() -> Handlers<(), 16> {
        Handlers {
            write: write_ok,
            disconnect: noop_disconnect,
            timeout_pat: None,
            timeout_stop: None,
            packet_handler: noop_handler,
        }
    }

    #[test]
    fn packet_id_allocation_skips_zero_on_wrap() {
        let h = handlers();
        let mut counter: u16 = 0xFFFF;
        let mut session = Session::new(&h, &mut counter);
        assert_eq!(session.allocate_packet_id(), 1);
    }

    #[test]
    fn packet_id_allocation_increments() {
        let h = handlers();
        let mut counter: u16 = 5;
        let mut session = Session::new(&h, &mut counter);
        assert_eq!(session.allocate_packet_id(), 6);
        assert_eq!(session.allocate_packet_id(), 7);
    }

    #[test]
    fn send_publish_ack_calls_write() {
        let h = handlers();
        let mut counter: u16 = 1;
        let session = Session::new(&h, &mut counter);
        let mut ctx = ();
        assert!(session.send_publish_ack(&mut ctx, 42).is_ok());
    }
}
