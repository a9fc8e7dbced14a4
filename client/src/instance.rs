// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

use mqtt_wire::{
    ByteArray, ConnectFlags, ConnectPacket, HeaderFlags, IncomingPacket, PacketType, PublishPacket,
    QoS, RemainingLengthAccumulator, SubscribePacket, UnsubscribePacket, MAX_REMAINING_LENGTH,
};

use crate::enabled::EnabledPackets;
use crate::error::{ClientError, ErrorKind};
use crate::handlers::{self, Handlers, Session};

/// Reference receive-buffer capacity used by embedded reference clients.
pub const DEFAULT_RECV_BUFFER_CAPACITY: usize = 1024;

/// Streaming framer state. `DONE` is not represented explicitly: reaching
/// it is a transient action (dispatch, then fall back to `Idle`) rather
/// than a state [`Instance::feed`] ever pauses in between calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ParserState {
    Idle,
    FixHdr,
    VarData,
    SkipPkt,
}

/// Ties the framer (C2), the decoder dispatch (C3) and the outbound
/// encoders (C4) to one owned receive buffer and one packet-id counter.
///
/// `Ctx` is never stored here: every method that can call a handler takes
/// `ctx: &mut Ctx` explicitly, mirroring the handler table's own
/// signatures. This is what lets [`Handlers::packet_handler`] receive both
/// a zero-copy view into `recv_buf` and, via [`Session`], mutable access to
/// send QoS acks in the same call without aliasing the buffer.
pub struct Instance<Ctx, const N: usize> {
    handlers: Handlers<Ctx, N>,
    recv_buf: [u8; N],
    write_pos: usize,
    state: ParserState,
    packet_type: PacketType,
    flags: HeaderFlags,
    remaining_length: u32,
    remaining_len_acc: RemainingLengthAccumulator,
    enabled: EnabledPackets,
    next_packet_id: u16,
}

impl<Ctx, const N: usize> Instance<Ctx, N> {
    #[must_use]
    pub const fn new(handlers: Handlers<Ctx, N>) -> Self {
        Self {
            handlers,
            recv_buf: [0; N],
            write_pos: 0,
            state: ParserState::Idle,
            packet_type: PacketType::Connect,
            flags: HeaderFlags {
                dup: false,
                qos: QoS::AtMostOnce,
                retain: false,
            },
            remaining_length: 0,
            remaining_len_acc: RemainingLengthAccumulator::new(),
            enabled: EnabledPackets::all(),
            next_packet_id: 0,
        }
    }

    pub fn set_enabled_packets(&mut self, enabled: EnabledPackets) {
        self.enabled = enabled;
    }

    #[must_use]
    pub const fn enabled_packets(&self) -> EnabledPackets {
        self.enabled
    }

    fn pat(&self, ctx: &mut Ctx) {
        if let Some(timeout_pat) = self.handlers.timeout_pat {
            timeout_pat(ctx);
        }
    }

    fn stop_watchdog(&self, ctx: &mut Ctx) {
        if let Some(timeout_stop) = self.handlers.timeout_stop {
            timeout_stop(ctx);
        }
    }

    fn fatal(&mut self, ctx: &mut Ctx) {
        self.state = ParserState::Idle;
        (self.handlers.disconnect)(ctx);
    }

    /// Feed the next chunk of transport bytes into the framer. May contain
    /// a fragment of one packet, or several whole packets back to back.
    ///
    /// Each call pats the watchdog once on entry; it is patted again on
    /// every transition into `VarData` for a new packet, and stopped every
    /// time a packet (successful or skipped) completes.
    pub fn feed(&mut self, ctx: &mut Ctx, bytes: &[u8]) {
        self.pat(ctx);
        let mut pos = 0;
        while pos < bytes.len() {
            match self.state {
                ParserState::Idle => {
                    let byte = bytes[pos];
                    pos += 1;
                    match mqtt_wire::decode_type_and_flags(byte) {
                        Ok((packet_type, flags)) => {
                            self.packet_type = packet_type;
                            self.flags = flags;
                            self.remaining_len_acc = RemainingLengthAccumulator::new();
                            self.state = ParserState::FixHdr;
                        }
                        Err(err) => {
                            log::error!("instance: fatal framing error in IDLE: {err}");
                            self.fatal(ctx);
                            return;
                        }
                    }
                }
                ParserState::FixHdr => {
                    let byte = bytes[pos];
                    pos += 1;
                    match self.remaining_len_acc.push_byte(byte) {
                        Ok(None) => {}
                        Ok(Some(len)) if len > MAX_REMAINING_LENGTH => {
                            log::error!("instance: remaining length {len} exceeds protocol maximum");
                            self.fatal(ctx);
                            return;
                        }
                        Ok(Some(len)) => {
                            self.remaining_length = len;
                            self.write_pos = 0;
                            if len as usize > N {
                                self.state = ParserState::SkipPkt;
                            } else if len == 0 {
                                self.dispatch(ctx);
                                self.stop_watchdog(ctx);
                                self.state = ParserState::Idle;
                                if pos < bytes.len() {
                                    self.pat(ctx);
                                }
                            } else {
                                self.state = ParserState::VarData;
                                self.pat(ctx);
                            }
                        }
                        Err(err) => {
                            log::error!("instance: malformed remaining length: {err}");
                            self.fatal(ctx);
                            return;
                        }
                    }
                }
                ParserState::VarData => {
                    let needed = self.remaining_length as usize - self.write_pos;
                    let take = needed.min(bytes.len() - pos);
                    self.recv_buf[self.write_pos..self.write_pos + take]
                        .copy_from_slice(&bytes[pos..pos + take]);
                    self.write_pos += take;
                    pos += take;
                    if self.write_pos == self.remaining_length as usize {
                        self.dispatch(ctx);
                        self.stop_watchdog(ctx);
                        self.state = ParserState::Idle;
                        if pos < bytes.len() {
                            self.pat(ctx);
                        }
                    }
                }
                ParserState::SkipPkt => {
                    let needed = self.remaining_length as usize - self.write_pos;
                    let take = needed.min(bytes.len() - pos);
                    self.write_pos += take;
                    pos += take;
                    if self.write_pos == self.remaining_length as usize {
                        self.stop_watchdog(ctx);
                        self.state = ParserState::Idle;
                        if pos < bytes.len() {
                            self.pat(ctx);
                        }
                    }
                }
            }
        }
    }

    /// C3: invoked at DONE. Skips dispatch entirely for a disabled type
    /// (I4); a decode failure is logged and the packet silently dropped,
    /// since the framer has already consumed its bytes by the time this
    /// runs and there is no channel left to surface a structured error.
    fn dispatch(&mut self, ctx: &mut Ctx) {
        if !self.enabled.is_enabled(self.packet_type) {
            return;
        }
        let mut ba = ByteArray::new(&self.recv_buf[..self.write_pos]);
        match mqtt_wire::decode_body(self.packet_type, self.flags, self.remaining_length, &mut ba) {
            Ok(packet) => {
                let mut session = Session::new(&self.handlers, &mut self.next_packet_id);
                (self.handlers.packet_handler)(ctx, &mut session, packet);
            }
            Err(err) => {
                log::debug!("instance: dropping unparsable {:?}: {err}", self.packet_type);
            }
        }
    }

    fn write(&self, ctx: &mut Ctx, buf: &[u8]) -> Result<(), ClientError> {
        if (self.handlers.write)(ctx, buf) {
            Ok(())
        } else {
            Err(ClientError::new(
                ErrorKind::InvalidState,
                "write handler refused bytes",
            ))
        }
    }

    fn next_packet_id(&mut self) -> u16 {
        handlers::allocate_packet_id(&mut self.next_packet_id)
    }

    /// Send a CONNECT. See [`ConnectPacket::encode`] for the validation
    /// rules applied to `packet`.
    ///
    /// # Errors
    /// Returns an error if the packet fails validation or the transport
    /// refuses the write.
    pub fn connect(
        &self,
        ctx: &mut Ctx,
        flags: ConnectFlags,
        keep_alive: u16,
        client_id: &str,
        will_topic: Option<&str>,
        will_message: Option<&[u8]>,
        username: Option<&str>,
        password: Option<&[u8]>,
    ) -> Result<(), ClientError> {
        let packet = ConnectPacket {
            flags,
            keep_alive,
            client_id,
            will_topic,
            will_message,
            username,
            password,
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a PUBLISH. Allocates and writes a packet id from the instance's
    /// counter when `qos > 0`.
    ///
    /// # Errors
    /// Returns an error if `topic` is empty or the transport refuses the
    /// write.
    pub fn publish(
        &mut self,
        ctx: &mut Ctx,
        topic: &str,
        qos: QoS,
        retain: bool,
        payload: &[u8],
    ) -> Result<(), ClientError> {
        let packet_id = if qos == QoS::AtMostOnce {
            None
        } else {
            Some(self.next_packet_id())
        };
        let packet = PublishPacket {
            dup: false,
            qos,
            retain,
            topic,
            packet_id,
            payload,
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a SUBSCRIBE, allocating a fresh packet id.
    ///
    /// # Errors
    /// Returns an error if `topics` is empty, any topic is empty, or the
    /// transport refuses the write.
    pub fn subscribe(&mut self, ctx: &mut Ctx, topics: &[(&str, QoS)]) -> Result<(), ClientError> {
        let packet = SubscribePacket {
            packet_id: self.next_packet_id(),
            topics: topics.to_vec(),
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send an UNSUBSCRIBE, allocating a fresh packet id.
    ///
    /// # Errors
    /// Returns an error if `topics` is empty, any topic is empty, or the
    /// transport refuses the write.
    pub fn unsubscribe(&mut self, ctx: &mut Ctx, topics: &[&str]) -> Result<(), ClientError> {
        let packet = UnsubscribePacket {
            packet_id: self.next_packet_id(),
            topics: topics.to_vec(),
        };
        let mut buf = Vec::new();
        packet.encode(&mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a PINGREQ.
    ///
    /// # Errors
    /// Returns an error if the transport refuses the write.
    pub fn ping(&self, ctx: &mut Ctx) -> Result<(), ClientError> {
        let mut buf = Vec::new();
        mqtt_wire::encode_ping_request(&mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a DISCONNECT.
    ///
    /// # Errors
    /// Returns an error if the transport refuses the write.
    pub fn disconnect(&self, ctx: &mut Ctx) -> Result<(), ClientError> {
        let mut buf = Vec::new();
        mqtt_wire::encode_disconnect(&mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a PUBACK for a received QoS 1 PUBLISH.
    ///
    /// # Errors
    /// Returns an error if the transport refuses the write.
    pub fn send_publish_ack(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        self.send_packet_id_only(ctx, PacketType::PublishAck, packet_id)
    }

    /// Send a PUBREC, the first half of the QoS 2 inbound handshake.
    ///
    /// # Errors
    /// Returns an error if the transport refuses the write.
    pub fn send_publish_received(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        self.send_packet_id_only(ctx, PacketType::PublishReceived, packet_id)
    }

    /// Send a PUBREL in response to a received PUBREC, or to continue
    /// resuming an outbound QoS 2 publish.
    ///
    /// # Errors
    /// Returns an error if the transport refuses the write.
    pub fn send_publish_release(&self, ctx: &mut Ctx, packet_id: u16) -> Result<(), ClientError> {
        let mut buf = Vec::new();
        mqtt_wire::encode_publish_release(packet_id, &mut buf)?;
        self.write(ctx, &buf)
    }

    /// Send a PUBCOMP, completing the QoS 2 handshake.
    ///
    /// # Errors
    /// Returns an error if the transport refuses the write.
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
    use std::cell::RefCell;

    struct Ctx {
        written: RefCell<Vec<u8>>,
        received: RefCell<Vec<String>>,
    }

    fn write_capture(ctx: &mut Ctx, bytes: &[u8]) -> bool {
        ctx.written.borrow_mut().extend_from_slice(bytes);
        true
    }

    fn noop_disconnect(_ctx: &mut Ctx) {}

    fn record_packet_handler(ctx: &mut Ctx, _session: &mut Session<'_, Ctx, 64>, packet: IncomingPacket<'_>) {
        ctx.received.borrow_mut().push(format!("{packet:?}"));
    }

    fn handlers() -> Handlers<Ctx, 64> {
        Handlers {
            write: write_capture,
            disconnect: noop_disconnect,
            timeout_pat: None,
            timeout_stop: None,
            packet_handler: record_packet_handler,
        }
    }

    fn new_ctx() -> Ctx {
        Ctx {
            written: RefCell::new(Vec::new()),
            received: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn feed_delivers_one_callback_when_chopped_mid_header() {
        let mut instance: Instance<Ctx, 64> = Instance::new(handlers());
        let mut ctx = new_ctx();
        // PUBLISH QoS0, topic "a/b", payload "hi".
        let bytes = [0x30, 0x07, 0x00, 0x03, b'a', b'/', b'b', b'h', b'i'];
        instance.feed(&mut ctx, &bytes[..1]);
        instance.feed(&mut ctx, &bytes[1..]);
        assert_eq!(ctx.received.borrow().len(), 1);
    }

    #[test]
    fn feed_skips_packet_larger_than_capacity() {
        let mut instance: Instance<Ctx, 4> = Instance::new(handlers());
        let mut ctx = new_ctx();
        // Remaining length 10 > capacity 4: enters SKIP_PKT, no dispatch.
        let mut bytes = vec![0x30, 0x0A];
        bytes.extend_from_slice(&[0u8; 10]);
        instance.feed(&mut ctx, &bytes);
        assert!(ctx.received.borrow().is_empty());

        // A subsequent, well-formed packet still parses normally.
        let ping = [0xC0, 0x00];
        instance.feed(&mut ctx, &ping);
        assert_eq!(ctx.received.borrow().len(), 1);
    }

    #[test]
    fn disabled_packet_type_drains_without_dispatch() {
        let mut instance: Instance<Ctx, 64> = Instance::new(handlers());
        let mut ctx = new_ctx();
        instance.set_enabled_packets(*EnabledPackets::all().disable(PacketType::PingResponse));
        instance.feed(&mut ctx, &[0xD0, 0x00]);
        assert!(ctx.received.borrow().is_empty());
    }

    #[test]
    fn invalid_packet_type_calls_disconnect() {
        struct DisconnectCtx {
            disconnected: RefCell<bool>,
        }
        fn write_ok(_ctx: &mut DisconnectCtx, _bytes: &[u8]) -> bool {
            true
        }
        fn mark_disconnected(ctx: &mut DisconnectCtx) {
            *ctx.disconnected.borrow_mut() = true;
        }
        fn unreachable_handler(
            _ctx: &mut DisconnectCtx,
            _session: &mut Session<'_, DisconnectCtx, 64>,
            _packet: IncomingPacket<'_>,
        ) {
            panic!("should not be invoked");
        }

        let handlers: Handlers<DisconnectCtx, 64> = Handlers {
            write: write_ok,
            disconnect: mark_disconnected,
            timeout_pat: None,
            timeout_stop: None,
            packet_handler: unreachable_handler,
        };
        let mut instance: Instance<DisconnectCtx, 64> = Instance::new(handlers);
        let mut ctx = DisconnectCtx {
            disconnected: RefCell::new(false),
        };
        instance.feed(&mut ctx, &[0x00]);
        assert!(*ctx.disconnected.borrow());
    }

    #[test]
    fn publish_allocates_packet_id_for_qos1() {
        let mut instance: Instance<Ctx, 64> = Instance::new(handlers());
        let mut ctx = new_ctx();
        instance
            .publish(&mut ctx, "a/b", QoS::AtLeastOnce, false, b"hi")
            .unwrap();
        // remaining length: 2+3 (topic) + 2 (packet id) + 2 (payload) = 9.
        assert_eq!(&ctx.written.borrow()[0..2], &[0x32, 0x09]);
        // topic length prefix, then "a/b", then the allocated packet id.
        assert_eq!(&ctx.written.borrow()[2..7], &[0x00, 0x03, b'a', b'/', b'b']);
        assert_eq!(&ctx.written.borrow()[7..9], &[0x00, 0x01]);
    }

    #[test]
    fn connect_matches_spec_vector() {
        let instance: Instance<Ctx, 64> = Instance::new(handlers());
        let mut ctx = new_ctx();
        let flags = ConnectFlags {
            clean_session: true,
            ..ConnectFlags::default()
        };
        instance
            .connect(&mut ctx, flags, 30, "c", None, None, None, None)
            .unwrap();
        assert_eq!(
            &ctx.written.borrow()[..],
            &[
                0x10, 0x0D, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x1E, 0x00,
                0x01, b'c'
            ]
        );
    }

    #[test]
    fn qos2_inbound_handshake_sends_publish_received_then_complete() {
        fn qos2_handler(ctx: &mut Ctx, session: &mut Session<'_, Ctx, 64>, packet: IncomingPacket<'_>) {
            match packet {
                IncomingPacket::Publish(p) => {
                    session
                        .send_publish_received(ctx, p.packet_id.unwrap())
                        .unwrap();
                }
                IncomingPacket::PublishRelease { packet_id } => {
                    session.send_publish_complete(ctx, packet_id).unwrap();
                }
                other => panic!("unexpected packet: {other:?}"),
            }
        }

        let handlers = Handlers {
            write: write_capture,
            disconnect: noop_disconnect,
            timeout_pat: None,
            timeout_stop: None,
            packet_handler: qos2_handler,
        };
        let mut instance: Instance<Ctx, 64> = Instance::new(handlers);
        let mut ctx = new_ctx();

        // PUBLISH QoS2, packet id 5, topic "t", payload "x".
        let publish = [0x34, 0x06, 0x00, 0x01, b't', 0x00, 0x05, b'x'];
        instance.feed(&mut ctx, &publish);
        assert_eq!(&ctx.written.borrow()[..], &[0x50, 0x02, 0x00, 0x05]);

        ctx.written.borrow_mut().clear();
        // PUBREL, packet id 5.
        let pubrel = [0x62, 0x02, 0x00, 0x05];
        instance.feed(&mut ctx, &pubrel);
        assert_eq!(&ctx.written.borrow()[..], &[0x70, 0x02, 0x00, 0x05]);
    }
}
