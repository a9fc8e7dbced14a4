// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

//! Minimal demo: a host wires up an `Instance` over an in-memory transport
//! (no real socket) and round-trips a single QoS 1 PUBLISH through it.

use std::cell::RefCell;

use mqtt_client::{Handlers, Instance, Session};
use mqtt_wire::{IncomingPacket, QoS};

/// Host context: the loopback "transport" is just a byte queue the write
/// handler appends to and the demo drains straight back into the instance.
struct Host {
    outbound: RefCell<Vec<u8>>,
}

fn write(ctx: &mut Host, bytes: &[u8]) -> bool {
    ctx.outbound.borrow_mut().extend_from_slice(bytes);
    true
}

fn disconnect(_ctx: &mut Host) {
    log::error!("demo: fatal protocol error, tearing down connection");
}

fn on_packet(_ctx: &mut Host, _session: &mut Session<'_, Host, 1024>, packet: IncomingPacket<'_>) {
    if let IncomingPacket::Publish(publish) = packet {
        log::info!(
            "demo: received publish on {:?}: {:?}",
            publish.topic,
            String::from_utf8_lossy(publish.payload)
        );
    }
}

fn main() {
    std::env::set_var("RUST_LOG", "info");
    env_logger::init();

    let handlers: Handlers<Host, 1024> = Handlers {
        write,
        disconnect,
        timeout_pat: None,
        timeout_stop: None,
        packet_handler: on_packet,
    };
    let mut instance: Instance<Host, 1024> = Instance::new(handlers);
    let mut host = Host {
        outbound: RefCell::new(Vec::new()),
    };

    instance
        .publish(&mut host, "demo/topic", QoS::AtMostOnce, false, b"hello")
        .unwrap();
    log::info!("demo: encoded {} bytes outbound", host.outbound.borrow().len());

    let bytes = host.outbound.borrow().clone();
    instance.feed(&mut host, &bytes);
}
