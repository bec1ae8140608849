//! The event loop (§4.K, §5): single-threaded, cooperative, built on
//! `tokio::select!` over every neighbor's socket plus a periodic tick.
//!
//! Modernizes the teacher daemon's `handler::serve` bind-then-loop shape
//! from `tokio 0.1` futures/streams to `async`/`.await`; the control flow is
//! the same (bind everything up front, then loop forever dispatching each
//! readable event to a handler) even though nothing here is a `TcpListener`.
//! Each neighbor's socket is read by its own spawned task (a UDP socket
//! can't be polled by name inside `select!` when the socket set is only
//! known at runtime); readers forward to a single channel the main loop
//! `select!`s against alongside the tick.

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::time;

use crate::addr::Addr;
use crate::config::DaemonConfig;
use crate::handler::{self, Outgoing};
use crate::neighbor::{NeighborInfo, NeighborRegistry};
use crate::rib::Rib;
use crate::transport::{self, Peers, MAX_DATAGRAM};
use crate::wire::{Frame, Payload};

/// How long a single `select!` iteration can go without revisiting the
/// tick branch. Bounds nothing but liveness of that branch — no timers or
/// retransmission logic hang off of it.
const TICK: Duration = Duration::from_millis(100);

/// Bind every neighbor's socket, build the registry, and run forever.
pub async fn run(config: DaemonConfig) -> Result<(), crate::error::RouterError> {
    let registry = NeighborRegistry::new(config.neighbors.iter().map(|n| NeighborInfo {
        address: n.address,
        relation: n.relation,
    }));
    let peers = Peers::bind_all(config.neighbors.iter().copied()).await?;

    info!(
        "asbgpd listening for {} neighbor(s) as AS{}",
        registry.len(),
        config.asn
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<(Addr, Vec<u8>)>();
    for (&address, transport) in peers.iter() {
        let socket = transport.socket_handle();
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                match transport::recv_and_connect(&socket, &mut buf).await {
                    Ok(n) => {
                        if tx.send((address, buf[..n].to_vec())).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!("read from {} failed: {}", address, err);
                    }
                }
            }
        });
    }
    drop(tx);

    let mut rib = Rib::new();
    let mut tick = time::interval(TICK);

    loop {
        tokio::select! {
            Some((_from, bytes)) = rx.recv() => {
                dispatch_datagram(&mut rib, &registry, &peers, config.asn, &bytes).await;
            }
            _ = tick.tick() => {}
        }
    }
}

async fn dispatch_datagram(
    rib: &mut Rib,
    registry: &NeighborRegistry,
    peers: &Peers,
    local_asn: u32,
    bytes: &[u8],
) {
    let frame = match Frame::decode(bytes) {
        Ok(frame) => frame,
        Err(err) => {
            warn!("dropping malformed datagram: {}", err);
            return;
        }
    };

    debug!(
        "{} -> {}: {}",
        frame.src,
        frame.dst,
        frame.payload.type_name()
    );

    let outcome = match frame.payload.clone() {
        Payload::Update(announce) => {
            handler::handle_update(rib, registry, local_asn, frame.src, announce)
        }
        Payload::Withdraw(withdrawn) => {
            handler::handle_withdraw(rib, registry, frame.src, withdrawn)
        }
        Payload::Data(_) => handler::handle_data(registry, rib, frame.src, frame.clone()),
        Payload::Dump(_) => Ok(handler::handle_dump(rib, frame.src)),
        Payload::Handshake(_) | Payload::Table(_) | Payload::NoRoute(_) => {
            warn!(
                "unexpected inbound message type: {}",
                frame.payload.type_name()
            );
            Ok(vec![])
        }
    };

    match outcome {
        Ok(outgoing) => send_all(peers, outgoing).await,
        Err(err) => error!("handler error: {}", err),
    }
}

async fn send_all(peers: &Peers, outgoing: Vec<Outgoing>) {
    for Outgoing { to, frame } in outgoing {
        peers.send_to(to, &frame.encode()).await;
    }
}
