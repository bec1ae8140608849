//! The transport layer (§4.I): one UDP socket per neighbor, bound to that
//! neighbor's configured port.
//!
//! Each neighbor is simulated on `127.0.0.1`; a neighbor (or the `ribctl`
//! debug client) reaches this daemon by sending to its own, well-known
//! configured port. The daemon doesn't know the neighbor's source port in
//! advance, so the socket starts unconnected and "connects" to whichever
//! address its first datagram arrives from — from then on `send`/`recv`
//! don't need to carry a `SocketAddr` on every call. Send errors are caught
//! and logged by the caller, never propagated as a crash — only
//! [`Transport::bind`] can fail outright, since that only happens at
//! startup.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use log::warn;
use tokio::net::UdpSocket;

use crate::addr::Addr;
use crate::config::NeighborConfig;
use crate::error::RouterError;

/// Large enough for any single frame this system's wire codec produces.
pub const MAX_DATAGRAM: usize = 65_507;

/// One neighbor's socket. `Arc`-wrapped so the reactor can hand a read
/// handle to a dedicated reader task while still using the same socket to
/// send.
pub struct Transport {
    socket: Arc<UdpSocket>,
}

impl Transport {
    async fn bind(port: u16) -> Result<Self, RouterError> {
        let local = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let socket = UdpSocket::bind(local).await?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// Send a frame to this neighbor. Failures are the caller's to log; this
    /// never panics and never drops the reactor. Only valid after at least
    /// one [`Transport::recv`] has connected the socket to its peer.
    pub async fn send(&self, bytes: &[u8]) -> Result<(), RouterError> {
        self.socket.send(bytes).await?;
        Ok(())
    }

    /// Receive one datagram, (re-)connecting the socket to whichever
    /// address it came from so subsequent `send`s reach the same peer.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<usize, RouterError> {
        recv_and_connect(&self.socket, buf).await
    }

    /// A clone of the underlying socket handle, for a dedicated reader task.
    pub fn socket_handle(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }
}

/// Shared by [`Transport::recv`] and the reactor's per-neighbor reader
/// tasks, which only hold the raw socket handle.
pub async fn recv_and_connect(socket: &UdpSocket, buf: &mut [u8]) -> Result<usize, RouterError> {
    let (n, peer) = socket.recv_from(buf).await?;
    socket.connect(peer).await?;
    Ok(n)
}

/// All configured neighbors' sockets, keyed by neighbor address.
pub struct Peers {
    peers: HashMap<Addr, Transport>,
}

impl Peers {
    /// Bind one socket per neighbor in `neighbors`, each at its configured
    /// port.
    pub async fn bind_all(
        neighbors: impl IntoIterator<Item = NeighborConfig>,
    ) -> Result<Self, RouterError> {
        let mut peers = HashMap::new();
        for neighbor in neighbors {
            let transport = Transport::bind(neighbor.port).await?;
            peers.insert(neighbor.address, transport);
        }
        Ok(Self { peers })
    }

    pub fn get(&self, address: Addr) -> Option<&Transport> {
        self.peers.get(&address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Addr, &Transport)> {
        self.peers.iter()
    }

    /// Send `bytes` to `to`, logging (never propagating) a failure to look
    /// up or write to that neighbor's socket.
    pub async fn send_to(&self, to: Addr, bytes: &[u8]) {
        match self.peers.get(&to) {
            Some(transport) => {
                if let Err(err) = transport.send(bytes).await {
                    warn!("send to {} failed: {}", to, err);
                }
            }
            None => warn!("no transport for {}", to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::to_int;
    use crate::neighbor::Relation;

    #[tokio::test]
    async fn test_recv_connects_to_sender() {
        let daemon = Transport::bind(0).await.unwrap();
        let daemon_port = daemon.socket.local_addr().unwrap().port();

        let client = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        client
            .connect((Ipv4Addr::LOCALHOST, daemon_port))
            .await
            .unwrap();
        client.send(b"hello").await.unwrap();

        let mut buf = [0u8; 16];
        let n = daemon.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");

        daemon.send(b"world").await.unwrap();
        let mut reply = [0u8; 16];
        let n = client.recv(&mut reply).await.unwrap();
        assert_eq!(&reply[..n], b"world");
    }

    #[tokio::test]
    async fn test_bind_all_one_socket_per_neighbor() {
        let neighbors = vec![
            NeighborConfig {
                address: Addr(to_int("127.0.0.1").unwrap()),
                port: 0,
                relation: Relation::Customer,
            },
            NeighborConfig {
                address: Addr(to_int("127.0.0.2").unwrap()),
                port: 0,
                relation: Relation::Peer,
            },
        ];
        let peers = Peers::bind_all(neighbors).await.unwrap();
        assert!(peers.get(Addr(to_int("127.0.0.1").unwrap())).is_some());
        assert!(peers.get(Addr(to_int("127.0.0.2").unwrap())).is_some());
        assert_eq!(peers.iter().count(), 2);
    }
}
