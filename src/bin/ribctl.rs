//! Debug client (§4.M): sends a `dump` to a running daemon over UDP and
//! pretty-prints the returned table.
//!
//! Grounded on the teacher's separate `cli` binary: a small `OutputTable<T:
//! ToRow>` wrapper around `prettytable-rs` that each printable type
//! implements `ToRow` for, the same separation `cli/src/table.rs` makes
//! between "how to print any table" and "what a route's row looks like".

use std::marker::PhantomData;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use prettytable::{format, row, Row, Table};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use asbgpd::addr::Addr;
use asbgpd::error::RouterError;
use asbgpd::wire::{Empty, Frame, Payload, TableEntry};

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Debug client for a running asbgpd daemon.
///
/// Queries the daemon over the same link as one of its configured
/// neighbors: `neighbor_address` must match that neighbor's `address` in
/// the daemon's config, and `neighbor_port` its `port`, since the daemon
/// replies to the claimed source address, routed out over that neighbor's
/// socket.
#[derive(Parser, Debug)]
#[command(name = "ribctl", version, author)]
struct Cli {
    /// The neighbor address to query as, e.g. 192.168.0.2.
    neighbor_address: String,

    /// That neighbor's configured port on the daemon.
    neighbor_port: u16,
}

trait ToRow {
    fn columns() -> Row;
    fn to_row(&self) -> Row;
}

struct OutputTable<T: ToRow> {
    inner: Table,
    row_type: PhantomData<T>,
}

impl<T: ToRow> OutputTable<T> {
    fn new() -> Self {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.add_row(T::columns());
        Self {
            inner: table,
            row_type: PhantomData,
        }
    }

    fn add_row(&mut self, row: &T) {
        self.inner.add_row(row.to_row());
    }

    fn print(&self) {
        self.inner.print_tty(false).ok();
    }
}

impl ToRow for TableEntry {
    fn columns() -> Row {
        row![
            b->"network", b->"peer", b->"localpref", b->"self", b->"as_path", b->"origin"
        ]
    }

    fn to_row(&self) -> Row {
        let self_origin = if self.self_origin {
            "yes".green().to_string()
        } else {
            "no".to_string()
        };
        let as_path = self
            .as_path
            .iter()
            .map(|asn| asn.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        row![
            format!("{}/{}", self.network, asbgpd::addr::mask_to_len(self.netmask.0).unwrap_or(0)),
            self.peer.to_string(),
            self.localpref.to_string(),
            self_origin,
            as_path,
            format!("{:?}", self.origin),
        ]
    }
}

#[tokio::main]
async fn main() -> Result<(), RouterError> {
    let cli = Cli::parse();
    let neighbor: Addr = cli.neighbor_address.parse()?;

    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await?;
    let daemon = SocketAddr::from((Ipv4Addr::LOCALHOST, cli.neighbor_port));

    let request = Frame::new(neighbor, neighbor.self_addr(), Payload::Dump(Empty {}));
    socket.send_to(&request.encode(), daemon).await?;

    let mut buf = vec![0u8; 65_507];
    let n = match timeout(REPLY_TIMEOUT, socket.recv_from(&mut buf)).await {
        Ok(result) => result?.0,
        Err(_) => {
            eprintln!("{}", "timed out waiting for a reply".red());
            return Ok(());
        }
    };

    let reply = Frame::decode(&buf[..n])?;
    match reply.payload {
        Payload::Table(entries) => {
            let mut table = OutputTable::<TableEntry>::new();
            for entry in &entries {
                table.add_row(entry);
            }
            table.print();
        }
        other => {
            eprintln!("unexpected reply type: {}", other.type_name());
        }
    }
    Ok(())
}
