//! The update/withdraw/data/dump handlers and the export policy (§4.G).
//!
//! These are written as pure functions over `&mut Rib` / `&NeighborRegistry`
//! so they can be exercised without any actual sockets — the reactor
//! (`reactor.rs`) is the only thing that touches transport.

use log::{debug, trace, warn};

use crate::addr::Addr;
use crate::error::RouterError;
use crate::neighbor::{NeighborRegistry, Relation};
use crate::rib::Rib;
use crate::wire::{Empty, Frame, Payload, TableEntry, UpdateAnnounce, UpdateExport, WithdrawEntry};

/// An outgoing frame paired with the neighbor it should be sent to (the
/// registry key / transport socket to use).
pub struct Outgoing {
    pub to: Addr,
    pub frame: Frame,
}

impl Outgoing {
    fn new(to: Addr, frame: Frame) -> Self {
        Self { to, frame }
    }
}

fn reply(to: Addr, payload: Payload) -> Outgoing {
    Outgoing::new(to, Frame::new(to.self_addr(), to, payload))
}

/// The customer/peer/provider no-transit rule (§4.G): a route learned from
/// a customer is advertised to everyone; a route learned from a peer or
/// provider is advertised only to customers.
fn export_targets<'a>(
    registry: &'a NeighborRegistry,
    source: Addr,
) -> impl Iterator<Item = &'a Addr> + 'a {
    let source_relation = registry.relation(source);
    registry.iter().filter_map(move |n| match source_relation {
        Some(Relation::Customer) => (n.address != source).then(|| &n.address),
        Some(_) => {
            (n.address != source && n.relation == Relation::Customer).then(|| &n.address)
        }
        None => None,
    })
}

/// handle_update (§4.G): admit the announcement, log it, aggregate, then
/// re-advertise per the export policy with attributes stripped to the
/// transitive set.
pub fn handle_update(
    rib: &mut Rib,
    registry: &NeighborRegistry,
    local_asn: u32,
    src: Addr,
    announce: UpdateAnnounce,
) -> Result<Vec<Outgoing>, RouterError> {
    let next_hop = src.peer_addr();
    if !registry.contains(next_hop) {
        warn!("update from unknown neighbor {}", src);
        return Err(RouterError::UnknownNeighbor(src.to_string()));
    }

    rib.apply_update(&announce, next_hop)?;
    debug!(
        "admitted update for {}/{} via {}",
        announce.network,
        crate::addr::mask_to_len(announce.netmask.0).unwrap_or(0),
        next_hop
    );

    let mut as_path = announce.as_path.clone();
    as_path.insert(0, local_asn);
    let export = UpdateExport {
        network: announce.network,
        netmask: announce.netmask,
        as_path,
    };

    let mut outgoing = Vec::new();
    for &target in export_targets(registry, next_hop) {
        outgoing.push(reply(target, Payload::Update(export.clone())));
    }
    Ok(outgoing)
}

/// handle_withdraw (§4.G): disaggregate, log, remove the withdrawn
/// prefixes from the next-hop they arrived on, re-aggregate, then forward
/// the withdrawal verbatim per the export policy.
pub fn handle_withdraw(
    rib: &mut Rib,
    registry: &NeighborRegistry,
    src: Addr,
    withdrawn: Vec<WithdrawEntry>,
) -> Result<Vec<Outgoing>, RouterError> {
    let src_neighbor = src.peer_addr();
    if !registry.contains(src_neighbor) {
        warn!("withdraw from unknown neighbor {}", src);
        return Err(RouterError::UnknownNeighbor(src.to_string()));
    }

    rib.apply_withdraw(&withdrawn, src_neighbor);
    debug!("withdrew {} prefixes from {}", withdrawn.len(), src_neighbor);

    let mut outgoing = Vec::new();
    for &target in export_targets(registry, src_neighbor) {
        outgoing.push(reply(target, Payload::Withdraw(withdrawn.clone())));
    }
    Ok(outgoing)
}

/// handle_data (§4.G): best-path lookup, and the no-transit rule for the
/// data plane. No split-horizon: a chosen route may point right back at
/// the neighbor that sent the data (§9 of the expanded spec).
pub fn handle_data(
    registry: &NeighborRegistry,
    rib: &Rib,
    src: Addr,
    frame: Frame,
) -> Result<Vec<Outgoing>, RouterError> {
    let src_neighbor = src.peer_addr();
    if !registry.contains(src_neighbor) {
        warn!("data from unknown neighbor {}", src);
        return Err(RouterError::UnknownNeighbor(src.to_string()));
    }

    let route = match rib.best_path(frame.dst) {
        Some(route) => route,
        None => {
            trace!("no route to {}", frame.dst);
            return Ok(vec![reply(src, Payload::NoRoute(Empty {}))]);
        }
    };

    let src_relation = registry.relation(src_neighbor);
    let next_hop_relation = registry.relation(route.next_hop);
    let permitted = src_relation == Some(Relation::Customer)
        || next_hop_relation == Some(Relation::Customer);

    if !permitted {
        trace!(
            "dropping data {} -> {} (no-transit): src={:?} next_hop={:?}",
            src,
            frame.dst,
            src_relation,
            next_hop_relation
        );
        return Ok(vec![]);
    }

    Ok(vec![Outgoing::new(route.next_hop, frame)])
}

/// handle_dump (§4.G): reply to the requester with the current RIB.
pub fn handle_dump(rib: &Rib, src: Addr) -> Vec<Outgoing> {
    let table: Vec<TableEntry> = rib.entries().iter().map(|e| e.to_table_entry()).collect();
    vec![reply(src, Payload::Table(table))]
}
