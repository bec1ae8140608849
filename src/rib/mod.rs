//! The routing information base (§3, §4.C–§4.F): the forwarding table, its
//! append-only history, the aggregation engine, and the best-path selector.

mod aggregate;
mod history;
mod select;

pub use history::History;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::addr::{Addr, Prefix};
use crate::wire::{TableEntry, UpdateAnnounce, WithdrawEntry};

/// Origin of a route, strictly ordered `Igp > Egp > Unk`.
///
/// Declared in ascending "goodness" order so the derived [`Ord`] directly
/// expresses the decision-ladder rule ("better origin wins").
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    Unk,
    Egp,
    Igp,
}

impl Origin {
    fn as_str(self) -> &'static str {
        match self {
            Origin::Igp => "IGP",
            Origin::Egp => "EGP",
            Origin::Unk => "UNK",
        }
    }
}

impl Serialize for Origin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Origin {
    fn deserialize<D>(deserializer: D) -> Result<Origin, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "IGP" => Ok(Origin::Igp),
            "EGP" => Ok(Origin::Egp),
            "UNK" => Ok(Origin::Unk),
            other => Err(de::Error::custom(format!("unknown origin '{}'", other))),
        }
    }
}

/// One forwarding-table entry.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteEntry {
    pub prefix: Prefix,
    pub next_hop: Addr,
    pub local_pref: u32,
    pub as_path: Vec<u32>,
    pub self_origin: bool,
    pub origin: Origin,
}

impl RouteEntry {
    fn from_announce(
        announce: &UpdateAnnounce,
        next_hop: Addr,
    ) -> Result<Self, crate::error::RouterError> {
        let prefix = Prefix::from_network_and_mask(announce.network, announce.netmask)?;
        Ok(Self {
            prefix,
            next_hop,
            local_pref: announce.localpref,
            as_path: announce.as_path.clone(),
            self_origin: announce.self_origin,
            origin: announce.origin,
        })
    }

    /// Two entries are attribute-identical iff they share next_hop,
    /// local_pref, as_path, self_origin and origin (§3).
    fn same_attributes(&self, other: &RouteEntry) -> bool {
        self.next_hop == other.next_hop
            && self.local_pref == other.local_pref
            && self.as_path == other.as_path
            && self.self_origin == other.self_origin
            && self.origin == other.origin
    }

    pub fn to_table_entry(&self) -> TableEntry {
        TableEntry {
            network: self.prefix.network,
            netmask: self.prefix.netmask(),
            peer: self.next_hop,
            localpref: self.local_pref,
            self_origin: self.self_origin,
            as_path: self.as_path.clone(),
            origin: self.origin,
        }
    }
}

/// The forwarding table, plus the history log that is its source of truth.
#[derive(Debug, Default)]
pub struct Rib {
    entries: Vec<RouteEntry>,
    history: History,
}

impl Rib {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// handle_update, RIB-facing half (§4.G): append the entry, log the
    /// announcement, then re-run aggregation to the fixed point.
    pub fn apply_update(
        &mut self,
        announce: &UpdateAnnounce,
        next_hop: Addr,
    ) -> Result<(), crate::error::RouterError> {
        let entry = RouteEntry::from_announce(announce, next_hop)?;
        self.entries.push(entry);
        self.history.push_announce(announce.clone(), next_hop);
        aggregate::aggregate(&mut self.entries);
        Ok(())
    }

    /// handle_withdraw, RIB-facing half (§4.G): disaggregate to the flat,
    /// pre-aggregation entry list (replaying all prior history), log the new
    /// withdrawal, remove its matching entries from that flat list, then
    /// aggregate once.
    pub fn apply_withdraw(&mut self, withdrawn: &[WithdrawEntry], src_neighbor: Addr) {
        self.disaggregate();
        self.history.push_withdraw(withdrawn.to_vec(), src_neighbor);
        remove_withdrawn(&mut self.entries, withdrawn, src_neighbor);
        aggregate::aggregate(&mut self.entries);
    }

    /// Disaggregation (§4.E): clear the RIB, replay every announcement and
    /// every withdrawal without touching the history log or running
    /// aggregation. Leaves `self.entries` flat; the caller aggregates once
    /// it has also applied whatever new mutation prompted the disaggregate.
    fn disaggregate(&mut self) {
        self.entries.clear();
        for (announce, next_hop) in self.history.announcements() {
            if let Ok(entry) = RouteEntry::from_announce(announce, *next_hop) {
                self.entries.push(entry);
            }
        }
        for (withdrawn, src_neighbor) in self.history.withdrawals() {
            remove_withdrawn(&mut self.entries, withdrawn, *src_neighbor);
        }
    }

    /// Best-path selection for a data-plane destination (§4.F).
    pub fn best_path(&self, dest: Addr) -> Option<&RouteEntry> {
        select::best_path(&self.entries, dest)
    }
}

fn remove_withdrawn(entries: &mut Vec<RouteEntry>, withdrawn: &[WithdrawEntry], src_neighbor: Addr) {
    let peer = src_neighbor.peer_addr();
    for w in withdrawn {
        entries.retain(|e| {
            !(e.prefix.network == w.network && e.prefix.netmask() == w.netmask && e.next_hop == peer)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::to_int;

    fn announce(network: &str, netmask: &str, local_pref: u32) -> UpdateAnnounce {
        UpdateAnnounce {
            network: Addr(to_int(network).unwrap()),
            netmask: Addr(to_int(netmask).unwrap()),
            localpref: local_pref,
            self_origin: false,
            as_path: vec![2],
            origin: Origin::Igp,
        }
    }

    #[test]
    fn test_apply_update_inserts_entry() {
        let mut rib = Rib::new();
        rib.apply_update(&announce("172.16.0.0", "255.255.0.0", 100), Addr(1))
            .unwrap();
        assert_eq!(rib.len(), 1);
        assert_eq!(rib.entries()[0].prefix.length, 16);
    }

    #[test]
    fn test_aggregation_on_update() {
        let mut rib = Rib::new();
        let next_hop = Addr(to_int("192.168.0.2").unwrap());
        rib.apply_update(&announce("192.168.0.0", "255.255.255.0", 100), next_hop)
            .unwrap();
        rib.apply_update(&announce("192.168.1.0", "255.255.255.0", 100), next_hop)
            .unwrap();
        assert_eq!(rib.len(), 1);
        assert_eq!(rib.entries()[0].prefix.length, 23);
    }

    #[test]
    fn test_withdraw_disaggregates() {
        let mut rib = Rib::new();
        let neighbor = Addr(to_int("192.168.0.2").unwrap());
        rib.apply_update(
            &announce("192.168.0.0", "255.255.255.0", 100),
            neighbor.peer_addr(),
        )
        .unwrap();
        rib.apply_update(
            &announce("192.168.1.0", "255.255.255.0", 100),
            neighbor.peer_addr(),
        )
        .unwrap();
        assert_eq!(rib.len(), 1);

        rib.apply_withdraw(
            &[WithdrawEntry {
                network: Addr(to_int("192.168.1.0").unwrap()),
                netmask: Addr(to_int("255.255.255.0").unwrap()),
            }],
            neighbor,
        );
        assert_eq!(rib.len(), 1);
        assert_eq!(rib.entries()[0].prefix.length, 24);
        assert_eq!(
            rib.entries()[0].prefix.network,
            Addr(to_int("192.168.0.0").unwrap())
        );
    }

    #[test]
    fn test_full_withdraw_empties_rib() {
        let mut rib = Rib::new();
        let neighbor = Addr(to_int("192.168.0.2").unwrap());
        rib.apply_update(
            &announce("192.168.0.0", "255.255.255.0", 100),
            neighbor.peer_addr(),
        )
        .unwrap();
        rib.apply_withdraw(
            &[WithdrawEntry {
                network: Addr(to_int("192.168.0.0").unwrap()),
                netmask: Addr(to_int("255.255.255.0").unwrap()),
            }],
            neighbor,
        );
        assert!(rib.is_empty());
    }

    #[test]
    fn test_origin_ordering() {
        assert!(Origin::Igp > Origin::Egp);
        assert!(Origin::Egp > Origin::Unk);
    }
}
