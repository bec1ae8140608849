//! The neighbor registry (§4.B): who we peer with, and on what commercial
//! terms.

use std::collections::HashMap;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::addr::Addr;

/// Commercial relationship with a neighbor, controlling the export policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Customer,
    Peer,
    Provider,
}

impl Relation {
    fn as_str(self) -> &'static str {
        match self {
            Relation::Customer => "cust",
            Relation::Peer => "peer",
            Relation::Provider => "prov",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cust" => Ok(Relation::Customer),
            "peer" => Ok(Relation::Peer),
            "prov" => Ok(Relation::Provider),
            other => Err(format!("unsupported relation '{}'", other)),
        }
    }
}

impl Serialize for Relation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Relation {
    fn deserialize<D>(deserializer: D) -> Result<Relation, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A configured neighbor, as the core sees it: address and commercial
/// relationship. The transport handle (an owned UDP socket) lives alongside
/// this in the reactor's `transport::Peers` map, not here — the core never
/// touches sockets directly.
#[derive(Copy, Clone, Debug)]
pub struct NeighborInfo {
    pub address: Addr,
    pub relation: Relation,
}

/// Fixed-at-startup table of all known neighbors, keyed by neighbor address.
#[derive(Debug, Default)]
pub struct NeighborRegistry {
    neighbors: HashMap<Addr, NeighborInfo>,
}

impl NeighborRegistry {
    pub fn new(neighbors: impl IntoIterator<Item = NeighborInfo>) -> Self {
        Self {
            neighbors: neighbors.into_iter().map(|n| (n.address, n)).collect(),
        }
    }

    pub fn relation(&self, address: Addr) -> Option<Relation> {
        self.neighbors.get(&address).map(|n| n.relation)
    }

    pub fn contains(&self, address: Addr) -> bool {
        self.neighbors.contains_key(&address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborInfo> {
        self.neighbors.values()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_round_trip() {
        for relation in [Relation::Customer, Relation::Peer, Relation::Provider] {
            let s = relation.to_string();
            assert_eq!(s.parse::<Relation>().unwrap().as_str(), relation.as_str());
        }
    }

    #[test]
    fn test_relation_rejects_unknown() {
        assert!("transit".parse::<Relation>().is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = NeighborRegistry::new(vec![NeighborInfo {
            address: Addr(1),
            relation: Relation::Customer,
        }]);
        assert_eq!(registry.relation(Addr(1)), Some(Relation::Customer));
        assert_eq!(registry.relation(Addr(2)), None);
    }
}
