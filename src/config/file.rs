//! On-disk shape of the startup configuration (§4.J): `Deserialize`-only
//! structs matching the TOML file exactly, with no validation performed
//! yet. `config::mod` is what turns this into something the reactor trusts.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RouterError;
use crate::neighbor::Relation;

#[derive(Debug, Deserialize)]
pub(super) struct NeighborConfigSpec {
    pub(super) port: u16,
    pub(super) address: String,
    pub(super) relation: Relation,
}

#[derive(Debug, Deserialize)]
pub(super) struct DaemonConfigSpec {
    pub(super) asn: u32,
    #[serde(default = "Vec::new")]
    pub(super) neighbors: Vec<NeighborConfigSpec>,
}

impl DaemonConfigSpec {
    pub(super) fn from_file(path: &Path) -> Result<Self, RouterError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| RouterError::Config(format!("reading {}: {}", path.display(), err)))?;
        toml::from_str(&contents)
            .map_err(|err| RouterError::Config(format!("parsing {}: {}", path.display(), err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            asn = 1
            [[neighbors]]
            port = 12345
            address = "192.168.0.2"
            relation = "cust"
        "#;
        let spec: DaemonConfigSpec = toml::from_str(toml).unwrap();
        assert_eq!(spec.asn, 1);
        assert_eq!(spec.neighbors.len(), 1);
        assert_eq!(spec.neighbors[0].port, 12345);
        assert_eq!(spec.neighbors[0].relation, Relation::Customer);
    }

    #[test]
    fn test_rejects_bad_relation() {
        let toml = r#"
            asn = 1
            [[neighbors]]
            port = 12345
            address = "192.168.0.2"
            relation = "transit"
        "#;
        let result: Result<DaemonConfigSpec, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_neighbors_defaults_to_empty() {
        let spec: DaemonConfigSpec = toml::from_str("asn = 42").unwrap();
        assert!(spec.neighbors.is_empty());
    }
}
