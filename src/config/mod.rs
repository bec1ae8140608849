//! Startup configuration (§4.J): the raw on-disk spec, validated and
//! converted into the in-memory shape the reactor trusts.

mod file;

use std::collections::HashSet;
use std::path::Path;

use crate::addr::{to_int, Addr};
use crate::error::RouterError;
use crate::neighbor::Relation;

/// Validated, in-memory configuration for one neighbor.
#[derive(Debug, Clone, Copy)]
pub struct NeighborConfig {
    pub address: Addr,
    pub port: u16,
    pub relation: Relation,
}

/// Validated, in-memory startup configuration.
#[derive(Debug)]
pub struct DaemonConfig {
    pub asn: u32,
    pub neighbors: Vec<NeighborConfig>,
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> Result<Self, RouterError> {
        let spec = file::DaemonConfigSpec::from_file(path)?;
        Self::from_spec(spec)
    }

    fn from_spec(spec: file::DaemonConfigSpec) -> Result<Self, RouterError> {
        let mut seen = HashSet::new();
        let mut neighbors = Vec::with_capacity(spec.neighbors.len());
        for n in spec.neighbors {
            let address = Addr(to_int(&n.address)?);
            if !seen.insert(address) {
                return Err(RouterError::Config(format!(
                    "duplicate neighbor address: {}",
                    n.address
                )));
            }
            neighbors.push(NeighborConfig {
                address,
                port: n.port,
                relation: n.relation,
            });
        }
        Ok(Self {
            asn: spec.asn,
            neighbors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_file_loads_neighbors() {
        let file = write_config(
            r#"
            asn = 1
            [[neighbors]]
            port = 12345
            address = "192.168.0.2"
            relation = "cust"
            [[neighbors]]
            port = 12346
            address = "192.168.1.2"
            relation = "peer"
        "#,
        );
        let config = DaemonConfig::from_file(file.path()).unwrap();
        assert_eq!(config.asn, 1);
        assert_eq!(config.neighbors.len(), 2);
    }

    #[test]
    fn test_duplicate_neighbor_rejected() {
        let file = write_config(
            r#"
            asn = 1
            [[neighbors]]
            port = 12345
            address = "192.168.0.2"
            relation = "cust"
            [[neighbors]]
            port = 12346
            address = "192.168.0.2"
            relation = "peer"
        "#,
        );
        assert!(DaemonConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_unreadable_file_is_config_error() {
        let result = DaemonConfig::from_file(Path::new("/nonexistent/path.toml"));
        assert!(matches!(result, Err(RouterError::Config(_))));
    }
}
