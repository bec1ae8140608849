use std::fmt;
use std::io;

/// Errors surfaced by the RIB core and its supporting modules.
///
/// Only [`RouterError::Config`] is ever fatal (it can only occur before the
/// reactor starts); every other variant is logged and the offending frame is
/// dropped, per the error handling design.
#[derive(Debug)]
pub enum RouterError {
    /// A frame could not be decoded, or decoded to something invalid
    /// (unknown `type`, missing field, non-contiguous netmask, ...).
    Malformed(String),
    /// A frame arrived whose `src` does not match any configured neighbor.
    UnknownNeighbor(String),
    /// Sending on a neighbor's socket failed.
    Transport(String),
    /// The startup configuration file was invalid.
    Config(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Malformed(reason) => write!(f, "malformed frame: {}", reason),
            RouterError::UnknownNeighbor(addr) => write!(f, "unknown neighbor: {}", addr),
            RouterError::Transport(reason) => write!(f, "transport error: {}", reason),
            RouterError::Config(reason) => write!(f, "config error: {}", reason),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<serde_json::Error> for RouterError {
    fn from(error: serde_json::Error) -> Self {
        RouterError::Malformed(error.to_string())
    }
}

impl From<io::Error> for RouterError {
    fn from(error: io::Error) -> Self {
        RouterError::Transport(error.to_string())
    }
}
