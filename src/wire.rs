//! The JSON wire codec (§4.H, §6).
//!
//! Every frame is a UTF-8 JSON object `{src, dst, type, msg}`. This module
//! is the only place that touches `serde_json` directly; everything
//! downstream of [`Frame::decode`] operates on already-validated, typed
//! structures.

use serde::{Deserialize, Serialize};

use crate::addr::Addr;
use crate::error::RouterError;
use crate::rib::Origin;

/// A full wire frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
    pub src: Addr,
    pub dst: Addr,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Frame {
    pub fn new(src: Addr, dst: Addr, payload: Payload) -> Self {
        Self { src, dst, payload }
    }

    /// Decode one UDP datagram's worth of bytes into a `Frame`.
    ///
    /// Any JSON error, unknown `type`, or shape mismatch is reported as
    /// [`RouterError::Malformed`] rather than panicking: frames arrive
    /// straight off the network.
    pub fn decode(bytes: &[u8]) -> Result<Self, RouterError> {
        serde_json::from_slice(bytes).map_err(RouterError::from)
    }

    pub fn encode(&self) -> Vec<u8> {
        // Typed payloads always serialize; a failure here would be a bug in
        // this module, not bad input.
        serde_json::to_vec(self).expect("Frame always serializes")
    }
}

/// An empty payload, used for message types that carry no attributes.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

/// One entry of an incoming or forwarded `withdraw.msg` list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEntry {
    pub network: Addr,
    pub netmask: Addr,
}

/// `update.msg`, as received from a neighbor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateAnnounce {
    pub network: Addr,
    pub netmask: Addr,
    pub localpref: u32,
    #[serde(rename = "selfOrigin")]
    pub self_origin: bool,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
    pub origin: Origin,
}

/// `update.msg`, as re-advertised to a peer: attributes are stripped down
/// to the three fields that are transitive across AS boundaries in this
/// model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateExport {
    pub network: Addr,
    pub netmask: Addr,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
}

/// One entry of a `table.msg` response: a RIB entry with all attributes,
/// in wire form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableEntry {
    pub network: Addr,
    pub netmask: Addr,
    pub peer: Addr,
    pub localpref: u32,
    #[serde(rename = "selfOrigin")]
    pub self_origin: bool,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
    pub origin: Origin,
}

/// The typed union of all `type`/`msg` pairs this system speaks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "msg")]
pub enum Payload {
    #[serde(rename = "handshake")]
    Handshake(Empty),
    #[serde(rename = "update")]
    Update(UpdateAnnounce),
    #[serde(rename = "withdraw")]
    Withdraw(Vec<WithdrawEntry>),
    /// Opaque: the data-plane payload is never interpreted by this system,
    /// only forwarded.
    #[serde(rename = "data")]
    Data(serde_json::Value),
    #[serde(rename = "dump")]
    Dump(Empty),
    #[serde(rename = "table")]
    Table(Vec<TableEntry>),
    #[serde(rename = "no route")]
    NoRoute(Empty),
}

impl Payload {
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Handshake(_) => "handshake",
            Payload::Update(_) => "update",
            Payload::Withdraw(_) => "withdraw",
            Payload::Data(_) => "data",
            Payload::Dump(_) => "dump",
            Payload::Table(_) => "table",
            Payload::NoRoute(_) => "no route",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_update() {
        let raw = br#"{
            "src": "192.168.0.2", "dst": "192.168.0.1", "type": "update",
            "msg": {
                "network": "172.16.0.0", "netmask": "255.255.0.0",
                "localpref": 100, "selfOrigin": false,
                "ASPath": [2], "origin": "IGP"
            }
        }"#;
        let frame = Frame::decode(raw).unwrap();
        assert_eq!(frame.payload.type_name(), "update");
        match frame.payload {
            Payload::Update(update) => {
                assert_eq!(update.localpref, 100);
                assert_eq!(update.as_path, vec![2]);
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let raw = br#"{"src": "1.2.3.4", "dst": "1.2.3.1", "type": "bogus", "msg": {}}"#;
        assert!(Frame::decode(raw).is_err());
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(Frame::decode(b"not json").is_err());
    }

    #[test]
    fn test_no_route_type_name_has_space() {
        let frame = Frame::new(Addr(1), Addr(2), Payload::NoRoute(Empty {}));
        let encoded = frame.encode();
        let text = String::from_utf8(encoded).unwrap();
        assert!(text.contains("\"no route\""));
    }

    #[test]
    fn test_export_update_strips_attributes() {
        let export = UpdateExport {
            network: Addr(0),
            netmask: Addr(0),
            as_path: vec![1, 2],
        };
        let value = serde_json::to_value(&export).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("ASPath"));
    }
}
