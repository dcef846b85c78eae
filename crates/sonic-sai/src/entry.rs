//! Object keys: plain object ids and composite entry keys.
//!
//! Entry-addressed objects (FDB, neighbor and route entries) have no object
//! id of their own; the key itself is serialized as a JSON object in place of
//! the id, e.g. `{"dest":"10.0.0.0/24","switch_id":"oid:0x21000000000000","vr":"oid:0x3000000000001"}`.

use crate::net::{IpPrefix, MacAddress};
use crate::types::{oid_serde, serialize_object_id, RawSaiObjectId, SaiObjectType};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// `sai_fdb_entry_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FdbEntry {
    #[serde(with = "oid_serde")]
    pub bvid: RawSaiObjectId,
    pub mac: MacAddress,
    #[serde(with = "oid_serde")]
    pub switch_id: RawSaiObjectId,
}

/// `sai_neighbor_entry_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborEntry {
    pub ip: IpAddr,
    #[serde(with = "oid_serde")]
    pub rif: RawSaiObjectId,
    #[serde(with = "oid_serde")]
    pub switch_id: RawSaiObjectId,
}

/// `sai_route_entry_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteEntry {
    pub dest: IpPrefix,
    #[serde(with = "oid_serde")]
    pub switch_id: RawSaiObjectId,
    #[serde(with = "oid_serde")]
    pub vr: RawSaiObjectId,
}

/// Identifies one object: either by id or by a composite entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    Oid(RawSaiObjectId),
    Fdb(FdbEntry),
    Neighbor(NeighborEntry),
    Route(RouteEntry),
}

impl ObjectKey {
    /// The object type an entry key belongs to; `None` for plain ids.
    pub fn entry_type(&self) -> Option<SaiObjectType> {
        match self {
            ObjectKey::Oid(_) => None,
            ObjectKey::Fdb(_) => Some(SaiObjectType::FdbEntry),
            ObjectKey::Neighbor(_) => Some(SaiObjectType::NeighborEntry),
            ObjectKey::Route(_) => Some(SaiObjectType::RouteEntry),
        }
    }

    /// Returns true if this key can address an object of `object_type`.
    pub fn matches_type(&self, object_type: SaiObjectType) -> bool {
        match self.entry_type() {
            Some(t) => t == object_type,
            None => object_type.is_object_id_type(),
        }
    }

    /// The switch an entry key names explicitly, if any.
    pub fn entry_switch_id(&self) -> Option<RawSaiObjectId> {
        match self {
            ObjectKey::Oid(_) => None,
            ObjectKey::Fdb(e) => Some(e.switch_id),
            ObjectKey::Neighbor(e) => Some(e.switch_id),
            ObjectKey::Route(e) => Some(e.switch_id),
        }
    }

    /// The object id, for id-addressed keys.
    pub fn object_id(&self) -> Option<RawSaiObjectId> {
        match self {
            ObjectKey::Oid(oid) => Some(*oid),
            _ => None,
        }
    }

    /// Serialized form used after `<object type>:` in request keys.
    pub fn serialize(&self) -> String {
        let json = match self {
            ObjectKey::Oid(oid) => return serialize_object_id(*oid),
            ObjectKey::Fdb(e) => serde_json::to_string(e),
            ObjectKey::Neighbor(e) => serde_json::to_string(e),
            ObjectKey::Route(e) => serde_json::to_string(e),
        };
        // plain structs of strings always serialize
        json.unwrap_or_default()
    }
}

impl From<RawSaiObjectId> for ObjectKey {
    fn from(oid: RawSaiObjectId) -> Self {
        ObjectKey::Oid(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_entry_key() {
        let key = ObjectKey::Route(RouteEntry {
            dest: "10.0.0.0/24".parse().unwrap(),
            switch_id: 0x21000000000000,
            vr: 0x3000000000001,
        });
        assert_eq!(
            key.serialize(),
            r#"{"dest":"10.0.0.0/24","switch_id":"oid:0x21000000000000","vr":"oid:0x3000000000001"}"#
        );
        assert_eq!(key.entry_switch_id(), Some(0x21000000000000));
        assert!(key.matches_type(SaiObjectType::RouteEntry));
        assert!(!key.matches_type(SaiObjectType::Port));
    }

    #[test]
    fn test_fdb_entry_round_trip() {
        let entry = FdbEntry {
            bvid: 0x26000000000001,
            mac: "00:11:22:33:44:55".parse().unwrap(),
            switch_id: 0x21000000000000,
        };
        let json = ObjectKey::Fdb(entry).serialize();
        assert_eq!(
            json,
            r#"{"bvid":"oid:0x26000000000001","mac":"00:11:22:33:44:55","switch_id":"oid:0x21000000000000"}"#
        );
        let back: FdbEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_oid_key() {
        let key = ObjectKey::from(0x1000000000123);
        assert_eq!(key.serialize(), "oid:0x1000000000123");
        assert!(key.matches_type(SaiObjectType::Port));
        assert!(!key.matches_type(SaiObjectType::FdbEntry));
        assert_eq!(key.entry_switch_id(), None);
    }
}
