//! SAI object types and object id encoding.
//!
//! Object ids are opaque 64-bit handles. Their textual form on the wire is
//! `oid:0x<hex>`; object types travel by their `SAI_OBJECT_TYPE_*` name.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw SAI object ID type (matches sai_object_id_t in C).
pub type RawSaiObjectId = u64;

/// SAI_NULL_OBJECT_ID.
pub const NULL_OBJECT_ID: RawSaiObjectId = 0;

/// Parse failures for object types and object ids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}

macro_rules! define_object_types {
    ($($variant:ident = $value:literal => $name:literal,)*) => {
        /// SAI object types, numbered as in `sai_object_type_t`.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SaiObjectType {
            $($variant = $value,)*
        }

        impl SaiObjectType {
            /// Every known object type in numeric order.
            pub const ALL: &'static [SaiObjectType] = &[$(SaiObjectType::$variant,)*];

            /// Returns the `SAI_OBJECT_TYPE_*` name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(SaiObjectType::$variant => $name,)*
                }
            }

            /// Converts a numeric object type tag.
            pub fn from_raw(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some(SaiObjectType::$variant),)*
                    _ => None,
                }
            }
        }

        impl FromStr for SaiObjectType {
            type Err = TypeParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(SaiObjectType::$variant),)*
                    _ => Err(TypeParseError::UnknownObjectType(s.to_string())),
                }
            }
        }
    };
}

define_object_types! {
    Null = 0 => "SAI_OBJECT_TYPE_NULL",
    Port = 1 => "SAI_OBJECT_TYPE_PORT",
    Lag = 2 => "SAI_OBJECT_TYPE_LAG",
    VirtualRouter = 3 => "SAI_OBJECT_TYPE_VIRTUAL_ROUTER",
    NextHop = 4 => "SAI_OBJECT_TYPE_NEXT_HOP",
    NextHopGroup = 5 => "SAI_OBJECT_TYPE_NEXT_HOP_GROUP",
    RouterInterface = 6 => "SAI_OBJECT_TYPE_ROUTER_INTERFACE",
    AclTable = 7 => "SAI_OBJECT_TYPE_ACL_TABLE",
    AclEntry = 8 => "SAI_OBJECT_TYPE_ACL_ENTRY",
    AclCounter = 9 => "SAI_OBJECT_TYPE_ACL_COUNTER",
    AclRange = 10 => "SAI_OBJECT_TYPE_ACL_RANGE",
    AclTableGroup = 11 => "SAI_OBJECT_TYPE_ACL_TABLE_GROUP",
    AclTableGroupMember = 12 => "SAI_OBJECT_TYPE_ACL_TABLE_GROUP_MEMBER",
    Hostif = 13 => "SAI_OBJECT_TYPE_HOSTIF",
    MirrorSession = 14 => "SAI_OBJECT_TYPE_MIRROR_SESSION",
    Samplepacket = 15 => "SAI_OBJECT_TYPE_SAMPLEPACKET",
    Stp = 16 => "SAI_OBJECT_TYPE_STP",
    HostifTrapGroup = 17 => "SAI_OBJECT_TYPE_HOSTIF_TRAP_GROUP",
    Policer = 18 => "SAI_OBJECT_TYPE_POLICER",
    Wred = 19 => "SAI_OBJECT_TYPE_WRED",
    QosMap = 20 => "SAI_OBJECT_TYPE_QOS_MAP",
    Queue = 21 => "SAI_OBJECT_TYPE_QUEUE",
    Scheduler = 22 => "SAI_OBJECT_TYPE_SCHEDULER",
    SchedulerGroup = 23 => "SAI_OBJECT_TYPE_SCHEDULER_GROUP",
    BufferPool = 24 => "SAI_OBJECT_TYPE_BUFFER_POOL",
    BufferProfile = 25 => "SAI_OBJECT_TYPE_BUFFER_PROFILE",
    IngressPriorityGroup = 26 => "SAI_OBJECT_TYPE_INGRESS_PRIORITY_GROUP",
    LagMember = 27 => "SAI_OBJECT_TYPE_LAG_MEMBER",
    Hash = 28 => "SAI_OBJECT_TYPE_HASH",
    Udf = 29 => "SAI_OBJECT_TYPE_UDF",
    UdfMatch = 30 => "SAI_OBJECT_TYPE_UDF_MATCH",
    UdfGroup = 31 => "SAI_OBJECT_TYPE_UDF_GROUP",
    FdbEntry = 32 => "SAI_OBJECT_TYPE_FDB_ENTRY",
    Switch = 33 => "SAI_OBJECT_TYPE_SWITCH",
    HostifTrap = 34 => "SAI_OBJECT_TYPE_HOSTIF_TRAP",
    HostifTableEntry = 35 => "SAI_OBJECT_TYPE_HOSTIF_TABLE_ENTRY",
    NeighborEntry = 36 => "SAI_OBJECT_TYPE_NEIGHBOR_ENTRY",
    RouteEntry = 37 => "SAI_OBJECT_TYPE_ROUTE_ENTRY",
    Vlan = 38 => "SAI_OBJECT_TYPE_VLAN",
    VlanMember = 39 => "SAI_OBJECT_TYPE_VLAN_MEMBER",
    HostifPacket = 40 => "SAI_OBJECT_TYPE_HOSTIF_PACKET",
    TunnelMap = 41 => "SAI_OBJECT_TYPE_TUNNEL_MAP",
    Tunnel = 42 => "SAI_OBJECT_TYPE_TUNNEL",
    TunnelTermTableEntry = 43 => "SAI_OBJECT_TYPE_TUNNEL_TERM_TABLE_ENTRY",
    FdbFlush = 44 => "SAI_OBJECT_TYPE_FDB_FLUSH",
    NextHopGroupMember = 45 => "SAI_OBJECT_TYPE_NEXT_HOP_GROUP_MEMBER",
    StpPort = 46 => "SAI_OBJECT_TYPE_STP_PORT",
    RpfGroup = 47 => "SAI_OBJECT_TYPE_RPF_GROUP",
    RpfGroupMember = 48 => "SAI_OBJECT_TYPE_RPF_GROUP_MEMBER",
    L2mcGroup = 49 => "SAI_OBJECT_TYPE_L2MC_GROUP",
    L2mcGroupMember = 50 => "SAI_OBJECT_TYPE_L2MC_GROUP_MEMBER",
    IpmcGroup = 51 => "SAI_OBJECT_TYPE_IPMC_GROUP",
    IpmcGroupMember = 52 => "SAI_OBJECT_TYPE_IPMC_GROUP_MEMBER",
    L2mcEntry = 53 => "SAI_OBJECT_TYPE_L2MC_ENTRY",
    IpmcEntry = 54 => "SAI_OBJECT_TYPE_IPMC_ENTRY",
    McastFdbEntry = 55 => "SAI_OBJECT_TYPE_MCAST_FDB_ENTRY",
    HostifUserDefinedTrap = 56 => "SAI_OBJECT_TYPE_HOSTIF_USER_DEFINED_TRAP",
    Bridge = 57 => "SAI_OBJECT_TYPE_BRIDGE",
    BridgePort = 58 => "SAI_OBJECT_TYPE_BRIDGE_PORT",
    TunnelMapEntry = 59 => "SAI_OBJECT_TYPE_TUNNEL_MAP_ENTRY",
}

impl SaiObjectType {
    /// Returns true for types whose instances are addressed by an object id
    /// rather than by a composite entry key.
    pub fn is_object_id_type(self) -> bool {
        !matches!(
            self,
            SaiObjectType::Null
                | SaiObjectType::FdbEntry
                | SaiObjectType::NeighborEntry
                | SaiObjectType::RouteEntry
                | SaiObjectType::L2mcEntry
                | SaiObjectType::IpmcEntry
                | SaiObjectType::McastFdbEntry
                | SaiObjectType::FdbFlush
                | SaiObjectType::HostifPacket
        )
    }
}

impl fmt::Display for SaiObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Version of the SAI headers this vocabulary mirrors, encoded as
/// `100000 * major + 1000 * minor + revision`.
pub const SAI_API_VERSION: u64 = 114_000;

/// SAI API groups (`sai_api_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiApi {
    Unspecified,
    Switch,
    Port,
    Fdb,
    Vlan,
    VirtualRouter,
    Route,
    NextHop,
    NextHopGroup,
    RouterInterface,
    Neighbor,
    Acl,
    Hostif,
    Queue,
    Bridge,
}

/// SAI log levels (`sai_log_level_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SaiLogLevel {
    Debug,
    Info,
    Notice,
    Warn,
    Error,
    Critical,
}

/// Serializes an object id as `oid:0x<hex>`.
pub fn serialize_object_id(oid: RawSaiObjectId) -> String {
    format!("oid:0x{:x}", oid)
}

/// Parses the `oid:0x<hex>` form produced by [`serialize_object_id`].
pub fn deserialize_object_id(s: &str) -> Result<RawSaiObjectId, TypeParseError> {
    s.strip_prefix("oid:0x")
        .and_then(|hex| RawSaiObjectId::from_str_radix(hex, 16).ok())
        .ok_or_else(|| TypeParseError::InvalidObjectId(s.to_string()))
}

/// Serde adapter storing an object id in its `oid:0x<hex>` form.
///
/// Use with `#[serde(with = "sonic_sai::types::oid_serde")]`.
pub mod oid_serde {
    use super::{deserialize_object_id, serialize_object_id, RawSaiObjectId};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(oid: &RawSaiObjectId, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&serialize_object_id(*oid))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<RawSaiObjectId, D::Error> {
        let s = String::deserialize(d)?;
        deserialize_object_id(&s).map_err(D::Error::custom)
    }
}
