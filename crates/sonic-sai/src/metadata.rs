//! Static attribute and statistics metadata.
//!
//! Maps `(object type, attribute id)` to the attribute's wire name and value
//! type, and `(object type, stat id)` to the statistic's enum name. The
//! tables carry the attributes the remote layer itself has to understand
//! (switch lifecycle, notification pointers, resource counters) together
//! with the common port, routing and bridging attributes.

use crate::attr::SaiAttrId;
use crate::types::SaiObjectType;
use log::debug;

/// First attribute id of the implementation-specific range shared by every
/// object type (`SAI_*_ATTR_CUSTOM_RANGE_START`).
pub const CUSTOM_RANGE_START: SaiAttrId = 0x1000_0000;

/// Numeric statistic id (`sai_stat_id_t`).
pub type SaiStatId = u32;

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiAttrValueType {
    Bool,
    U8,
    U16,
    U32,
    S32,
    U64,
    Oid,
    OidList,
    U32List,
    S32List,
    Chardata,
    Mac,
    Ip,
    Pointer,
}

impl SaiAttrValueType {
    /// Returns true if the value holds object ids.
    pub fn carries_object_ids(self) -> bool {
        matches!(self, SaiAttrValueType::Oid | SaiAttrValueType::OidList)
    }
}

/// Description of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaiAttrMetadata {
    pub object_type: SaiObjectType,
    pub attr_id: SaiAttrId,
    pub name: &'static str,
    pub value_type: SaiAttrValueType,
}

/// Switch attribute ids.
pub mod switch_attr {
    use crate::attr::SaiAttrId;

    pub const NUMBER_OF_ACTIVE_PORTS: SaiAttrId = 0;
    pub const MAX_NUMBER_OF_SUPPORTED_PORTS: SaiAttrId = 1;
    pub const PORT_LIST: SaiAttrId = 2;
    pub const PORT_MAX_MTU: SaiAttrId = 3;
    pub const CPU_PORT: SaiAttrId = 4;
    pub const DEFAULT_VIRTUAL_ROUTER_ID: SaiAttrId = 5;
    pub const OPER_STATUS: SaiAttrId = 6;
    pub const AVAILABLE_IPV4_ROUTE_ENTRY: SaiAttrId = 7;
    pub const AVAILABLE_IPV6_ROUTE_ENTRY: SaiAttrId = 8;
    pub const AVAILABLE_IPV4_NEXTHOP_ENTRY: SaiAttrId = 9;
    pub const AVAILABLE_IPV4_NEIGHBOR_ENTRY: SaiAttrId = 10;
    pub const AVAILABLE_FDB_ENTRY: SaiAttrId = 11;
    pub const SRC_MAC_ADDRESS: SaiAttrId = 12;
    pub const FDB_AGING_TIME: SaiAttrId = 13;
    pub const RESTART_WARM: SaiAttrId = 14;
    pub const INIT_SWITCH: SaiAttrId = 15;
    pub const SWITCH_HARDWARE_INFO: SaiAttrId = 16;
    pub const SWITCH_STATE_CHANGE_NOTIFY: SaiAttrId = 17;
    pub const SWITCH_SHUTDOWN_REQUEST_NOTIFY: SaiAttrId = 18;
    pub const FDB_EVENT_NOTIFY: SaiAttrId = 19;
    pub const PORT_STATE_CHANGE_NOTIFY: SaiAttrId = 20;
    pub const QUEUE_PFC_DEADLOCK_NOTIFY: SaiAttrId = 21;
    pub const BFD_SESSION_STATE_CHANGE_NOTIFY: SaiAttrId = 22;
}

/// Port attribute ids.
pub mod port_attr {
    use crate::attr::SaiAttrId;

    pub const TYPE: SaiAttrId = 0;
    pub const OPER_STATUS: SaiAttrId = 1;
    pub const QOS_NUMBER_OF_QUEUES: SaiAttrId = 2;
    pub const QOS_QUEUE_LIST: SaiAttrId = 3;
    pub const HW_LANE_LIST: SaiAttrId = 4;
    pub const SPEED: SaiAttrId = 5;
    pub const FEC_MODE: SaiAttrId = 6;
    pub const ADMIN_STATE: SaiAttrId = 7;
    pub const MTU: SaiAttrId = 8;
}

/// Flex counter stats mode values.
pub mod stats_mode {
    pub const READ: i32 = 1 << 0;
    pub const READ_AND_CLEAR: i32 = 1 << 1;
}

use self::SaiAttrValueType as V;
use crate::types::SaiObjectType as T;

macro_rules! attrs {
    ($($ot:ident, $id:expr, $name:literal, $vt:ident;)*) => {
        &[$(SaiAttrMetadata {
            object_type: T::$ot,
            attr_id: $id,
            name: $name,
            value_type: V::$vt,
        },)*]
    };
}

static ATTR_METADATA: &[SaiAttrMetadata] = attrs! {
    Switch, switch_attr::NUMBER_OF_ACTIVE_PORTS, "SAI_SWITCH_ATTR_NUMBER_OF_ACTIVE_PORTS", U32;
    Switch, switch_attr::MAX_NUMBER_OF_SUPPORTED_PORTS, "SAI_SWITCH_ATTR_MAX_NUMBER_OF_SUPPORTED_PORTS", U32;
    Switch, switch_attr::PORT_LIST, "SAI_SWITCH_ATTR_PORT_LIST", OidList;
    Switch, switch_attr::PORT_MAX_MTU, "SAI_SWITCH_ATTR_PORT_MAX_MTU", U32;
    Switch, switch_attr::CPU_PORT, "SAI_SWITCH_ATTR_CPU_PORT", Oid;
    Switch, switch_attr::DEFAULT_VIRTUAL_ROUTER_ID, "SAI_SWITCH_ATTR_DEFAULT_VIRTUAL_ROUTER_ID", Oid;
    Switch, switch_attr::OPER_STATUS, "SAI_SWITCH_ATTR_OPER_STATUS", S32;
    Switch, switch_attr::AVAILABLE_IPV4_ROUTE_ENTRY, "SAI_SWITCH_ATTR_AVAILABLE_IPV4_ROUTE_ENTRY", U32;
    Switch, switch_attr::AVAILABLE_IPV6_ROUTE_ENTRY, "SAI_SWITCH_ATTR_AVAILABLE_IPV6_ROUTE_ENTRY", U32;
    Switch, switch_attr::AVAILABLE_IPV4_NEXTHOP_ENTRY, "SAI_SWITCH_ATTR_AVAILABLE_IPV4_NEXTHOP_ENTRY", U32;
    Switch, switch_attr::AVAILABLE_IPV4_NEIGHBOR_ENTRY, "SAI_SWITCH_ATTR_AVAILABLE_IPV4_NEIGHBOR_ENTRY", U32;
    Switch, switch_attr::AVAILABLE_FDB_ENTRY, "SAI_SWITCH_ATTR_AVAILABLE_FDB_ENTRY", U32;
    Switch, switch_attr::SRC_MAC_ADDRESS, "SAI_SWITCH_ATTR_SRC_MAC_ADDRESS", Mac;
    Switch, switch_attr::FDB_AGING_TIME, "SAI_SWITCH_ATTR_FDB_AGING_TIME", U32;
    Switch, switch_attr::RESTART_WARM, "SAI_SWITCH_ATTR_RESTART_WARM", Bool;
    Switch, switch_attr::INIT_SWITCH, "SAI_SWITCH_ATTR_INIT_SWITCH", Bool;
    Switch, switch_attr::SWITCH_HARDWARE_INFO, "SAI_SWITCH_ATTR_SWITCH_HARDWARE_INFO", Chardata;
    Switch, switch_attr::SWITCH_STATE_CHANGE_NOTIFY, "SAI_SWITCH_ATTR_SWITCH_STATE_CHANGE_NOTIFY", Pointer;
    Switch, switch_attr::SWITCH_SHUTDOWN_REQUEST_NOTIFY, "SAI_SWITCH_ATTR_SWITCH_SHUTDOWN_REQUEST_NOTIFY", Pointer;
    Switch, switch_attr::FDB_EVENT_NOTIFY, "SAI_SWITCH_ATTR_FDB_EVENT_NOTIFY", Pointer;
    Switch, switch_attr::PORT_STATE_CHANGE_NOTIFY, "SAI_SWITCH_ATTR_PORT_STATE_CHANGE_NOTIFY", Pointer;
    Switch, switch_attr::QUEUE_PFC_DEADLOCK_NOTIFY, "SAI_SWITCH_ATTR_QUEUE_PFC_DEADLOCK_NOTIFY", Pointer;
    Switch, switch_attr::BFD_SESSION_STATE_CHANGE_NOTIFY, "SAI_SWITCH_ATTR_BFD_SESSION_STATE_CHANGE_NOTIFY", Pointer;

    Port, port_attr::TYPE, "SAI_PORT_ATTR_TYPE", S32;
    Port, port_attr::OPER_STATUS, "SAI_PORT_ATTR_OPER_STATUS", S32;
    Port, port_attr::QOS_NUMBER_OF_QUEUES, "SAI_PORT_ATTR_QOS_NUMBER_OF_QUEUES", U32;
    Port, port_attr::QOS_QUEUE_LIST, "SAI_PORT_ATTR_QOS_QUEUE_LIST", OidList;
    Port, port_attr::HW_LANE_LIST, "SAI_PORT_ATTR_HW_LANE_LIST", U32List;
    Port, port_attr::SPEED, "SAI_PORT_ATTR_SPEED", U32;
    Port, port_attr::FEC_MODE, "SAI_PORT_ATTR_FEC_MODE", S32;
    Port, port_attr::ADMIN_STATE, "SAI_PORT_ATTR_ADMIN_STATE", Bool;
    Port, port_attr::MTU, "SAI_PORT_ATTR_MTU", U32;

    Lag, 0, "SAI_LAG_ATTR_PORT_LIST", OidList;

    VirtualRouter, 0, "SAI_VIRTUAL_ROUTER_ATTR_ADMIN_V4_STATE", Bool;
    VirtualRouter, 1, "SAI_VIRTUAL_ROUTER_ATTR_ADMIN_V6_STATE", Bool;
    VirtualRouter, 2, "SAI_VIRTUAL_ROUTER_ATTR_SRC_MAC_ADDRESS", Mac;

    NextHop, 0, "SAI_NEXT_HOP_ATTR_TYPE", S32;
    NextHop, 1, "SAI_NEXT_HOP_ATTR_IP", Ip;
    NextHop, 2, "SAI_NEXT_HOP_ATTR_ROUTER_INTERFACE_ID", Oid;

    RouterInterface, 0, "SAI_ROUTER_INTERFACE_ATTR_VIRTUAL_ROUTER_ID", Oid;
    RouterInterface, 1, "SAI_ROUTER_INTERFACE_ATTR_TYPE", S32;
    RouterInterface, 2, "SAI_ROUTER_INTERFACE_ATTR_PORT_ID", Oid;
    RouterInterface, 3, "SAI_ROUTER_INTERFACE_ATTR_SRC_MAC_ADDRESS", Mac;
    RouterInterface, 4, "SAI_ROUTER_INTERFACE_ATTR_MTU", U32;

    Queue, 0, "SAI_QUEUE_ATTR_TYPE", S32;
    Queue, 1, "SAI_QUEUE_ATTR_PORT", Oid;
    Queue, 2, "SAI_QUEUE_ATTR_INDEX", U8;

    Vlan, 0, "SAI_VLAN_ATTR_VLAN_ID", U16;
    Vlan, 1, "SAI_VLAN_ATTR_MEMBER_LIST", OidList;

    BridgePort, 0, "SAI_BRIDGE_PORT_ATTR_TYPE", S32;
    BridgePort, 1, "SAI_BRIDGE_PORT_ATTR_PORT_ID", Oid;

    FdbEntry, 0, "SAI_FDB_ENTRY_ATTR_TYPE", S32;
    FdbEntry, 1, "SAI_FDB_ENTRY_ATTR_PACKET_ACTION", S32;
    FdbEntry, 2, "SAI_FDB_ENTRY_ATTR_BRIDGE_PORT_ID", Oid;

    NeighborEntry, 0, "SAI_NEIGHBOR_ENTRY_ATTR_DST_MAC_ADDRESS", Mac;
    NeighborEntry, 1, "SAI_NEIGHBOR_ENTRY_ATTR_PACKET_ACTION", S32;

    RouteEntry, 0, "SAI_ROUTE_ENTRY_ATTR_PACKET_ACTION", S32;
    RouteEntry, 1, "SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID", Oid;

    FdbFlush, 0, "SAI_FDB_FLUSH_ATTR_BRIDGE_PORT_ID", Oid;
    FdbFlush, 1, "SAI_FDB_FLUSH_ATTR_BV_ID", Oid;
    FdbFlush, 2, "SAI_FDB_FLUSH_ATTR_ENTRY_TYPE", S32;
};

/// Statistic enum names per object type; the stat id is the index.
static STAT_NAMES: &[(SaiObjectType, &[&str])] = &[
    (
        SaiObjectType::Port,
        &[
            "SAI_PORT_STAT_IF_IN_OCTETS",
            "SAI_PORT_STAT_IF_IN_UCAST_PKTS",
            "SAI_PORT_STAT_IF_IN_NON_UCAST_PKTS",
            "SAI_PORT_STAT_IF_IN_DISCARDS",
            "SAI_PORT_STAT_IF_IN_ERRORS",
            "SAI_PORT_STAT_IF_IN_UNKNOWN_PROTOS",
            "SAI_PORT_STAT_IF_IN_BROADCAST_PKTS",
            "SAI_PORT_STAT_IF_IN_MULTICAST_PKTS",
            "SAI_PORT_STAT_IF_IN_VLAN_DISCARDS",
            "SAI_PORT_STAT_IF_OUT_OCTETS",
            "SAI_PORT_STAT_IF_OUT_UCAST_PKTS",
            "SAI_PORT_STAT_IF_OUT_NON_UCAST_PKTS",
            "SAI_PORT_STAT_IF_OUT_DISCARDS",
            "SAI_PORT_STAT_IF_OUT_ERRORS",
            "SAI_PORT_STAT_IF_OUT_QLEN",
            "SAI_PORT_STAT_IF_OUT_BROADCAST_PKTS",
            "SAI_PORT_STAT_IF_OUT_MULTICAST_PKTS",
        ],
    ),
    (
        SaiObjectType::Queue,
        &[
            "SAI_QUEUE_STAT_PACKETS",
            "SAI_QUEUE_STAT_BYTES",
            "SAI_QUEUE_STAT_DROPPED_PACKETS",
            "SAI_QUEUE_STAT_DROPPED_BYTES",
            "SAI_QUEUE_STAT_GREEN_PACKETS",
            "SAI_QUEUE_STAT_GREEN_BYTES",
        ],
    ),
    (
        SaiObjectType::IngressPriorityGroup,
        &[
            "SAI_INGRESS_PRIORITY_GROUP_STAT_PACKETS",
            "SAI_INGRESS_PRIORITY_GROUP_STAT_BYTES",
            "SAI_INGRESS_PRIORITY_GROUP_STAT_CURR_OCCUPANCY_BYTES",
            "SAI_INGRESS_PRIORITY_GROUP_STAT_WATERMARK_BYTES",
        ],
    ),
    (
        SaiObjectType::RouterInterface,
        &[
            "SAI_ROUTER_INTERFACE_STAT_IN_OCTETS",
            "SAI_ROUTER_INTERFACE_STAT_IN_PACKETS",
            "SAI_ROUTER_INTERFACE_STAT_OUT_OCTETS",
            "SAI_ROUTER_INTERFACE_STAT_OUT_PACKETS",
            "SAI_ROUTER_INTERFACE_STAT_IN_ERROR_OCTETS",
            "SAI_ROUTER_INTERFACE_STAT_IN_ERROR_PACKETS",
            "SAI_ROUTER_INTERFACE_STAT_OUT_ERROR_OCTETS",
            "SAI_ROUTER_INTERFACE_STAT_OUT_ERROR_PACKETS",
        ],
    ),
    (
        SaiObjectType::BufferPool,
        &[
            "SAI_BUFFER_POOL_STAT_CURR_OCCUPANCY_BYTES",
            "SAI_BUFFER_POOL_STAT_WATERMARK_BYTES",
            "SAI_BUFFER_POOL_STAT_DROPPED_PACKETS",
        ],
    ),
];

/// Looks up an attribute by object type and id.
pub fn attr_metadata(
    object_type: SaiObjectType,
    attr_id: SaiAttrId,
) -> Option<&'static SaiAttrMetadata> {
    let found = ATTR_METADATA
        .iter()
        .find(|m| m.object_type == object_type && m.attr_id == attr_id);
    if found.is_none() {
        debug!("no metadata for {} attribute {}", object_type, attr_id);
    }
    found
}

/// Looks up an attribute by its `SAI_*_ATTR_*` name.
pub fn attr_metadata_by_name(name: &str) -> Option<&'static SaiAttrMetadata> {
    ATTR_METADATA.iter().find(|m| m.name == name)
}

/// Returns true if the attribute id falls in the custom/extension range.
pub fn is_custom_attr(attr_id: SaiAttrId) -> bool {
    attr_id >= CUSTOM_RANGE_START
}

/// Returns the enum name of a statistic.
pub fn stat_name(object_type: SaiObjectType, stat_id: SaiStatId) -> Option<&'static str> {
    STAT_NAMES
        .iter()
        .find(|(ot, _)| *ot == object_type)
        .and_then(|(_, names)| names.get(stat_id as usize).copied())
}

/// Resolves a statistic enum name back to its id.
pub fn stat_id_by_name(object_type: SaiObjectType, name: &str) -> Option<SaiStatId> {
    STAT_NAMES
        .iter()
        .find(|(ot, _)| *ot == object_type)
        .and_then(|(_, names)| names.iter().position(|n| *n == name))
        .map(|i| i as SaiStatId)
}
