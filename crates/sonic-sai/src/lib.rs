//! SAI (Switch Abstraction Interface) vocabulary for SONiC.
//!
//! This crate holds the types every layer that speaks SAI shares: status
//! codes and errors, object types and object ids, typed attributes with their
//! textual wire form, the attribute/statistic metadata tables, and the keys
//! used to address entry-based objects.
//!
//! # Architecture
//!
//! - [`error`]: status codes and the `SaiError`/`SaiResult` pair
//! - [`types`]: object types and object id text encoding
//! - [`attr`]: attribute values, counted lists and opaque pointers
//! - [`metadata`]: attribute and statistic lookup tables
//! - [`entry`]: composite entry keys and [`ObjectKey`]
//! - [`net`]: MAC addresses and IP prefixes
//!
//! # Example
//!
//! ```
//! use sonic_sai::{metadata::port_attr, SaiAttribute, SaiAttributeValue};
//!
//! let speed = SaiAttribute::new(port_attr::SPEED, SaiAttributeValue::U32(100_000));
//! assert_eq!(speed.value.serialize(false), "100000");
//! ```

pub mod attr;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod net;
pub mod types;

pub use attr::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiList, SaiPointer};
pub use entry::{FdbEntry, NeighborEntry, ObjectKey, RouteEntry};
pub use error::{status_of, SaiError, SaiResult, SaiStatus};
pub use metadata::{SaiAttrValueType, SaiStatId};
pub use net::{IpPrefix, MacAddress};
pub use types::{
    deserialize_object_id, serialize_object_id, RawSaiObjectId, SaiApi, SaiLogLevel,
    SaiObjectType, NULL_OBJECT_ID, SAI_API_VERSION,
};
