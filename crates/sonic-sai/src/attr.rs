//! SAI attributes and their textual wire form.
//!
//! An attribute is an id plus a typed value. Lists follow the SAI buffer
//! convention: `count` is the number of meaningful elements (or the number
//! required, after an overflow) while `list` is the caller-owned buffer.

use crate::metadata::SaiAttrValueType;
use crate::net::MacAddress;
use crate::types::{deserialize_object_id, serialize_object_id, RawSaiObjectId};
use std::any::Any;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Numeric attribute id (`sai_attr_id_t`).
pub type SaiAttrId = u32;

/// Value decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrParseError {
    #[error("invalid {kind} value: {value}")]
    InvalidValue { kind: &'static str, value: String },

    #[error("list declares {declared} elements but carries {actual}")]
    ListCountMismatch { declared: u32, actual: usize },
}

/// A counted list with a caller-owned buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaiList<T> {
    pub count: u32,
    pub list: Vec<T>,
}

impl<T: Clone + Default> SaiList<T> {
    /// A list whose count matches its contents.
    pub fn from_vec(list: Vec<T>) -> Self {
        Self {
            count: list.len() as u32,
            list,
        }
    }

    /// An output buffer of `capacity` default elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            count: capacity as u32,
            list: vec![T::default(); capacity],
        }
    }

    /// A count with no buffer behind it.
    pub fn count_only(count: u32) -> Self {
        Self {
            count,
            list: Vec::new(),
        }
    }

    /// The meaningful elements.
    pub fn items(&self) -> &[T] {
        let n = (self.count as usize).min(self.list.len());
        &self.list[..n]
    }
}

/// An opaque pointer-typed attribute value.
///
/// Carries callbacks and parameter blocks that only make sense inside this
/// process. Only the address crosses the wire.
#[derive(Clone, Default)]
pub struct SaiPointer(Option<Arc<dyn Any + Send + Sync>>);

impl SaiPointer {
    pub fn null() -> Self {
        SaiPointer(None)
    }

    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        SaiPointer(Some(Arc::new(value)))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the pointee if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|p| p.downcast_ref::<T>())
    }

    pub fn address(&self) -> usize {
        self.0
            .as_ref()
            .map(|p| Arc::as_ptr(p) as *const () as usize)
            .unwrap_or(0)
    }
}

impl fmt::Debug for SaiPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("ptr:NULL")
        } else {
            write!(f, "ptr:0x{:x}", self.address())
        }
    }
}

impl PartialEq for SaiPointer {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum SaiAttributeValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    S32(i32),
    U64(u64),
    Oid(RawSaiObjectId),
    OidList(SaiList<RawSaiObjectId>),
    U32List(SaiList<u32>),
    S32List(SaiList<i32>),
    Chardata(String),
    Mac(MacAddress),
    Ip(IpAddr),
    Pointer(SaiPointer),
}

impl SaiAttributeValue {
    pub fn value_type(&self) -> SaiAttrValueType {
        match self {
            SaiAttributeValue::Bool(_) => SaiAttrValueType::Bool,
            SaiAttributeValue::U8(_) => SaiAttrValueType::U8,
            SaiAttributeValue::U16(_) => SaiAttrValueType::U16,
            SaiAttributeValue::U32(_) => SaiAttrValueType::U32,
            SaiAttributeValue::S32(_) => SaiAttrValueType::S32,
            SaiAttributeValue::U64(_) => SaiAttrValueType::U64,
            SaiAttributeValue::Oid(_) => SaiAttrValueType::Oid,
            SaiAttributeValue::OidList(_) => SaiAttrValueType::OidList,
            SaiAttributeValue::U32List(_) => SaiAttrValueType::U32List,
            SaiAttributeValue::S32List(_) => SaiAttrValueType::S32List,
            SaiAttributeValue::Chardata(_) => SaiAttrValueType::Chardata,
            SaiAttributeValue::Mac(_) => SaiAttrValueType::Mac,
            SaiAttributeValue::Ip(_) => SaiAttrValueType::Ip,
            SaiAttributeValue::Pointer(_) => SaiAttrValueType::Pointer,
        }
    }

    /// Serializes the value. With `count_only`, lists carry their count alone.
    pub fn serialize(&self, count_only: bool) -> String {
        match self {
            SaiAttributeValue::Bool(b) => b.to_string(),
            SaiAttributeValue::U8(v) => v.to_string(),
            SaiAttributeValue::U16(v) => v.to_string(),
            SaiAttributeValue::U32(v) => v.to_string(),
            SaiAttributeValue::S32(v) => v.to_string(),
            SaiAttributeValue::U64(v) => v.to_string(),
            SaiAttributeValue::Oid(oid) => serialize_object_id(*oid),
            SaiAttributeValue::OidList(l) => {
                serialize_list(l, count_only, |oid| serialize_object_id(*oid))
            }
            SaiAttributeValue::U32List(l) => serialize_list(l, count_only, |v| v.to_string()),
            SaiAttributeValue::S32List(l) => serialize_list(l, count_only, |v| v.to_string()),
            SaiAttributeValue::Chardata(s) => s.clone(),
            SaiAttributeValue::Mac(mac) => mac.to_string(),
            SaiAttributeValue::Ip(ip) => ip.to_string(),
            SaiAttributeValue::Pointer(p) => format!("{:?}", p),
        }
    }

    /// Parses a value of the given type.
    ///
    /// Pointers cannot be resurrected from an address, so they always decode
    /// as null.
    pub fn deserialize(value_type: SaiAttrValueType, s: &str) -> Result<Self, AttrParseError> {
        let value = match value_type {
            SaiAttrValueType::Bool => match s {
                "true" => SaiAttributeValue::Bool(true),
                "false" => SaiAttributeValue::Bool(false),
                _ => return Err(invalid("bool", s)),
            },
            SaiAttrValueType::U8 => SaiAttributeValue::U8(parse_num("u8", s)?),
            SaiAttrValueType::U16 => SaiAttributeValue::U16(parse_num("u16", s)?),
            SaiAttrValueType::U32 => SaiAttributeValue::U32(parse_num("u32", s)?),
            SaiAttrValueType::S32 => SaiAttributeValue::S32(parse_num("s32", s)?),
            SaiAttrValueType::U64 => SaiAttributeValue::U64(parse_num("u64", s)?),
            SaiAttrValueType::Oid => SaiAttributeValue::Oid(parse_oid(s)?),
            SaiAttrValueType::OidList => SaiAttributeValue::OidList(deserialize_list(s, parse_oid)?),
            SaiAttrValueType::U32List => {
                SaiAttributeValue::U32List(deserialize_list(s, |i| parse_num("u32", i))?)
            }
            SaiAttrValueType::S32List => {
                SaiAttributeValue::S32List(deserialize_list(s, |i| parse_num("s32", i))?)
            }
            SaiAttrValueType::Chardata => SaiAttributeValue::Chardata(s.to_string()),
            SaiAttrValueType::Mac => {
                SaiAttributeValue::Mac(s.parse().map_err(|_| invalid("mac", s))?)
            }
            SaiAttrValueType::Ip => SaiAttributeValue::Ip(s.parse().map_err(|_| invalid("ip", s))?),
            SaiAttrValueType::Pointer => SaiAttributeValue::Pointer(SaiPointer::null()),
        };
        Ok(value)
    }

    /// Returns the list count for list-typed values.
    pub fn list_count(&self) -> Option<u32> {
        match self {
            SaiAttributeValue::OidList(l) => Some(l.count),
            SaiAttributeValue::U32List(l) => Some(l.count),
            SaiAttributeValue::S32List(l) => Some(l.count),
            _ => None,
        }
    }
}

fn invalid(kind: &'static str, value: &str) -> AttrParseError {
    AttrParseError::InvalidValue {
        kind,
        value: value.to_string(),
    }
}

fn parse_num<T: FromStr>(kind: &'static str, s: &str) -> Result<T, AttrParseError> {
    s.parse().map_err(|_| invalid(kind, s))
}

fn parse_oid(s: &str) -> Result<RawSaiObjectId, AttrParseError> {
    deserialize_object_id(s).map_err(|_| invalid("oid", s))
}

fn serialize_list<T>(list: &SaiList<T>, count_only: bool, item: impl Fn(&T) -> String) -> String {
    if count_only || list.list.is_empty() {
        return format!("{}:null", list.count);
    }
    let items: Vec<String> = list
        .list
        .iter()
        .take(list.count as usize)
        .map(item)
        .collect();
    format!("{}:{}", list.count, items.join(","))
}

fn deserialize_list<T>(
    s: &str,
    item: impl Fn(&str) -> Result<T, AttrParseError>,
) -> Result<SaiList<T>, AttrParseError> {
    let (count, rest) = s.split_once(':').ok_or_else(|| invalid("list", s))?;
    let count: u32 = parse_num("list count", count)?;
    if rest == "null" {
        return Ok(SaiList {
            count,
            list: Vec::new(),
        });
    }
    let list = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(item).collect::<Result<Vec<_>, _>>()?
    };
    if list.len() != count as usize {
        return Err(AttrParseError::ListCountMismatch {
            declared: count,
            actual: list.len(),
        });
    }
    Ok(SaiList { count, list })
}

/// One attribute: id and value.
#[derive(Debug, Clone, PartialEq)]
pub struct SaiAttribute {
    pub id: SaiAttrId,
    pub value: SaiAttributeValue,
}

impl SaiAttribute {
    pub fn new(id: SaiAttrId, value: SaiAttributeValue) -> Self {
        Self { id, value }
    }
}
