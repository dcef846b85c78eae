//! Attribute field/value encoding.
//!
//! Attributes travel as `(SAI_*_ATTR_* name, serialized value)` pairs. Bulk
//! requests join one object's pairs into a single `name=value|name=value`
//! string.

use crate::channel::FieldValue;
use crate::error_log;
use sonic_sai::attr::AttrParseError;
use sonic_sai::metadata::{attr_metadata, attr_metadata_by_name};
use sonic_sai::{SaiAttribute, SaiAttributeValue, SaiError, SaiList, SaiObjectType, SaiResult};
use sonic_sai::{SaiStatus, NULL_OBJECT_ID};

/// Field inserted when an object is created without attributes, so the key
/// still exists in the remote table.
fn null_placeholder() -> FieldValue {
    ("NULL".to_string(), "NULL".to_string())
}

/// Serializes attributes of `object_type` to field/value pairs.
///
/// With `count_only`, list values carry their count alone. Attributes
/// without metadata are rejected.
pub fn serialize_attributes(
    object_type: SaiObjectType,
    attrs: &[SaiAttribute],
    count_only: bool,
) -> SaiResult<Vec<FieldValue>> {
    attrs
        .iter()
        .map(|attr| {
            let meta = attr_metadata(object_type, attr.id).ok_or_else(|| {
                error_log!(
                    "Codec",
                    object_type = %object_type,
                    attr_id = attr.id,
                    "attribute has no metadata"
                );
                SaiError::invalid_parameter(format!(
                    "unknown attribute {} of {}",
                    attr.id, object_type
                ))
            })?;
            Ok((meta.name.to_string(), attr.value.serialize(count_only)))
        })
        .collect()
}

/// Like [`serialize_attributes`] but never returns an empty list.
pub fn serialize_create_attributes(
    object_type: SaiObjectType,
    attrs: &[SaiAttribute],
) -> SaiResult<Vec<FieldValue>> {
    let mut values = serialize_attributes(object_type, attrs, false)?;
    if values.is_empty() {
        values.push(null_placeholder());
    }
    Ok(values)
}

/// Parses field/value pairs back into attributes of `object_type`.
///
/// The placeholder pair is skipped.
pub fn deserialize_attributes(
    object_type: SaiObjectType,
    values: &[FieldValue],
) -> Result<Vec<SaiAttribute>, AttrDecodeError> {
    values
        .iter()
        .filter(|fv| *fv != &null_placeholder())
        .map(|(name, value)| {
            let meta = attr_metadata_by_name(name)
                .filter(|m| m.object_type == object_type)
                .ok_or_else(|| AttrDecodeError::UnknownAttribute(name.clone()))?;
            let value = SaiAttributeValue::deserialize(meta.value_type, value).map_err(|source| {
                AttrDecodeError::Value {
                    name: name.clone(),
                    source,
                }
            })?;
            Ok(SaiAttribute::new(meta.attr_id, value))
        })
        .collect()
}

/// Failures decoding attributes received from the remote side.
#[derive(Debug, thiserror::Error)]
pub enum AttrDecodeError {
    #[error("unknown attribute {0}")]
    UnknownAttribute(String),

    #[error("bad value for {name}: {source}")]
    Value {
        name: String,
        source: AttrParseError,
    },
}

/// Joins pairs as `name=value|name=value`.
pub fn join_field_values(values: &[FieldValue]) -> String {
    values
        .iter()
        .map(|(f, v)| format!("{}={}", f, v))
        .collect::<Vec<_>>()
        .join("|")
}

/// Splits the form produced by [`join_field_values`]. Segments without
/// `=` are ignored.
pub fn split_field_values(joined: &str) -> Vec<FieldValue> {
    joined
        .split('|')
        .filter_map(|item| item.split_once('='))
        .map(|(f, v)| (f.to_string(), v.to_string()))
        .collect()
}

/// Zeroes object ids in caller buffers before a get, so stale ids are
/// never mistaken for real ones.
pub fn clear_oid_values(attrs: &mut [SaiAttribute]) {
    for attr in attrs {
        match &mut attr.value {
            SaiAttributeValue::Oid(oid) => *oid = NULL_OBJECT_ID,
            SaiAttributeValue::OidList(l) => l.list.iter_mut().for_each(|o| *o = NULL_OBJECT_ID),
            _ => {}
        }
    }
}

fn transfer_list<T: Clone + Default>(src: &SaiList<T>, dst: &mut SaiList<T>, count_only: bool) -> SaiStatus {
    if count_only {
        dst.count = src.count;
        return SaiStatus::Success;
    }
    let needed = src.count as usize;
    if dst.list.len() < needed {
        dst.count = src.count;
        return SaiStatus::BufferOverflow;
    }
    let items = src.items();
    dst.list[..items.len()].clone_from_slice(items);
    dst.count = src.count;
    SaiStatus::Success
}

/// Copies decoded values into the caller's attributes, in order.
///
/// Lists are copied into the caller's buffer; if a buffer is too small only
/// the count is updated and the result is `BufferOverflow`. With
/// `count_only`, lists get their count and nothing else.
pub fn transfer_attributes(
    object_type: SaiObjectType,
    src: &[SaiAttribute],
    dst: &mut [SaiAttribute],
    count_only: bool,
) -> SaiResult<()> {
    if src.len() != dst.len() {
        return Err(SaiError::internal(format!(
            "{}: received {} attributes, expected {}",
            object_type,
            src.len(),
            dst.len()
        )));
    }

    let mut status = SaiStatus::Success;
    for (s, d) in src.iter().zip(dst.iter_mut()) {
        let attr_id = d.id;
        if s.id != attr_id {
            return Err(SaiError::internal(format!(
                "{}: attribute id mismatch {} vs {}",
                object_type, s.id, attr_id
            )));
        }
        let item = match (&s.value, &mut d.value) {
            (SaiAttributeValue::OidList(s), SaiAttributeValue::OidList(d)) => {
                transfer_list(s, d, count_only)
            }
            (SaiAttributeValue::U32List(s), SaiAttributeValue::U32List(d)) => {
                transfer_list(s, d, count_only)
            }
            (SaiAttributeValue::S32List(s), SaiAttributeValue::S32List(d)) => {
                transfer_list(s, d, count_only)
            }
            (s, d) if s.value_type() == d.value_type() => {
                *d = s.clone();
                SaiStatus::Success
            }
            (s, d) => {
                return Err(SaiError::internal(format!(
                    "{}: attribute {} type mismatch {:?} vs {:?}",
                    object_type,
                    attr_id,
                    s.value_type(),
                    d.value_type()
                )))
            }
        };
        if item != SaiStatus::Success {
            status = item;
        }
    }
    status.into_result()
}
