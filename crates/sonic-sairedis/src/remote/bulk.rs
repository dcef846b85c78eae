//! Bulk create, remove, set and get.
//!
//! One request covers the whole batch. The key is `"<type>:<count>"`, each
//! field is an item's serialized key and each value the item's attributes
//! joined as `name=value|name=value`. Responses carry one
//! `(status, joined attributes)` pair per item, in request order.

use super::{check_key, decode_response_attributes, BulkOpErrorMode, BulkOutcome, RemoteInterface};
use crate::channel::{commands, FieldValue};
use crate::codec::{
    clear_oid_values, join_field_values, serialize_attributes, serialize_create_attributes,
    split_field_values, transfer_attributes,
};
use crate::{debug_log, error_log};
use sonic_sai::{
    serialize_object_id, ObjectKey, RawSaiObjectId, SaiAttribute, SaiError, SaiObjectType,
    SaiResult, SaiStatus, NULL_OBJECT_ID,
};

fn check_batch(object_type: SaiObjectType, keys: &[ObjectKey], items: usize) -> SaiResult<()> {
    if keys.is_empty() {
        return Err(SaiError::invalid_parameter("bulk request with no objects"));
    }
    if keys.len() != items {
        return Err(SaiError::invalid_parameter(format!(
            "bulk request has {} keys but {} attribute entries",
            keys.len(),
            items
        )));
    }
    keys.iter().try_for_each(|key| check_key(object_type, key))
}

fn parse_item_status(field: &str) -> SaiStatus {
    field
        .parse()
        .unwrap_or_else(|e| panic!("invalid bulk item status {}: {}", field, e))
}

impl RemoteInterface {
    /// Creates `attr_lists.len()` objects on `switch_id` in one request.
    ///
    /// Handles are allocated up front; if any allocation fails, the ones
    /// already taken are released and nothing is sent. Handles of items the
    /// remote side rejects are released and reported as null.
    pub fn bulk_create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        let vids = self.vids()?;

        let mut object_ids = Vec::with_capacity(attr_lists.len());
        for _ in attr_lists {
            let oid = vids.allocate_new_object_id(object_type, switch_id);
            if oid == NULL_OBJECT_ID {
                error_log!(
                    "RemoteInterface",
                    object_type = %object_type,
                    switch_id = %serialize_object_id(switch_id),
                    "failed to allocate object id for bulk create"
                );
                object_ids.iter().for_each(|oid| vids.release_object_id(*oid));
                return Err(SaiError::insufficient_resources(format!(
                    "object ids for bulk {}",
                    object_type
                )));
            }
            object_ids.push(oid);
        }

        let keys: Vec<ObjectKey> = object_ids.iter().copied().map(ObjectKey::Oid).collect();
        let mut outcome = match self.bulk_create_entries(object_type, &keys, attr_lists, mode) {
            Ok(outcome) => outcome,
            Err(e) => {
                object_ids.iter().for_each(|oid| vids.release_object_id(*oid));
                return Err(e);
            }
        };

        for (oid, status) in object_ids.iter_mut().zip(&outcome.object_statuses) {
            if status.is_error() {
                vids.release_object_id(*oid);
                *oid = NULL_OBJECT_ID;
            }
        }
        outcome.object_ids = object_ids;
        Ok(outcome)
    }

    /// Creates objects under caller-supplied keys in one request.
    pub fn bulk_create_entries(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        check_batch(object_type, keys, attr_lists.len())?;
        self.ensure_initialized()?;
        debug_log!("RemoteInterface", mode = ?mode, "bulk error mode is not transmitted");

        let entries = keys
            .iter()
            .zip(attr_lists)
            .map(|(key, attrs)| {
                let values = serialize_create_attributes(object_type, attrs)?;
                Ok((key.serialize(), join_field_values(&values)))
            })
            .collect::<SaiResult<Vec<FieldValue>>>()?;

        self.bulk_request(object_type, commands::BULK_CREATE, entries)
    }

    /// Removes objects in one request. Handles of removed objects are
    /// released.
    pub fn bulk_remove(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        check_batch(object_type, keys, keys.len())?;
        let vids = self.vids()?;
        debug_log!("RemoteInterface", mode = ?mode, "bulk error mode is not transmitted");

        let entries = keys.iter().map(|key| (key.serialize(), String::new())).collect();
        let outcome = self.bulk_request(object_type, commands::BULK_REMOVE, entries)?;

        for (key, status) in keys.iter().zip(&outcome.object_statuses) {
            if let (Some(oid), true) = (key.object_id(), status.is_success()) {
                vids.release_object_id(oid);
            }
        }
        Ok(outcome)
    }

    /// Sets one attribute per object in one request; `attrs[i]` applies to
    /// `keys[i]`.
    pub fn bulk_set(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attrs: &[SaiAttribute],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        check_batch(object_type, keys, attrs.len())?;
        self.ensure_initialized()?;
        debug_log!("RemoteInterface", mode = ?mode, "bulk error mode is not transmitted");

        let entries = keys
            .iter()
            .zip(attrs)
            .map(|(key, attr)| {
                let values = serialize_attributes(object_type, std::slice::from_ref(attr), false)?;
                Ok((key.serialize(), join_field_values(&values)))
            })
            .collect::<SaiResult<Vec<FieldValue>>>()?;

        self.bulk_request(object_type, commands::BULK_SET, entries)
    }

    /// Reads attributes of several objects in one request.
    ///
    /// Always waits for the response. Items reporting success are copied
    /// into `attr_lists[i]`; items reporting `BufferOverflow` only get their
    /// list counts.
    ///
    /// # Panics
    ///
    /// If the response does not carry exactly one entry per object.
    pub fn bulk_get(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &mut [Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        check_batch(object_type, keys, attr_lists.len())?;
        self.ensure_initialized()?;
        debug_log!("RemoteInterface", mode = ?mode, "bulk error mode is not transmitted");

        let mut entries = Vec::with_capacity(keys.len());
        for (key, attrs) in keys.iter().zip(attr_lists.iter_mut()) {
            clear_oid_values(attrs);
            let values = serialize_attributes(object_type, attrs, false)?;
            entries.push((key.serialize(), join_field_values(&values)));
        }

        let key = format!("{}:{}", object_type.name(), entries.len());
        self.send_set(&key, &entries, commands::BULK_GET)?;
        let response = self.wait_response(commands::BULK_GET, commands::GET_RESPONSE)?;

        if response.values.len() != keys.len() {
            panic!(
                "wrong number of statuses, got {}, expected {}",
                response.values.len(),
                keys.len()
            );
        }

        let mut object_statuses = Vec::with_capacity(keys.len());
        for ((status, joined), attrs) in response.values.iter().zip(attr_lists.iter_mut()) {
            let mut item_status = parse_item_status(status);
            if matches!(item_status, SaiStatus::Success | SaiStatus::BufferOverflow) {
                let count_only = item_status == SaiStatus::BufferOverflow;
                let transferred =
                    decode_response_attributes(object_type, &split_field_values(joined))
                        .and_then(|decoded| {
                            transfer_attributes(object_type, &decoded, attrs, count_only)
                        });
                if let Err(e) = transferred {
                    item_status = e.status();
                }
            }
            object_statuses.push(item_status);
        }

        Ok(BulkOutcome {
            status: response.status,
            object_ids: vec![NULL_OBJECT_ID; object_statuses.len()],
            object_statuses,
        })
    }

    fn bulk_request(
        &self,
        object_type: SaiObjectType,
        command: &str,
        entries: Vec<FieldValue>,
    ) -> SaiResult<BulkOutcome> {
        let count = entries.len();
        let key = format!("{}:{}", object_type.name(), count);
        debug_log!("RemoteInterface", key = %key, command = %command, "bulk request");
        self.send_set(&key, &entries, command)?;
        self.wait_for_bulk_response(command, count)
    }

    /// In synchronous mode decodes one status per item; in asynchronous
    /// mode every item is reported successful.
    fn wait_for_bulk_response(&self, command: &str, count: usize) -> SaiResult<BulkOutcome> {
        if !self.is_sync_mode() {
            return Ok(BulkOutcome::from_statuses(vec![SaiStatus::Success; count]));
        }

        let response = self.wait_response(command, commands::GET_RESPONSE)?;
        if response.values.len() != count {
            panic!(
                "wrong number of statuses, got {}, expected {}",
                response.values.len(),
                count
            );
        }
        let object_statuses = response
            .values
            .iter()
            .map(|(status, _)| parse_item_status(status))
            .collect();

        Ok(BulkOutcome {
            status: response.status,
            object_statuses,
            object_ids: vec![NULL_OBJECT_ID; count],
        })
    }
}
