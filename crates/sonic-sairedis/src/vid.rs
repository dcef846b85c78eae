//! Virtual object id (handle) allocation and decoding.
//!
//! Handle layout, most significant bits first:
//!
//! | bits   | field          |
//! |--------|----------------|
//! | 63..56 | switch index   |
//! | 55..48 | object type    |
//! | 47..40 | global context |
//! | 39..0  | counter        |
//!
//! Decoding is pure bit unpacking and needs no manager instance.

use crate::config::{SwitchConfigContainer, MAX_GLOBAL_CONTEXT};
use crate::vid_index::VidIndexGenerator;
use crate::{debug_log, error_log};
use parking_lot::Mutex;
use sonic_sai::{RawSaiObjectId, SaiObjectType, NULL_OBJECT_ID};
use std::sync::Arc;

const SWITCH_INDEX_SHIFT: u32 = 56;
const OBJECT_TYPE_SHIFT: u32 = 48;
const GLOBAL_CONTEXT_SHIFT: u32 = 40;

const SWITCH_INDEX_MASK: u64 = 0xff;
const OBJECT_TYPE_MASK: u64 = 0xff;
const GLOBAL_CONTEXT_MASK: u64 = 0xff;

/// Largest counter value a handle can carry.
pub const MAX_COUNTER: u64 = (1 << GLOBAL_CONTEXT_SHIFT) - 1;

/// Packs the four handle fields.
pub fn construct_object_id(
    object_type: SaiObjectType,
    switch_index: u32,
    counter: u64,
    global_context: u32,
) -> RawSaiObjectId {
    ((switch_index as u64 & SWITCH_INDEX_MASK) << SWITCH_INDEX_SHIFT)
        | ((object_type as u8 as u64 & OBJECT_TYPE_MASK) << OBJECT_TYPE_SHIFT)
        | ((global_context as u64 & GLOBAL_CONTEXT_MASK) << GLOBAL_CONTEXT_SHIFT)
        | (counter & MAX_COUNTER)
}

/// Object type encoded in a handle; `Null` for the null handle or an
/// unknown tag.
pub fn object_type_query(oid: RawSaiObjectId) -> SaiObjectType {
    if oid == NULL_OBJECT_ID {
        return SaiObjectType::Null;
    }
    let raw = ((oid >> OBJECT_TYPE_SHIFT) & OBJECT_TYPE_MASK) as u8;
    SaiObjectType::from_raw(raw).unwrap_or(SaiObjectType::Null)
}

/// Handle of the switch owning `oid`; null for the null handle or an
/// undecodable one.
pub fn switch_id_query(oid: RawSaiObjectId) -> RawSaiObjectId {
    if object_type_query(oid) == SaiObjectType::Null {
        return NULL_OBJECT_ID;
    }
    let index = switch_index(oid);
    construct_object_id(
        SaiObjectType::Switch,
        index,
        index as u64,
        global_context(oid),
    )
}

pub fn switch_index(oid: RawSaiObjectId) -> u32 {
    ((oid >> SWITCH_INDEX_SHIFT) & SWITCH_INDEX_MASK) as u32
}

pub fn global_context(oid: RawSaiObjectId) -> u32 {
    ((oid >> GLOBAL_CONTEXT_SHIFT) & GLOBAL_CONTEXT_MASK) as u32
}

pub fn object_counter(oid: RawSaiObjectId) -> u64 {
    oid & MAX_COUNTER
}

/// Allocates handles for one context.
///
/// Counters come from the injected [`VidIndexGenerator`]. Released counters
/// are kept on a free list and handed out again before the store is
/// advanced, so a failed create does not burn a counter value.
pub struct VirtualObjectIdManager {
    global_context: u32,
    switches: SwitchConfigContainer,
    generator: Arc<dyn VidIndexGenerator>,
    free: Mutex<Vec<u64>>,
}

impl VirtualObjectIdManager {
    pub fn new(
        global_context: u32,
        switches: SwitchConfigContainer,
        generator: Arc<dyn VidIndexGenerator>,
    ) -> Self {
        debug_assert!(global_context <= MAX_GLOBAL_CONTEXT);
        Self {
            global_context,
            switches,
            generator,
            free: Mutex::new(Vec::new()),
        }
    }

    pub fn global_context(&self) -> u32 {
        self.global_context
    }

    /// The counter store, shared with managers created after a view reset.
    pub fn generator(&self) -> &Arc<dyn VidIndexGenerator> {
        &self.generator
    }

    /// Returns the handle of the switch configured with `hwinfo`.
    ///
    /// The handle depends only on the configured switch index, so the same
    /// hardware info always yields the same handle. Unknown hardware info
    /// yields the null handle.
    pub fn allocate_new_switch_object_id(&self, hwinfo: &str) -> RawSaiObjectId {
        let Some(config) = self.switches.get_by_hwinfo(hwinfo) else {
            error_log!(
                "VirtualObjectIdManager",
                hwinfo = %hwinfo,
                "no switch configured with this hardware info"
            );
            return NULL_OBJECT_ID;
        };
        construct_object_id(
            SaiObjectType::Switch,
            config.index,
            config.index as u64,
            self.global_context,
        )
    }

    /// Allocates a handle of `object_type` on `switch_id`.
    ///
    /// Returns the null handle for switch or invalid types, a foreign or
    /// malformed switch handle, an exhausted counter space or a failing
    /// counter store.
    pub fn allocate_new_object_id(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
    ) -> RawSaiObjectId {
        if object_type == SaiObjectType::Switch || !object_type.is_object_id_type() {
            error_log!(
                "VirtualObjectIdManager",
                object_type = %object_type,
                "cannot allocate object id for this type"
            );
            return NULL_OBJECT_ID;
        }
        if object_type_query(switch_id) != SaiObjectType::Switch {
            error_log!(
                "VirtualObjectIdManager",
                switch_id = %sonic_sai::serialize_object_id(switch_id),
                "not a switch handle"
            );
            return NULL_OBJECT_ID;
        }

        let counter = match self.next_counter() {
            Some(counter) => counter,
            None => return NULL_OBJECT_ID,
        };

        let oid = construct_object_id(
            object_type,
            switch_index(switch_id),
            counter,
            self.global_context,
        );
        debug_log!(
            "VirtualObjectIdManager",
            oid = %sonic_sai::serialize_object_id(oid),
            object_type = %object_type,
            "allocated object id"
        );
        oid
    }

    /// Returns a handle's counter to the free list.
    ///
    /// Switch handles carry no store counter and are ignored, as are
    /// handles already released.
    pub fn release_object_id(&self, oid: RawSaiObjectId) {
        let object_type = object_type_query(oid);
        if object_type == SaiObjectType::Null || object_type == SaiObjectType::Switch {
            return;
        }
        let counter = object_counter(oid);
        let mut free = self.free.lock();
        if free.contains(&counter) {
            return;
        }
        free.push(counter);
        debug_log!(
            "VirtualObjectIdManager",
            oid = %sonic_sai::serialize_object_id(oid),
            "released object id"
        );
    }

    /// Number of released counters waiting to be reissued.
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }

    fn next_counter(&self) -> Option<u64> {
        if let Some(counter) = self.free.lock().pop() {
            return Some(counter);
        }
        match self.generator.increment() {
            Ok(counter) if counter <= MAX_COUNTER => Some(counter),
            Ok(counter) => {
                error_log!(
                    "VirtualObjectIdManager",
                    counter = counter,
                    "object id counter space exhausted"
                );
                None
            }
            Err(e) => {
                error_log!(
                    "VirtualObjectIdManager",
                    error = %e,
                    "failed to advance object id counter"
                );
                None
            }
        }
    }
}
