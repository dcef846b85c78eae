//! The SAI call surface shared by [`RemoteInterface`] and the [`crate::Sai`]
//! facade.

use crate::remote::{AttrCapability, BulkOpErrorMode, BulkOutcome, RemoteInterface, StatCapability};
use sonic_sai::{
    ObjectKey, RawSaiObjectId, SaiApi, SaiAttrId, SaiAttribute, SaiList, SaiLogLevel,
    SaiObjectType, SaiResult, SaiStatId,
};

/// SAI operations over object ids and entry keys.
pub trait SaiInterface: Send + Sync {
    /// Creates an object addressed by a new handle and returns the handle.
    fn create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId>;

    /// Creates an entry-keyed object.
    fn create_entry(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()>;

    fn remove(&self, object_type: SaiObjectType, key: &ObjectKey) -> SaiResult<()>;

    fn set(&self, object_type: SaiObjectType, key: &ObjectKey, attr: &SaiAttribute)
        -> SaiResult<()>;

    /// Reads attributes into the caller's buffers.
    fn get(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &mut [SaiAttribute],
    ) -> SaiResult<()>;

    fn bulk_create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome>;

    fn bulk_create_entries(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome>;

    fn bulk_remove(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome>;

    fn bulk_set(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attrs: &[SaiAttribute],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome>;

    fn bulk_get(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &mut [Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome>;

    fn get_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<u64>>;

    fn get_stats_ext(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
        mode: i32,
    ) -> SaiResult<Vec<u64>>;

    fn clear_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<()>;

    fn bulk_get_stats(
        &self,
        object_type: SaiObjectType,
        object_ids: &[RawSaiObjectId],
        counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<Vec<u64>>>;

    fn bulk_clear_stats(
        &self,
        object_type: SaiObjectType,
        object_ids: &[RawSaiObjectId],
        counter_ids: &[SaiStatId],
    ) -> SaiResult<()>;

    fn query_stats_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        capabilities: &mut SaiList<StatCapability>,
    ) -> SaiResult<()>;

    fn query_stats_st_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
    ) -> SaiResult<()>;

    fn flush_fdb_entries(&self, switch_id: RawSaiObjectId, attrs: &[SaiAttribute])
        -> SaiResult<()>;

    fn object_type_get_availability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attrs: &[SaiAttribute],
    ) -> SaiResult<u64>;

    fn query_attribute_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
    ) -> SaiResult<AttrCapability>;

    fn query_attribute_enum_values_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
        values: &mut SaiList<i32>,
    ) -> SaiResult<()>;

    /// Object type encoded in a handle.
    fn object_type_query(&self, object_id: RawSaiObjectId) -> SaiObjectType;

    /// Switch handle encoded in a handle.
    fn switch_id_query(&self, object_id: RawSaiObjectId) -> RawSaiObjectId;

    fn log_set(&self, api: SaiApi, level: SaiLogLevel) -> SaiResult<()>;

    fn query_api_version(&self) -> SaiResult<u64>;
}

impl SaiInterface for RemoteInterface {
    fn create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId> {
        RemoteInterface::create(self, object_type, switch_id, attrs)
    }

    fn create_entry(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        RemoteInterface::create_entry(self, object_type, key, attrs)
    }

    fn remove(&self, object_type: SaiObjectType, key: &ObjectKey) -> SaiResult<()> {
        RemoteInterface::remove(self, object_type, key)
    }

    fn set(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attr: &SaiAttribute,
    ) -> SaiResult<()> {
        RemoteInterface::set(self, object_type, key, attr)
    }

    fn get(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &mut [SaiAttribute],
    ) -> SaiResult<()> {
        RemoteInterface::get(self, object_type, key, attrs)
    }

    fn bulk_create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        RemoteInterface::bulk_create(self, object_type, switch_id, attr_lists, mode)
    }

    fn bulk_create_entries(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        RemoteInterface::bulk_create_entries(self, object_type, keys, attr_lists, mode)
    }

    fn bulk_remove(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        RemoteInterface::bulk_remove(self, object_type, keys, mode)
    }

    fn bulk_set(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attrs: &[SaiAttribute],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        RemoteInterface::bulk_set(self, object_type, keys, attrs, mode)
    }

    fn bulk_get(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &mut [Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        RemoteInterface::bulk_get(self, object_type, keys, attr_lists, mode)
    }

    fn get_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<u64>> {
        RemoteInterface::get_stats(self, object_type, object_id, counter_ids)
    }

    fn get_stats_ext(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
        mode: i32,
    ) -> SaiResult<Vec<u64>> {
        RemoteInterface::get_stats_ext(self, object_type, object_id, counter_ids, mode)
    }

    fn clear_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<()> {
        RemoteInterface::clear_stats(self, object_type, object_id, counter_ids)
    }

    fn bulk_get_stats(
        &self,
        object_type: SaiObjectType,
        object_ids: &[RawSaiObjectId],
        counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<Vec<u64>>> {
        RemoteInterface::bulk_get_stats(self, object_type, object_ids, counter_ids)
    }

    fn bulk_clear_stats(
        &self,
        object_type: SaiObjectType,
        object_ids: &[RawSaiObjectId],
        counter_ids: &[SaiStatId],
    ) -> SaiResult<()> {
        RemoteInterface::bulk_clear_stats(self, object_type, object_ids, counter_ids)
    }

    fn query_stats_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        capabilities: &mut SaiList<StatCapability>,
    ) -> SaiResult<()> {
        RemoteInterface::query_stats_capability(self, switch_id, object_type, capabilities)
    }

    fn query_stats_st_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
    ) -> SaiResult<()> {
        RemoteInterface::query_stats_st_capability(self, switch_id, object_type)
    }

    fn flush_fdb_entries(
        &self,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        RemoteInterface::flush_fdb_entries(self, switch_id, attrs)
    }

    fn object_type_get_availability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attrs: &[SaiAttribute],
    ) -> SaiResult<u64> {
        RemoteInterface::object_type_get_availability(self, switch_id, object_type, attrs)
    }

    fn query_attribute_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
    ) -> SaiResult<AttrCapability> {
        RemoteInterface::query_attribute_capability(self, switch_id, object_type, attr_id)
    }

    fn query_attribute_enum_values_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
        values: &mut SaiList<i32>,
    ) -> SaiResult<()> {
        RemoteInterface::query_attribute_enum_values_capability(
            self,
            switch_id,
            object_type,
            attr_id,
            values,
        )
    }

    fn object_type_query(&self, object_id: RawSaiObjectId) -> SaiObjectType {
        RemoteInterface::object_type_query(self, object_id)
    }

    fn switch_id_query(&self, object_id: RawSaiObjectId) -> RawSaiObjectId {
        RemoteInterface::switch_id_query(self, object_id)
    }

    fn log_set(&self, api: SaiApi, level: SaiLogLevel) -> SaiResult<()> {
        RemoteInterface::log_set(self, api, level)
    }

    fn query_api_version(&self) -> SaiResult<u64> {
        RemoteInterface::query_api_version(self)
    }
}
