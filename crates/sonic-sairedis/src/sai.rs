//! Multi-context facade.
//!
//! [`Sai`] owns one [`Context`] per configured guid and routes every call to
//! the context encoded in the handle (or, for entry keys, in the entry's
//! switch id). A single re-entrant API lock serializes all calls and the
//! notification callbacks of every context.
//!
//! Setting `REDIS_COMMUNICATION_MODE` runs without the API lock: replacing
//! the channel joins its notification thread, which may itself be waiting
//! for the lock.

use crate::channel::{ChannelFactory, DefaultChannelFactory};
use crate::config::{ContextConfigContainer, ServiceMethodTable, SAI_REDIS_KEY_CONTEXT_CONFIG};
use crate::context::Context;
use crate::interface::SaiInterface;
use crate::notification::{Notification, SwitchNotifications};
use crate::recorder::{NoopRecorder, Recorder};
use crate::remote::{
    is_extension_attr, redis_switch_attr, AttrCapability, BulkOpErrorMode, BulkOutcome,
    NotificationCallback, RemoteInterface, StatCapability,
};
use crate::vid;
use crate::{debug_log, error_log, info_log, warn_log};
use parking_lot::{ReentrantMutex, RwLock};
use sonic_sai::{
    serialize_object_id, ObjectKey, RawSaiObjectId, SaiApi, SaiAttrId, SaiAttribute,
    SaiAttributeValue, SaiError, SaiList, SaiLogLevel, SaiObjectType, SaiResult, SaiStatId,
    NULL_OBJECT_ID,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct SaiShared {
    api_lock: ReentrantMutex<()>,
    initialized: AtomicBool,
    contexts: RwLock<BTreeMap<u32, Arc<Context>>>,
    factory: Arc<dyn ChannelFactory>,
    recorder: Arc<dyn Recorder>,
}

impl SaiShared {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Runs on a context's notification thread.
    fn handle_notification(&self, guid: u32, notification: &Notification) -> SwitchNotifications {
        let _api = self.api_lock.lock();
        if !self.is_initialized() {
            error_log!("Sai", name = notification.name(), "api not initialized, dropping notification");
            return SwitchNotifications::default();
        }

        let switch_id = vid::switch_id_query(notification.any_object_id());
        let found = self
            .contexts
            .read()
            .get(&guid)
            .and_then(|c| c.remote().switch_notifications(switch_id));
        match found {
            Some(callbacks) => callbacks,
            None => {
                warn_log!(
                    "Sai",
                    context = guid,
                    switch_id = %serialize_object_id(switch_id),
                    name = notification.name(),
                    "switch not found for notification"
                );
                SwitchNotifications::default()
            }
        }
    }
}

/// Process-wide entry point over every configured context.
pub struct Sai {
    shared: Arc<SaiShared>,
}

impl Default for Sai {
    fn default() -> Self {
        Self::new(Arc::new(DefaultChannelFactory))
    }
}

impl Sai {
    pub fn new(factory: Arc<dyn ChannelFactory>) -> Self {
        Self::with_recorder(factory, Arc::new(NoopRecorder))
    }

    /// A facade whose contexts record through `recorder`.
    pub fn with_recorder(factory: Arc<dyn ChannelFactory>, recorder: Arc<dyn Recorder>) -> Self {
        Self {
            shared: Arc::new(SaiShared {
                api_lock: ReentrantMutex::new(()),
                initialized: AtomicBool::new(false),
                contexts: RwLock::new(BTreeMap::new()),
                factory,
                recorder,
            }),
        }
    }

    /// Loads the context configuration named by the
    /// `SAI_REDIS_CONTEXT_CONFIG` profile key and initializes every context.
    pub fn api_initialize(&self, flags: u64, services: &dyn ServiceMethodTable) -> SaiResult<()> {
        let api = self.shared.api_lock.lock();

        if self.shared.is_initialized() {
            error_log!("Sai", "api already initialized");
            return Err(SaiError::failure());
        }
        if flags != 0 {
            error_log!("Sai", flags = flags, "invalid flags passed to api initialize");
            return Err(SaiError::invalid_parameter(format!("flags {:#x}", flags)));
        }

        let path = services.profile_get_value(0, SAI_REDIS_KEY_CONTEXT_CONFIG);
        let container = ContextConfigContainer::load_from_file(path.as_deref().map(Path::new))
            .map_err(|e| {
                error_log!("Sai", error = %e, "failed to load context config");
                SaiError::invalid_parameter(e.to_string())
            })?;

        let mut contexts = BTreeMap::new();
        for config in container.iter() {
            let context = Context::new(
                config.clone(),
                self.shared.factory.clone(),
                self.shared.recorder.clone(),
                self.notification_callback(config.guid),
            );
            match context {
                Ok(context) => {
                    contexts.insert(config.guid, Arc::new(context));
                }
                Err(e) => {
                    error_log!("Sai", guid = config.guid, error = %e, "failed to initialize context");
                    // contexts already started join their notification threads on drop
                    drop(api);
                    drop(contexts);
                    return Err(e);
                }
            }
        }

        info_log!("Sai", contexts = contexts.len(), "api initialized");
        *self.shared.contexts.write() = contexts;
        self.shared.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stops every context. Channels are torn down after the API lock is
    /// released.
    pub fn api_uninitialize(&self) -> SaiResult<()> {
        let contexts = {
            let _api = self.shared.api_lock.lock();
            if !self.shared.is_initialized() {
                error_log!("Sai", "api not initialized");
                return Err(SaiError::failure());
            }
            self.shared.initialized.store(false, Ordering::SeqCst);
            std::mem::take(&mut *self.shared.contexts.write())
        };
        info_log!("Sai", contexts = contexts.len(), "uninitializing");
        drop(contexts);
        info_log!("Sai", "api uninitialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.is_initialized()
    }

    pub fn context(&self, guid: u32) -> Option<Arc<Context>> {
        self.shared.contexts.read().get(&guid).cloned()
    }

    pub fn context_ids(&self) -> Vec<u32> {
        self.shared.contexts.read().keys().copied().collect()
    }

    fn notification_callback(&self, guid: u32) -> NotificationCallback {
        let shared: Weak<SaiShared> = Arc::downgrade(&self.shared);
        Arc::new(move |notification: &Notification| match shared.upgrade() {
            Some(shared) => shared.handle_notification(guid, notification),
            None => SwitchNotifications::default(),
        })
    }

    fn ensure_initialized(&self) -> SaiResult<()> {
        if self.shared.is_initialized() {
            Ok(())
        } else {
            error_log!("Sai", "api not initialized");
            Err(SaiError::failure())
        }
    }

    fn context_by_guid(&self, guid: u32, oid: RawSaiObjectId) -> SaiResult<Arc<Context>> {
        self.context(guid).ok_or_else(|| {
            error_log!(
                "Sai",
                context = guid,
                oid = %serialize_object_id(oid),
                "no context for object"
            );
            SaiError::failure()
        })
    }

    /// Takes the API lock and runs `f` on the remote interface of the
    /// context owning `oid`.
    fn with_context<T>(
        &self,
        oid: RawSaiObjectId,
        f: impl FnOnce(&RemoteInterface) -> SaiResult<T>,
    ) -> SaiResult<T> {
        let _api = self.shared.api_lock.lock();
        self.ensure_initialized()?;
        let context = self.context_by_guid(vid::global_context(oid), oid)?;
        f(context.remote())
    }

    fn with_key_context<T>(
        &self,
        key: &ObjectKey,
        f: impl FnOnce(&RemoteInterface) -> SaiResult<T>,
    ) -> SaiResult<T> {
        self.with_context(owner_of(key), f)
    }

    fn with_batch_context<T>(
        &self,
        keys: &[ObjectKey],
        f: impl FnOnce(&RemoteInterface) -> SaiResult<T>,
    ) -> SaiResult<T> {
        let first = keys
            .first()
            .ok_or_else(|| SaiError::invalid_parameter("bulk request with no objects"))?;
        self.with_key_context(first, f)
    }

    fn create_switch(&self, attrs: &[SaiAttribute]) -> SaiResult<RawSaiObjectId> {
        let _api = self.shared.api_lock.lock();
        self.ensure_initialized()?;

        let (guid, attrs) = match attrs.split_last() {
            Some((last, rest)) if last.id == redis_switch_attr::CONTEXT => match last.value {
                SaiAttributeValue::U32(guid) => (guid, rest),
                _ => {
                    return Err(SaiError::invalid_parameter(
                        "context attribute must carry a u32 guid",
                    ))
                }
            },
            _ => (0, attrs),
        };
        info_log!("Sai", context = guid, "request switch create");

        let context = self.context(guid).ok_or_else(|| {
            error_log!("Sai", context = guid, "no global context defined");
            SaiError::failure()
        })?;
        context.remote().create(SaiObjectType::Switch, NULL_OBJECT_ID, attrs)
    }

    /// Applies an extension attribute to every context holding the switch,
    /// or to every context when the switch id is null.
    fn set_extension(&self, key: &ObjectKey, attr: &SaiAttribute) -> SaiResult<()> {
        let api = (attr.id != redis_switch_attr::REDIS_COMMUNICATION_MODE)
            .then(|| self.shared.api_lock.lock());
        if api.is_none() {
            info_log!("Sai", "unlocking api mutex for communication mode");
        }
        self.ensure_initialized()?;

        let switch_id = key.object_id().unwrap_or(NULL_OBJECT_ID);
        let contexts: Vec<Arc<Context>> = self.shared.contexts.read().values().cloned().collect();

        let mut success = true;
        for context in contexts {
            if switch_id != NULL_OBJECT_ID && !context.remote().contains_switch(switch_id) {
                continue;
            }
            let result = context.remote().set(SaiObjectType::Switch, key, attr);
            debug_log!(
                "Sai",
                context = context.guid(),
                attr_id = attr.id,
                ok = result.is_ok(),
                "extension attribute set"
            );
            success &= result.is_ok();
        }

        if success {
            Ok(())
        } else {
            Err(SaiError::failure())
        }
    }
}

impl Drop for Sai {
    fn drop(&mut self) {
        if self.shared.is_initialized() {
            let _ = self.api_uninitialize();
        }
    }
}

/// Handle whose context owns `key`.
fn owner_of(key: &ObjectKey) -> RawSaiObjectId {
    key.object_id()
        .or_else(|| key.entry_switch_id())
        .unwrap_or(NULL_OBJECT_ID)
}

impl SaiInterface for Sai {
    fn create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId> {
        if object_type == SaiObjectType::Switch && !attrs.is_empty() {
            return self.create_switch(attrs);
        }
        self.with_context(switch_id, |ri| ri.create(object_type, switch_id, attrs))
    }

    fn create_entry(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        self.with_key_context(key, |ri| ri.create_entry(object_type, key, attrs))
    }

    fn remove(&self, object_type: SaiObjectType, key: &ObjectKey) -> SaiResult<()> {
        self.with_key_context(key, |ri| ri.remove(object_type, key))
    }

    fn set(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attr: &SaiAttribute,
    ) -> SaiResult<()> {
        if is_extension_attr(object_type, attr.id) {
            return self.set_extension(key, attr);
        }
        self.with_key_context(key, |ri| ri.set(object_type, key, attr))
    }

    fn get(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &mut [SaiAttribute],
    ) -> SaiResult<()> {
        self.with_key_context(key, |ri| ri.get(object_type, key, attrs))
    }

    fn bulk_create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        self.with_context(switch_id, |ri| {
            ri.bulk_create(object_type, switch_id, attr_lists, mode)
        })
    }

    fn bulk_create_entries(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &[Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        self.with_batch_context(keys, |ri| {
            ri.bulk_create_entries(object_type, keys, attr_lists, mode)
        })
    }

    fn bulk_remove(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        self.with_batch_context(keys, |ri| ri.bulk_remove(object_type, keys, mode))
    }

    fn bulk_set(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attrs: &[SaiAttribute],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        self.with_batch_context(keys, |ri| ri.bulk_set(object_type, keys, attrs, mode))
    }

    fn bulk_get(
        &self,
        object_type: SaiObjectType,
        keys: &[ObjectKey],
        attr_lists: &mut [Vec<SaiAttribute>],
        mode: BulkOpErrorMode,
    ) -> SaiResult<BulkOutcome> {
        self.with_batch_context(keys, |ri| ri.bulk_get(object_type, keys, attr_lists, mode))
    }

    fn get_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<u64>> {
        self.with_context(object_id, |ri| ri.get_stats(object_type, object_id, counter_ids))
    }

    fn get_stats_ext(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
        mode: i32,
    ) -> SaiResult<Vec<u64>> {
        self.with_context(object_id, |ri| {
            ri.get_stats_ext(object_type, object_id, counter_ids, mode)
        })
    }

    fn clear_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<()> {
        self.with_context(object_id, |ri| ri.clear_stats(object_type, object_id, counter_ids))
    }

    fn bulk_get_stats(
        &self,
        _object_type: SaiObjectType,
        _object_ids: &[RawSaiObjectId],
        _counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<Vec<u64>>> {
        Err(SaiError::not_implemented("bulk_get_stats"))
    }

    fn bulk_clear_stats(
        &self,
        _object_type: SaiObjectType,
        _object_ids: &[RawSaiObjectId],
        _counter_ids: &[SaiStatId],
    ) -> SaiResult<()> {
        Err(SaiError::not_implemented("bulk_clear_stats"))
    }

    fn query_stats_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        capabilities: &mut SaiList<StatCapability>,
    ) -> SaiResult<()> {
        self.with_context(switch_id, |ri| {
            ri.query_stats_capability(switch_id, object_type, capabilities)
        })
    }

    fn query_stats_st_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
    ) -> SaiResult<()> {
        self.with_context(switch_id, |ri| ri.query_stats_st_capability(switch_id, object_type))
    }

    fn flush_fdb_entries(
        &self,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        self.with_context(switch_id, |ri| ri.flush_fdb_entries(switch_id, attrs))
    }

    fn object_type_get_availability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attrs: &[SaiAttribute],
    ) -> SaiResult<u64> {
        self.with_context(switch_id, |ri| {
            ri.object_type_get_availability(switch_id, object_type, attrs)
        })
    }

    fn query_attribute_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
    ) -> SaiResult<AttrCapability> {
        self.with_context(switch_id, |ri| {
            ri.query_attribute_capability(switch_id, object_type, attr_id)
        })
    }

    fn query_attribute_enum_values_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
        values: &mut SaiList<i32>,
    ) -> SaiResult<()> {
        self.with_context(switch_id, |ri| {
            ri.query_attribute_enum_values_capability(switch_id, object_type, attr_id, values)
        })
    }

    fn object_type_query(&self, object_id: RawSaiObjectId) -> SaiObjectType {
        if !self.shared.is_initialized() {
            error_log!("Sai", "api not initialized");
            return SaiObjectType::Null;
        }
        vid::object_type_query(object_id)
    }

    fn switch_id_query(&self, object_id: RawSaiObjectId) -> RawSaiObjectId {
        if !self.shared.is_initialized() {
            error_log!("Sai", "api not initialized");
            return NULL_OBJECT_ID;
        }
        vid::switch_id_query(object_id)
    }

    fn log_set(&self, api: SaiApi, level: SaiLogLevel) -> SaiResult<()> {
        let _api = self.shared.api_lock.lock();
        self.ensure_initialized()?;
        for context in self.shared.contexts.read().values() {
            context.remote().log_set(api, level)?;
        }
        Ok(())
    }

    fn query_api_version(&self) -> SaiResult<u64> {
        let _api = self.shared.api_lock.lock();
        self.ensure_initialized()?;
        let first = self.shared.contexts.read().values().next().cloned();
        match first {
            Some(context) => {
                warn_log!("Sai", context = context.guid(), "using first context");
                context.remote().query_api_version()
            }
            None => {
                error_log!("Sai", "context map is empty");
                Err(SaiError::failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_sai::{FdbEntry, MacAddress};

    #[test]
    fn test_owner_of_key() {
        assert_eq!(owner_of(&ObjectKey::Oid(0x1000000000123)), 0x1000000000123);

        let fdb = FdbEntry {
            bvid: 0x26000000000001,
            mac: MacAddress::new([0, 1, 2, 3, 4, 5]),
            switch_id: 0x21000000000000,
        };
        assert_eq!(owner_of(&ObjectKey::Fdb(fdb)), 0x21000000000000);
    }

    #[test]
    fn test_calls_before_initialize() {
        let sai = Sai::default();
        assert!(!sai.is_initialized());
        assert_eq!(sai.object_type_query(0x1000000000123), SaiObjectType::Null);
        assert_eq!(sai.switch_id_query(0x1000000000123), NULL_OBJECT_ID);
        assert!(sai.api_uninitialize().is_err());
        assert!(sai
            .remove(SaiObjectType::Port, &ObjectKey::Oid(0x1000000000123))
            .is_err());
    }
}
