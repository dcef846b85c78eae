//! Remote interface: every SAI call becomes a request to the remote agent.
//!
//! A [`RemoteInterface`] owns one context's channel, handle allocator,
//! switch registry and mode flags. Requests are keyed
//! `"<SAI_OBJECT_TYPE_*>:<serialized key>"` and carry attributes as
//! field/value pairs (see [`crate::codec`]).
//!
//! # Modes
//!
//! In asynchronous mode (the default after [`RemoteInterface::api_initialize`]
//! on Redis) create, remove and set return as soon as the request is queued.
//! In synchronous mode every call waits for the correlated `getresponse`.
//! Get, bulk get, statistics, queries and `notify_syncd` always wait.
//!
//! # Locking
//!
//! The state mutex is never held across a channel call, so the notification
//! thread can always look up switch callbacks while a caller blocks in a
//! wait.

mod bulk;
mod extension;
mod query;
mod types;

pub use types::{
    is_extension_attr, redis_switch_attr, AttrCapability, BulkOpErrorMode, BulkOutcome,
    CommunicationMode, ExtensionCommand, FlexCounterGroupParams, FlexCounterParams, NotifySyncd,
    StatCapability,
};

use crate::channel::{commands, Channel, ChannelFactory, ChannelKind, FieldValue, NotificationHandler};
use crate::channel::Response;
use crate::codec::{
    clear_oid_values, deserialize_attributes, serialize_attributes, serialize_create_attributes,
    transfer_attributes,
};
use crate::config::ContextConfig;
use crate::notification::{Notification, SwitchNotifications};
use crate::recorder::{NoopRecorder, Recorder, SkipRecordAttrContainer};
use crate::switch::{self, Switch, SwitchContainer};
use crate::vid::{self, VirtualObjectIdManager};
use crate::vid_index::VidIndexGenerator;
use crate::{debug_log, error_log, info_log, warn_log};
use parking_lot::{Mutex, MutexGuard, RwLock};
use sonic_sai::metadata::switch_attr;
use sonic_sai::{
    deserialize_object_id, serialize_object_id, ObjectKey, RawSaiObjectId, SaiApi,
    SaiAttributeValue, SaiAttribute, SaiError, SaiLogLevel, SaiObjectType, SaiResult, SaiStatus,
    NULL_OBJECT_ID, SAI_API_VERSION,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Called on the notification thread with every decoded notification;
/// returns the callbacks to run for it.
pub type NotificationCallback = Arc<dyn Fn(&Notification) -> SwitchNotifications + Send + Sync>;

/// Remote object table grouped by owning switch: key to attributes.
pub type TableDump = BTreeMap<RawSaiObjectId, BTreeMap<String, Vec<FieldValue>>>;

/// Builds the request key of an object.
pub fn request_key(object_type: SaiObjectType, key: &ObjectKey) -> String {
    format!("{}:{}", object_type.name(), key.serialize())
}

struct RemoteState {
    initialized: bool,
    sync_mode: bool,
    zmq_enabled: bool,
    communication_mode: CommunicationMode,
    response_timeout: Duration,
    init_view_mode: bool,
    use_temp_view: bool,
    switches: SwitchContainer,
    generator: Option<Arc<dyn VidIndexGenerator>>,
    vids: Option<Arc<VirtualObjectIdManager>>,
    table_dump: TableDump,
}

impl RemoteState {
    fn new() -> Self {
        Self {
            initialized: false,
            sync_mode: false,
            zmq_enabled: false,
            communication_mode: CommunicationMode::RedisAsync,
            response_timeout: crate::channel::DEFAULT_RESPONSE_TIMEOUT,
            init_view_mode: false,
            use_temp_view: false,
            switches: SwitchContainer::new(),
            generator: None,
            vids: None,
            table_dump: TableDump::new(),
        }
    }
}

/// Client side of one context.
pub struct RemoteInterface {
    weak_self: Weak<RemoteInterface>,
    config: Arc<ContextConfig>,
    factory: Arc<dyn ChannelFactory>,
    notification_callback: NotificationCallback,
    recorder: RwLock<Arc<dyn Recorder>>,
    skip_record: Mutex<SkipRecordAttrContainer>,
    channel: RwLock<Option<Box<dyn Channel>>>,
    state: Mutex<RemoteState>,
}

impl RemoteInterface {
    /// Creates an uninitialized interface whose notifications are routed to
    /// the callbacks of its own switches.
    pub fn new(config: Arc<ContextConfig>, factory: Arc<dyn ChannelFactory>) -> Arc<Self> {
        Self::build(config, factory, None)
    }

    /// Creates an uninitialized interface that hands every notification to
    /// `callback` to find the callbacks to run.
    pub fn with_notification_callback(
        config: Arc<ContextConfig>,
        factory: Arc<dyn ChannelFactory>,
        callback: NotificationCallback,
    ) -> Arc<Self> {
        Self::build(config, factory, Some(callback))
    }

    fn build(
        config: Arc<ContextConfig>,
        factory: Arc<dyn ChannelFactory>,
        callback: Option<NotificationCallback>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<RemoteInterface>| {
            let notification_callback = callback.unwrap_or_else(|| {
                let weak = weak.clone();
                let local: NotificationCallback = Arc::new(move |n: &Notification| {
                    let switch_id = vid::switch_id_query(n.any_object_id());
                    weak.upgrade()
                        .and_then(|ri| ri.switch_notifications(switch_id))
                        .unwrap_or_default()
                });
                local
            });
            Self {
                weak_self: weak.clone(),
                config,
                factory,
                notification_callback,
                recorder: RwLock::new(Arc::new(NoopRecorder)),
                skip_record: Mutex::new(SkipRecordAttrContainer::default()),
                channel: RwLock::new(None),
                state: Mutex::new(RemoteState::new()),
            }
        })
    }

    pub fn config(&self) -> &Arc<ContextConfig> {
        &self.config
    }

    pub fn set_recorder(&self, recorder: Arc<dyn Recorder>) {
        *self.recorder.write() = recorder;
    }

    fn recorder(&self) -> Arc<dyn Recorder> {
        self.recorder.read().clone()
    }

    /// Attributes whose gets are not recorded.
    pub fn skip_record_attrs(&self) -> MutexGuard<'_, SkipRecordAttrContainer> {
        self.skip_record.lock()
    }

    /// Opens the channel and resets every mode to its default.
    ///
    /// Contexts with ZeroMQ enabled start in synchronous mode on the ZeroMQ
    /// channel; all others start asynchronous on Redis.
    pub fn api_initialize(&self) -> SaiResult<()> {
        let kind = {
            let mut state = self.state.lock();
            if state.initialized {
                error_log!("RemoteInterface", guid = self.config.guid, "already initialized");
                return Err(SaiError::failure());
            }
            state.init_view_mode = false;
            state.use_temp_view = false;
            state.sync_mode = false;
            state.zmq_enabled = self.config.zmq_enable;
            state.communication_mode = CommunicationMode::RedisAsync;
            if self.config.zmq_enable {
                info_log!("RemoteInterface", guid = self.config.guid, "zmq enabled, forcing sync mode");
                state.sync_mode = true;
                state.communication_mode = CommunicationMode::ZmqSync;
                ChannelKind::ZeroMq
            } else {
                ChannelKind::Redis
            }
        };

        let channel = self
            .factory
            .create_channel(kind, &self.config, self.notification_handler())?;
        let generator = self.factory.create_vid_index_generator(&self.config)?;
        let timeout = channel.response_timeout();

        {
            let mut state = self.state.lock();
            state.response_timeout = timeout;
            state.generator = Some(generator);
            self.clear_local_state(&mut state);
            state.initialized = true;
        }
        *self.channel.write() = Some(channel);

        info_log!(
            "RemoteInterface",
            guid = self.config.guid,
            name = %self.config.name,
            channel = ?kind,
            "initialized"
        );
        Ok(())
    }

    /// Stops the channel (joining its notification thread) and drops all
    /// local state.
    pub fn api_uninitialize(&self) -> SaiResult<()> {
        if !self.state.lock().initialized {
            error_log!("RemoteInterface", guid = self.config.guid, "not initialized");
            return Err(SaiError::failure());
        }

        let channel = self.channel.write().take();
        drop(channel);

        let mut state = self.state.lock();
        self.clear_local_state(&mut state);
        state.initialized = false;
        info_log!("RemoteInterface", guid = self.config.guid, "uninitialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn is_sync_mode(&self) -> bool {
        self.state.lock().sync_mode
    }

    pub fn communication_mode(&self) -> CommunicationMode {
        self.state.lock().communication_mode
    }

    pub fn response_timeout(&self) -> Duration {
        self.state.lock().response_timeout
    }

    pub fn is_init_view_mode(&self) -> bool {
        self.state.lock().init_view_mode
    }

    pub fn use_temp_view(&self) -> bool {
        self.state.lock().use_temp_view
    }

    /// Buffering flag of the current channel; false when there is none.
    pub fn is_buffered(&self) -> bool {
        self.channel.read().as_deref().is_some_and(|c| c.is_buffered())
    }

    pub fn contains_switch(&self, switch_id: RawSaiObjectId) -> bool {
        let found = self.state.lock().switches.contains(switch_id);
        if !found {
            debug_log!(
                "RemoteInterface",
                context = %self.config.name,
                switch_id = %serialize_object_id(switch_id),
                "switch not in this context"
            );
        }
        found
    }

    pub fn switch_ids(&self) -> Vec<RawSaiObjectId> {
        self.state.lock().switches.ids()
    }

    /// Copy of the callbacks registered on a switch.
    pub fn switch_notifications(&self, switch_id: RawSaiObjectId) -> Option<SwitchNotifications> {
        let sw = self.state.lock().switches.get(switch_id)?;
        let notifications = sw.lock().notifications().clone();
        Some(notifications)
    }

    pub fn object_type_query(&self, oid: RawSaiObjectId) -> SaiObjectType {
        vid::object_type_query(oid)
    }

    pub fn switch_id_query(&self, oid: RawSaiObjectId) -> RawSaiObjectId {
        vid::switch_id_query(oid)
    }

    /// Log levels are owned by the remote agent; accepted and ignored.
    pub fn log_set(&self, api: SaiApi, level: SaiLogLevel) -> SaiResult<()> {
        debug_log!("RemoteInterface", api = ?api, level = ?level, "log level set");
        Ok(())
    }

    pub fn query_api_version(&self) -> SaiResult<u64> {
        warn_log!(
            "RemoteInterface",
            version = SAI_API_VERSION,
            "returning the SAI API version of the local headers, not of the remote library"
        );
        Ok(SAI_API_VERSION)
    }

    /// Creates an object addressed by a new handle. For the switch type the
    /// handle is derived from the hardware info attribute.
    pub fn create(
        &self,
        object_type: SaiObjectType,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId> {
        if object_type == SaiObjectType::Switch {
            return self.create_switch(attrs);
        }
        if !object_type.is_object_id_type() {
            return Err(SaiError::invalid_parameter(format!(
                "{} is not addressed by object id",
                object_type
            )));
        }

        let vids = self.vids()?;
        let oid = vids.allocate_new_object_id(object_type, switch_id);
        if oid == NULL_OBJECT_ID {
            error_log!(
                "RemoteInterface",
                object_type = %object_type,
                switch_id = %serialize_object_id(switch_id),
                "failed to allocate object id"
            );
            return Err(SaiError::insufficient_resources(format!(
                "object id for {}",
                object_type
            )));
        }

        match self.create_object(object_type, &ObjectKey::Oid(oid), attrs) {
            Ok(()) => Ok(oid),
            Err(e) => {
                vids.release_object_id(oid);
                Err(e)
            }
        }
    }

    /// Creates an entry-keyed object (FDB, neighbor or route entry).
    pub fn create_entry(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        check_key(object_type, key)?;
        if key.object_id().is_some() {
            return Err(SaiError::invalid_parameter(format!(
                "{} must be created with an entry key",
                object_type
            )));
        }
        self.ensure_initialized()?;
        self.create_object(object_type, key, attrs)
    }

    fn create_switch(&self, attrs: &[SaiAttribute]) -> SaiResult<RawSaiObjectId> {
        let vids = self.vids()?;
        let hwinfo = switch::hardware_info(attrs);
        let switch_id = vids.allocate_new_switch_object_id(&hwinfo);
        if switch_id == NULL_OBJECT_ID {
            error_log!("RemoteInterface", hwinfo = %hwinfo, "switch id allocation failed");
            return Err(SaiError::failure());
        }

        let connect = attrs
            .iter()
            .any(|a| a.id == switch_attr::INIT_SWITCH && a.value == SaiAttributeValue::Bool(false));
        if connect {
            return self.connect_switch(switch_id, attrs);
        }

        self.create_object(SaiObjectType::Switch, &ObjectKey::Oid(switch_id), attrs)?;
        self.state.lock().switches.insert(Switch::new(switch_id, attrs));
        info_log!(
            "RemoteInterface",
            switch_id = %serialize_object_id(switch_id),
            hwinfo = %hwinfo,
            "created switch"
        );
        Ok(switch_id)
    }

    /// Attaches to a switch that already exists on the remote side without
    /// sending a create.
    fn connect_switch(
        &self,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId> {
        let sid = serialize_object_id(switch_id);
        if self.state.lock().switches.contains(switch_id) {
            info_log!("RemoteInterface", switch_id = %sid, "switch already connected");
            return Ok(switch_id);
        }

        self.refresh_table_dump()?;

        let mut state = self.state.lock();
        if !state.table_dump.contains_key(&switch_id) {
            error_log!("RemoteInterface", switch_id = %sid, "switch does not exist on the remote side");
            if let Some(vids) = &state.vids {
                vids.release_object_id(switch_id);
            }
            return Err(SaiError::not_found(format!("switch {}", sid)));
        }
        state.switches.insert(Switch::new(switch_id, attrs));
        info_log!("RemoteInterface", switch_id = %sid, "connected to existing switch");
        Ok(switch_id)
    }

    fn create_object(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        let values = serialize_create_attributes(object_type, attrs)?;
        let key = request_key(object_type, key);
        debug_log!("RemoteInterface", key = %key, attrs = values.len(), "create");
        self.send_set(&key, &values, commands::CREATE)?;
        self.wait_for_response(commands::CREATE)
    }

    /// Removes an object. On success the handle is released and, for a
    /// switch, its registry entry is dropped.
    pub fn remove(&self, object_type: SaiObjectType, key: &ObjectKey) -> SaiResult<()> {
        check_key(object_type, key)?;
        let vids = self.vids()?;

        let k = request_key(object_type, key);
        debug_log!("RemoteInterface", key = %k, "remove");
        self.recorder().record_request(commands::REMOVE, &k, &[]);
        self.with_channel(|ch| ch.del(&k, commands::REMOVE))?;
        self.wait_for_response(commands::REMOVE)?;

        if let Some(oid) = key.object_id() {
            if object_type == SaiObjectType::Switch {
                self.state.lock().switches.remove(oid);
                info_log!("RemoteInterface", switch_id = %serialize_object_id(oid), "removed switch");
            }
            vids.release_object_id(oid);
        }
        Ok(())
    }

    /// Sets one attribute. Switch attributes from the extension range are
    /// executed locally.
    pub fn set(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attr: &SaiAttribute,
    ) -> SaiResult<()> {
        if is_extension_attr(object_type, attr.id) {
            let switch_id = key.object_id().unwrap_or(NULL_OBJECT_ID);
            return self.set_extension(switch_id, attr);
        }
        check_key(object_type, key)?;
        self.ensure_initialized()?;

        let values = serialize_attributes(object_type, std::slice::from_ref(attr), false)?;
        let k = request_key(object_type, key);
        debug_log!("RemoteInterface", key = %k, attr = %values[0].0, "set");
        self.send_set(&k, &values, commands::SET)?;
        self.wait_for_response(commands::SET)?;

        if object_type == SaiObjectType::Switch {
            let switch_id = key.object_id().unwrap_or(NULL_OBJECT_ID);
            let sw = self.state.lock().switches.get(switch_id);
            match sw {
                Some(sw) => sw.lock().update_notifications(std::slice::from_ref(attr)),
                None => panic!(
                    "failed to find switch {} in container",
                    serialize_object_id(switch_id)
                ),
            }
        }
        Ok(())
    }

    /// Reads attributes into the caller's buffers.
    ///
    /// Always waits for the response, whatever the mode. On
    /// `BufferOverflow` only list counts are written back.
    ///
    /// # Panics
    ///
    /// If a success or overflow response carries no values.
    pub fn get(
        &self,
        object_type: SaiObjectType,
        key: &ObjectKey,
        attrs: &mut [SaiAttribute],
    ) -> SaiResult<()> {
        check_key(object_type, key)?;
        self.ensure_initialized()?;

        clear_oid_values(attrs);
        let values = serialize_attributes(object_type, attrs, false)?;
        let k = request_key(object_type, key);
        let record = !self.skip_record.lock().can_skip_recording(object_type, attrs);

        debug_log!("RemoteInterface", key = %k, attrs = values.len(), "get");
        if record {
            self.recorder().record_request(commands::GET, &k, &values);
        }
        self.with_channel(|ch| ch.set(&k, &values, commands::GET))?;
        let response = self.with_channel(|ch| ch.wait(commands::GET_RESPONSE))?;
        if record {
            self.recorder()
                .record_response(commands::GET, response.status, &response.values);
        }

        match response.status {
            SaiStatus::Success => {
                if response.values.is_empty() {
                    panic!("logic error, get response returned 0 values for {}", k);
                }
                let decoded = decode_response_attributes(object_type, &response.values)?;
                transfer_attributes(object_type, &decoded, attrs, false)?;
            }
            SaiStatus::BufferOverflow => {
                if response.values.is_empty() {
                    panic!("logic error, get response returned 0 values for {}", k);
                }
                let decoded = decode_response_attributes(object_type, &response.values)?;
                transfer_attributes(object_type, &decoded, attrs, true)?;
            }
            other => {
                debug_log!("RemoteInterface", key = %k, status = %other, "get failed");
            }
        }
        response.status.into_result()
    }

    /// Fetches the remote object table and groups it by switch.
    pub fn refresh_table_dump(&self) -> SaiResult<()> {
        let reader = self.factory.create_table_reader(&self.config)?;
        let entries = reader.dump()?;

        let mut dump = TableDump::new();
        for (key, values) in entries {
            match switch_of_key(&key) {
                Some(switch_id) => {
                    dump.entry(switch_id).or_default().insert(key, values);
                }
                None => warn_log!("RemoteInterface", key = %key, "skipping undecodable table key"),
            }
        }

        for (switch_id, objects) in &dump {
            info_log!(
                "RemoteInterface",
                switch_id = %serialize_object_id(*switch_id),
                objects = objects.len(),
                "table dump"
            );
        }
        self.state.lock().table_dump = dump;
        Ok(())
    }

    /// Last table dump taken by [`RemoteInterface::refresh_table_dump`].
    pub fn table_dump(&self) -> TableDump {
        self.state.lock().table_dump.clone()
    }

    fn handle_notification(&self, name: &str, payload: &str, values: &[FieldValue]) {
        self.recorder().record_notification(name, payload, values);

        let notification = match Notification::deserialize(name, payload) {
            Ok(n) => n,
            Err(e) => {
                warn_log!("RemoteInterface", name = %name, error = %e, "dropping notification");
                return;
            }
        };
        debug_log!("RemoteInterface", name = %name, "notification received");

        let callbacks = (self.notification_callback)(&notification);
        notification.execute_callback(&callbacks);
    }

    fn notification_handler(&self) -> NotificationHandler {
        let weak = self.weak_self.clone();
        Arc::new(move |name: &str, payload: &str, values: &[FieldValue]| {
            if let Some(this) = weak.upgrade() {
                this.handle_notification(name, payload, values);
            }
        })
    }

    /// Replaces the switch registry and handle allocator. The counter store
    /// is kept, so handles are never reissued.
    fn clear_local_state(&self, state: &mut RemoteState) {
        info_log!("RemoteInterface", guid = self.config.guid, "clearing local state");
        state.switches = SwitchContainer::new();
        state.vids = state.generator.as_ref().map(|generator| {
            Arc::new(VirtualObjectIdManager::new(
                self.config.guid,
                self.config.switches.clone(),
                generator.clone(),
            ))
        });
    }

    fn ensure_initialized(&self) -> SaiResult<()> {
        if self.state.lock().initialized {
            Ok(())
        } else {
            error_log!("RemoteInterface", guid = self.config.guid, "not initialized");
            Err(SaiError::Uninitialized)
        }
    }

    fn vids(&self) -> SaiResult<Arc<VirtualObjectIdManager>> {
        let state = self.state.lock();
        match (&state.vids, state.initialized) {
            (Some(vids), true) => Ok(vids.clone()),
            _ => {
                error_log!("RemoteInterface", guid = self.config.guid, "not initialized");
                Err(SaiError::Uninitialized)
            }
        }
    }

    fn with_channel<T>(&self, f: impl FnOnce(&dyn Channel) -> SaiResult<T>) -> SaiResult<T> {
        let guard = self.channel.read();
        match guard.as_deref() {
            Some(channel) => f(channel),
            None => {
                error_log!("RemoteInterface", guid = self.config.guid, "no communication channel");
                Err(SaiError::Uninitialized)
            }
        }
    }

    fn send_set(&self, key: &str, values: &[FieldValue], command: &str) -> SaiResult<()> {
        self.recorder().record_request(command, key, values);
        self.with_channel(|ch| ch.set(key, values, command))
    }

    /// Waits for `response_command` and records the response under
    /// `command`.
    fn wait_response(&self, command: &str, response_command: &str) -> SaiResult<Response> {
        let response = self.with_channel(|ch| ch.wait(response_command))?;
        self.recorder()
            .record_response(command, response.status, &response.values);
        Ok(response)
    }

    /// In synchronous mode waits for the `getresponse` of a mutating call
    /// and returns its status; in asynchronous mode succeeds immediately.
    fn wait_for_response(&self, command: &str) -> SaiResult<()> {
        if !self.is_sync_mode() {
            return Ok(());
        }
        let response = self.wait_response(command, commands::GET_RESPONSE)?;
        if response.status.is_error() {
            error_log!("RemoteInterface", command = %command, status = %response.status, "remote failure");
        }
        response.status.into_result()
    }
}

fn check_key(object_type: SaiObjectType, key: &ObjectKey) -> SaiResult<()> {
    if key.matches_type(object_type) {
        Ok(())
    } else {
        error_log!("RemoteInterface", object_type = %object_type, key = %key.serialize(), "key does not match object type");
        Err(SaiError::invalid_parameter(format!(
            "key {} cannot address {}",
            key.serialize(),
            object_type
        )))
    }
}

/// Decodes attributes received in a response. Undecodable values mean the
/// two sides disagree on the schema.
fn decode_response_attributes(
    object_type: SaiObjectType,
    values: &[FieldValue],
) -> SaiResult<Vec<SaiAttribute>> {
    deserialize_attributes(object_type, values).map_err(|e| {
        error_log!("RemoteInterface", object_type = %object_type, error = %e, "undecodable response");
        SaiError::internal(format!("{}: {}", object_type, e))
    })
}

/// Owning switch of a table key `"<type>:<oid or entry json>"`.
fn switch_of_key(key: &str) -> Option<RawSaiObjectId> {
    let (_, object) = key.split_once(':')?;
    if let Ok(oid) = deserialize_object_id(object) {
        return Some(vid::switch_id_query(oid)).filter(|s| *s != NULL_OBJECT_ID);
    }
    let entry: serde_json::Value = serde_json::from_str(object).ok()?;
    let switch_id = entry.get("switch_id")?.as_str()?;
    deserialize_object_id(switch_id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_key() {
        assert_eq!(
            request_key(SaiObjectType::Port, &ObjectKey::Oid(0x1000000000123)),
            "SAI_OBJECT_TYPE_PORT:oid:0x1000000000123"
        );
    }

    #[test]
    fn test_switch_of_key() {
        assert_eq!(
            switch_of_key("SAI_OBJECT_TYPE_PORT:oid:0x1000000000123"),
            Some(0x21000000000000)
        );
        assert_eq!(
            switch_of_key("SAI_OBJECT_TYPE_SWITCH:oid:0x21000000000000"),
            Some(0x21000000000000)
        );
        assert_eq!(
            switch_of_key(
                r#"SAI_OBJECT_TYPE_ROUTE_ENTRY:{"dest":"10.0.0.0/24","switch_id":"oid:0x21000000000000","vr":"oid:0x3000000000001"}"#
            ),
            Some(0x21000000000000)
        );
        assert_eq!(switch_of_key("garbage"), None);
        assert_eq!(switch_of_key("SAI_OBJECT_TYPE_PORT:oid:0x0"), None);
    }

    #[test]
    fn test_check_key() {
        assert!(check_key(SaiObjectType::Port, &ObjectKey::Oid(1)).is_ok());
        assert_eq!(
            check_key(SaiObjectType::RouteEntry, &ObjectKey::Oid(1))
                .unwrap_err()
                .status(),
            SaiStatus::InvalidParameter
        );
    }
}
