//! Local execution of extension attributes and `notify_syncd`.

use super::{CommunicationMode, ExtensionCommand, FlexCounterGroupParams, FlexCounterParams};
use super::{NotifySyncd, RemoteInterface};
use crate::channel::{commands, ChannelKind, FieldValue};
use crate::{debug_log, error_log, info_log, warn_log};
use sonic_sai::{serialize_object_id, RawSaiObjectId, SaiAttribute, SaiError, SaiResult};

const POLL_INTERVAL_FIELD: &str = "POLL_INTERVAL";
const BULK_CHUNK_SIZE_FIELD: &str = "BULK_CHUNK_SIZE";
const BULK_CHUNK_SIZE_PER_PREFIX_FIELD: &str = "BULK_CHUNK_SIZE_PER_PREFIX";
const STATS_MODE_FIELD: &str = "STATS_MODE";
const FLEX_COUNTER_STATUS_FIELD: &str = "FLEX_COUNTER_STATUS";

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Field/values of a counter group command, in wire order.
fn counter_group_fields(params: &FlexCounterGroupParams) -> Vec<FieldValue> {
    let mut fields = Vec::new();
    let mut push = |field: &str, value: Option<&str>| {
        if let Some(value) = value {
            fields.push((field.to_string(), value.to_string()));
        }
    };
    push(POLL_INTERVAL_FIELD, present(&params.poll_interval));
    push(BULK_CHUNK_SIZE_FIELD, present(&params.bulk_chunk_size));
    push(
        BULK_CHUNK_SIZE_PER_PREFIX_FIELD,
        present(&params.bulk_chunk_size_per_prefix),
    );
    push(STATS_MODE_FIELD, present(&params.stats_mode));
    if let (Some(name), Some(plugins)) = (present(&params.plugin_name), present(&params.plugins)) {
        push(name, Some(plugins));
    }
    push(FLEX_COUNTER_STATUS_FIELD, present(&params.operation));
    fields
}

/// Field/values of a counter start command; `None` means stop polling.
fn counter_fields(params: &FlexCounterParams) -> Option<Vec<FieldValue>> {
    let field_name = present(&params.counter_field_name)?;
    let ids = present(&params.counter_ids)?;
    let mut fields = vec![(field_name.to_string(), ids.to_string())];
    if let Some(mode) = present(&params.stats_mode) {
        fields.push((STATS_MODE_FIELD.to_string(), mode.to_string()));
    }
    Some(fields)
}

impl RemoteInterface {
    pub(crate) fn set_extension(
        &self,
        switch_id: RawSaiObjectId,
        attr: &SaiAttribute,
    ) -> SaiResult<()> {
        let command = ExtensionCommand::parse(attr)?;
        debug_log!(
            "RemoteInterface",
            switch_id = %serialize_object_id(switch_id),
            command = ?command,
            "extension attribute"
        );

        match command {
            ExtensionCommand::PerformLogRotate(_) => {
                self.recorder().request_log_rotate();
                Ok(())
            }
            ExtensionCommand::Record(enabled) => {
                self.recorder().enable_recording(enabled);
                Ok(())
            }
            ExtensionCommand::RecordStats(enabled) => {
                self.recorder().enable_stats_recording(enabled);
                Ok(())
            }
            ExtensionCommand::RecordingOutputDir(dir) => {
                self.recorder().set_output_dir(dir.as_deref())
            }
            ExtensionCommand::RecordingFilename(name) => {
                self.recorder().set_filename(name.as_deref())
            }
            ExtensionCommand::NotifySyncd(kind) => self.notify_syncd(switch_id, kind),
            ExtensionCommand::UseTempView(enabled) => {
                self.state.lock().use_temp_view = enabled;
                Ok(())
            }
            ExtensionCommand::ResponseTimeout(timeout) => {
                self.state.lock().response_timeout = timeout;
                self.with_channel(|ch| {
                    ch.set_response_timeout(timeout);
                    Ok(())
                })?;
                info_log!("RemoteInterface", timeout_ms = timeout.as_millis() as u64, "response timeout set");
                Ok(())
            }
            ExtensionCommand::SyncMode(enabled) => self.set_sync_mode(enabled),
            ExtensionCommand::UsePipeline(enabled) => {
                if self.is_sync_mode() {
                    warn_log!("RemoteInterface", "use pipeline is not supported in sync mode");
                    return Err(SaiError::not_supported("pipeline in sync mode"));
                }
                self.with_channel(|ch| {
                    ch.set_buffered(enabled);
                    Ok(())
                })
            }
            ExtensionCommand::Flush => self.with_channel(|ch| ch.flush()),
            ExtensionCommand::CommunicationMode(mode) => self.set_communication_mode(mode),
            ExtensionCommand::Context(guid) => {
                error_log!(
                    "RemoteInterface",
                    context = guid,
                    "context attribute is only valid on switch create"
                );
                Err(SaiError::failure())
            }
            ExtensionCommand::FlexCounterGroup(params) => self.flex_counter_group(&params),
            ExtensionCommand::FlexCounter(params) => self.flex_counter(&params),
        }
    }

    fn set_sync_mode(&self, enabled: bool) -> SaiResult<()> {
        warn_log!("RemoteInterface", "sync mode is deprecated, use communication mode");

        let sync = {
            let mut state = self.state.lock();
            state.sync_mode = enabled;
            if self.config.zmq_enable || state.zmq_enabled {
                info_log!("RemoteInterface", "zmq enabled, forcing sync mode");
                state.sync_mode = true;
            }
            state.sync_mode
        };

        if sync {
            info_log!("RemoteInterface", "disabling buffered pipeline in sync mode");
            self.with_channel(|ch| {
                ch.set_buffered(false);
                Ok(())
            })?;
        }
        Ok(())
    }

    /// Replaces the channel with one matching `mode`. The old channel is
    /// stopped before the new one connects.
    fn set_communication_mode(&self, requested: CommunicationMode) -> SaiResult<()> {
        self.ensure_initialized()?;

        let (mode, timeout) = {
            let state = self.state.lock();
            let mode = if self.config.zmq_enable || state.zmq_enabled {
                info_log!("RemoteInterface", "zmq enabled via context config");
                CommunicationMode::ZmqSync
            } else {
                requested
            };
            (mode, state.response_timeout)
        };

        let old = self.channel.write().take();
        drop(old);

        let kind = match mode {
            CommunicationMode::ZmqSync => ChannelKind::ZeroMq,
            CommunicationMode::RedisAsync | CommunicationMode::RedisSync => ChannelKind::Redis,
        };
        let channel = self
            .factory
            .create_channel(kind, &self.config, self.notification_handler())
            .map_err(|e| {
                error_log!("RemoteInterface", mode = ?mode, error = %e, "failed to open channel");
                e
            })?;
        channel.set_response_timeout(timeout);
        channel.set_buffered(mode == CommunicationMode::RedisAsync);

        {
            let mut state = self.state.lock();
            state.communication_mode = mode;
            state.sync_mode = mode != CommunicationMode::RedisAsync;
            if mode == CommunicationMode::ZmqSync {
                state.zmq_enabled = true;
            }
        }
        *self.channel.write() = Some(channel);

        info_log!("RemoteInterface", mode = ?mode, channel = ?kind, "communication mode set");
        Ok(())
    }

    fn flex_counter_group(&self, params: &FlexCounterGroupParams) -> SaiResult<()> {
        if params.counter_group_name.is_empty() {
            error_log!("RemoteInterface", "flex counter group name is empty");
            return Err(SaiError::failure());
        }
        self.ensure_initialized()?;

        let key = params.counter_group_name.as_str();
        let fields = counter_group_fields(params);
        if fields.is_empty() {
            info_log!("RemoteInterface", group = %key, "deleting flex counter group");
            self.recorder()
                .record_request(commands::FLEX_COUNTER_DEL_GROUP, key, &[]);
            self.with_channel(|ch| ch.del(key, commands::FLEX_COUNTER_DEL_GROUP))?;
            self.wait_for_response(commands::FLEX_COUNTER_DEL_GROUP)
        } else {
            info_log!("RemoteInterface", group = %key, fields = fields.len(), "setting flex counter group");
            self.send_set(key, &fields, commands::FLEX_COUNTER_SET_GROUP)?;
            self.wait_for_response(commands::FLEX_COUNTER_SET_GROUP)
        }
    }

    fn flex_counter(&self, params: &FlexCounterParams) -> SaiResult<()> {
        if params.counter_key.is_empty() {
            error_log!("RemoteInterface", "flex counter key is empty");
            return Err(SaiError::failure());
        }
        self.ensure_initialized()?;

        let key = params.counter_key.as_str();
        match counter_fields(params) {
            Some(fields) => {
                debug_log!("RemoteInterface", counter = %key, "start polling");
                self.send_set(key, &fields, commands::FLEX_COUNTER_START_POLL)?;
                self.wait_for_response(commands::FLEX_COUNTER_START_POLL)
            }
            None => {
                debug_log!("RemoteInterface", counter = %key, "stop polling");
                self.recorder()
                    .record_request(commands::FLEX_COUNTER_STOP_POLL, key, &[]);
                self.with_channel(|ch| ch.del(key, commands::FLEX_COUNTER_STOP_POLL))?;
                self.wait_for_response(commands::FLEX_COUNTER_STOP_POLL)
            }
        }
    }

    /// Sends a control request to the remote agent and waits for its
    /// acknowledgement, in every mode.
    ///
    /// A successful `InitView` drops all local switch and handle state;
    /// `ApplyView` leaves init-view mode.
    pub fn notify_syncd(&self, switch_id: RawSaiObjectId, kind: NotifySyncd) -> SaiResult<()> {
        self.ensure_initialized()?;

        let key = kind.key();
        info_log!(
            "RemoteInterface",
            switch_id = %serialize_object_id(switch_id),
            request = %key,
            "sending syncd"
        );
        self.send_set(key, &[], commands::NOTIFY)?;
        let response = self.wait_response(commands::NOTIFY, commands::NOTIFY)?;

        if response.status.is_success() {
            match kind {
                NotifySyncd::InitView => {
                    info_log!("RemoteInterface", "switched to init view mode");
                    let mut state = self.state.lock();
                    state.init_view_mode = true;
                    self.clear_local_state(&mut state);
                }
                NotifySyncd::ApplyView => {
                    info_log!("RemoteInterface", "switched to apply view mode");
                    self.state.lock().init_view_mode = false;
                }
                NotifySyncd::InspectAsic => {
                    info_log!("RemoteInterface", "inspect asic requested");
                }
                NotifySyncd::InvokeDump => {
                    info_log!("RemoteInterface", "dump requested");
                }
            }
        } else {
            error_log!("RemoteInterface", request = %key, status = %response.status, "syncd request failed");
        }
        response.status.into_result()
    }
}
