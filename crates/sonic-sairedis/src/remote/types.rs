//! Extension attributes and result types of the remote interface.
//!
//! Switch attributes from the custom range are never sent to the remote
//! agent as generic sets; they are parsed into an [`ExtensionCommand`] and
//! executed locally.

use crate::error_log;
use sonic_sai::metadata::CUSTOM_RANGE_START;
use sonic_sai::{
    RawSaiObjectId, SaiAttrId, SaiAttribute, SaiAttributeValue, SaiError, SaiObjectType,
    SaiPointer, SaiResult, SaiStatus,
};
use std::time::Duration;

/// `SAI_REDIS_SWITCH_ATTR_*` extension attribute ids.
pub mod redis_switch_attr {
    use super::{SaiAttrId, CUSTOM_RANGE_START};

    pub const PERFORM_LOG_ROTATE: SaiAttrId = CUSTOM_RANGE_START;
    pub const RECORD: SaiAttrId = CUSTOM_RANGE_START + 1;
    pub const NOTIFY_SYNCD: SaiAttrId = CUSTOM_RANGE_START + 2;
    pub const USE_TEMP_VIEW: SaiAttrId = CUSTOM_RANGE_START + 3;
    pub const USE_PIPELINE: SaiAttrId = CUSTOM_RANGE_START + 4;
    pub const FLUSH: SaiAttrId = CUSTOM_RANGE_START + 5;
    pub const RECORDING_OUTPUT_DIR: SaiAttrId = CUSTOM_RANGE_START + 6;
    pub const RECORDING_FILENAME: SaiAttrId = CUSTOM_RANGE_START + 7;
    pub const SYNC_MODE: SaiAttrId = CUSTOM_RANGE_START + 8;
    pub const REDIS_COMMUNICATION_MODE: SaiAttrId = CUSTOM_RANGE_START + 9;
    pub const RECORD_STATS: SaiAttrId = CUSTOM_RANGE_START + 10;
    pub const SYNC_OPERATION_RESPONSE_TIMEOUT: SaiAttrId = CUSTOM_RANGE_START + 11;
    pub const CONTEXT: SaiAttrId = CUSTOM_RANGE_START + 12;
    pub const FLEX_COUNTER_GROUP: SaiAttrId = CUSTOM_RANGE_START + 13;
    pub const FLEX_COUNTER: SaiAttrId = CUSTOM_RANGE_START + 14;
}

/// Returns true for switch attributes handled locally.
pub fn is_extension_attr(object_type: SaiObjectType, attr_id: SaiAttrId) -> bool {
    object_type == SaiObjectType::Switch && attr_id >= CUSTOM_RANGE_START
}

/// How requests reach the remote agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommunicationMode {
    /// Pipelined Redis queue; mutating calls do not wait.
    #[default]
    RedisAsync = 0,
    /// Unbuffered Redis queue; every call waits for its response.
    RedisSync = 1,
    /// ZeroMQ request/reply; always synchronous.
    ZmqSync = 2,
}

impl CommunicationMode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(CommunicationMode::RedisAsync),
            1 => Some(CommunicationMode::RedisSync),
            2 => Some(CommunicationMode::ZmqSync),
            _ => None,
        }
    }
}

/// Control requests sent to the remote agent with `notify_syncd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifySyncd {
    InitView = 0,
    ApplyView = 1,
    InspectAsic = 2,
    InvokeDump = 3,
}

impl NotifySyncd {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(NotifySyncd::InitView),
            1 => Some(NotifySyncd::ApplyView),
            2 => Some(NotifySyncd::InspectAsic),
            3 => Some(NotifySyncd::InvokeDump),
            _ => None,
        }
    }

    /// Request key naming the control request.
    pub fn key(self) -> &'static str {
        match self {
            NotifySyncd::InitView => "SAI_REDIS_NOTIFY_SYNCD_INIT_VIEW",
            NotifySyncd::ApplyView => "SAI_REDIS_NOTIFY_SYNCD_APPLY_VIEW",
            NotifySyncd::InspectAsic => "SAI_REDIS_NOTIFY_SYNCD_INSPECT_ASIC",
            NotifySyncd::InvokeDump => "SAI_REDIS_NOTIFY_SYNCD_INVOKE_DUMP",
        }
    }
}

/// Parameters of a flex counter group command.
///
/// Unset fields are not sent. A group with no fields set is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexCounterGroupParams {
    pub counter_group_name: String,
    pub poll_interval: Option<String>,
    pub operation: Option<String>,
    pub stats_mode: Option<String>,
    pub plugin_name: Option<String>,
    pub plugins: Option<String>,
    pub bulk_chunk_size: Option<String>,
    pub bulk_chunk_size_per_prefix: Option<String>,
}

impl FlexCounterGroupParams {
    pub fn new(counter_group_name: impl Into<String>) -> Self {
        Self {
            counter_group_name: counter_group_name.into(),
            ..Default::default()
        }
    }
}

/// Parameters of a flex counter command.
///
/// Without counter ids the counter stops polling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexCounterParams {
    pub counter_key: String,
    pub counter_field_name: Option<String>,
    pub counter_ids: Option<String>,
    pub stats_mode: Option<String>,
}

impl FlexCounterParams {
    pub fn new(counter_key: impl Into<String>) -> Self {
        Self {
            counter_key: counter_key.into(),
            ..Default::default()
        }
    }
}

/// A parsed extension attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionCommand {
    PerformLogRotate(bool),
    Record(bool),
    NotifySyncd(NotifySyncd),
    UseTempView(bool),
    UsePipeline(bool),
    Flush,
    RecordingOutputDir(Option<String>),
    RecordingFilename(Option<String>),
    SyncMode(bool),
    CommunicationMode(CommunicationMode),
    RecordStats(bool),
    ResponseTimeout(Duration),
    Context(u32),
    FlexCounterGroup(FlexCounterGroupParams),
    FlexCounter(FlexCounterParams),
}

fn wrong_type(attr: &SaiAttribute) -> SaiError {
    error_log!(
        "ExtensionCommand",
        attr_id = attr.id,
        value_type = ?attr.value.value_type(),
        "extension attribute has unexpected value type"
    );
    SaiError::invalid_parameter(format!(
        "extension attribute {:#x} has unexpected value type",
        attr.id
    ))
}

fn pointee<T: Clone + 'static>(attr: &SaiAttribute, ptr: &SaiPointer) -> SaiResult<T> {
    ptr.downcast_ref::<T>().cloned().ok_or_else(|| {
        error_log!("ExtensionCommand", attr_id = attr.id, "extension attribute has null or foreign pointer");
        SaiError::failure()
    })
}

fn optional_text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl ExtensionCommand {
    /// Parses an extension attribute.
    ///
    /// # Panics
    ///
    /// On a `REDIS_COMMUNICATION_MODE` value outside the known modes.
    pub fn parse(attr: &SaiAttribute) -> SaiResult<Self> {
        use redis_switch_attr as id;
        use SaiAttributeValue as V;

        let cmd = match (attr.id, &attr.value) {
            (id::PERFORM_LOG_ROTATE, V::Bool(b)) => ExtensionCommand::PerformLogRotate(*b),
            (id::RECORD, V::Bool(b)) => ExtensionCommand::Record(*b),
            (id::NOTIFY_SYNCD, V::S32(raw)) => match NotifySyncd::from_raw(*raw) {
                Some(kind) => ExtensionCommand::NotifySyncd(kind),
                None => {
                    error_log!("ExtensionCommand", value = raw, "invalid notify syncd value");
                    return Err(SaiError::failure());
                }
            },
            (id::USE_TEMP_VIEW, V::Bool(b)) => ExtensionCommand::UseTempView(*b),
            (id::USE_PIPELINE, V::Bool(b)) => ExtensionCommand::UsePipeline(*b),
            (id::FLUSH, _) => ExtensionCommand::Flush,
            (id::RECORDING_OUTPUT_DIR, V::Chardata(s)) => {
                ExtensionCommand::RecordingOutputDir(optional_text(s))
            }
            (id::RECORDING_FILENAME, V::Chardata(s)) => {
                ExtensionCommand::RecordingFilename(optional_text(s))
            }
            (id::SYNC_MODE, V::Bool(b)) => ExtensionCommand::SyncMode(*b),
            (id::REDIS_COMMUNICATION_MODE, V::S32(raw)) => match CommunicationMode::from_raw(*raw)
            {
                Some(mode) => ExtensionCommand::CommunicationMode(mode),
                None => panic!("invalid communication mode value: {}", raw),
            },
            (id::RECORD_STATS, V::Bool(b)) => ExtensionCommand::RecordStats(*b),
            (id::SYNC_OPERATION_RESPONSE_TIMEOUT, V::U64(ms)) => {
                ExtensionCommand::ResponseTimeout(Duration::from_millis(*ms))
            }
            (id::CONTEXT, V::U32(guid)) => ExtensionCommand::Context(*guid),
            (id::FLEX_COUNTER_GROUP, V::Pointer(ptr)) => {
                ExtensionCommand::FlexCounterGroup(pointee(attr, ptr)?)
            }
            (id::FLEX_COUNTER, V::Pointer(ptr)) => ExtensionCommand::FlexCounter(pointee(attr, ptr)?),
            (
                id::PERFORM_LOG_ROTATE
                | id::RECORD
                | id::NOTIFY_SYNCD
                | id::USE_TEMP_VIEW
                | id::USE_PIPELINE
                | id::RECORDING_OUTPUT_DIR
                | id::RECORDING_FILENAME
                | id::SYNC_MODE
                | id::REDIS_COMMUNICATION_MODE
                | id::RECORD_STATS
                | id::SYNC_OPERATION_RESPONSE_TIMEOUT
                | id::CONTEXT
                | id::FLEX_COUNTER_GROUP
                | id::FLEX_COUNTER,
                _,
            ) => return Err(wrong_type(attr)),
            (other, _) => {
                error_log!("ExtensionCommand", attr_id = other, "unknown extension attribute");
                return Err(SaiError::failure());
            }
        };
        Ok(cmd)
    }

    /// The attribute id this command is carried in.
    pub fn attr_id(&self) -> SaiAttrId {
        use redis_switch_attr as id;
        match self {
            ExtensionCommand::PerformLogRotate(_) => id::PERFORM_LOG_ROTATE,
            ExtensionCommand::Record(_) => id::RECORD,
            ExtensionCommand::NotifySyncd(_) => id::NOTIFY_SYNCD,
            ExtensionCommand::UseTempView(_) => id::USE_TEMP_VIEW,
            ExtensionCommand::UsePipeline(_) => id::USE_PIPELINE,
            ExtensionCommand::Flush => id::FLUSH,
            ExtensionCommand::RecordingOutputDir(_) => id::RECORDING_OUTPUT_DIR,
            ExtensionCommand::RecordingFilename(_) => id::RECORDING_FILENAME,
            ExtensionCommand::SyncMode(_) => id::SYNC_MODE,
            ExtensionCommand::CommunicationMode(_) => id::REDIS_COMMUNICATION_MODE,
            ExtensionCommand::RecordStats(_) => id::RECORD_STATS,
            ExtensionCommand::ResponseTimeout(_) => id::SYNC_OPERATION_RESPONSE_TIMEOUT,
            ExtensionCommand::Context(_) => id::CONTEXT,
            ExtensionCommand::FlexCounterGroup(_) => id::FLEX_COUNTER_GROUP,
            ExtensionCommand::FlexCounter(_) => id::FLEX_COUNTER,
        }
    }

    /// Builds the attribute carrying this command.
    pub fn into_attribute(self) -> SaiAttribute {
        use SaiAttributeValue as V;
        let id = self.attr_id();
        let value = match self {
            ExtensionCommand::PerformLogRotate(b)
            | ExtensionCommand::Record(b)
            | ExtensionCommand::UseTempView(b)
            | ExtensionCommand::UsePipeline(b)
            | ExtensionCommand::SyncMode(b)
            | ExtensionCommand::RecordStats(b) => V::Bool(b),
            ExtensionCommand::Flush => V::Bool(true),
            ExtensionCommand::NotifySyncd(kind) => V::S32(kind as i32),
            ExtensionCommand::RecordingOutputDir(s) | ExtensionCommand::RecordingFilename(s) => {
                V::Chardata(s.unwrap_or_default())
            }
            ExtensionCommand::CommunicationMode(mode) => V::S32(mode as i32),
            ExtensionCommand::ResponseTimeout(t) => V::U64(t.as_millis() as u64),
            ExtensionCommand::Context(guid) => V::U32(guid),
            ExtensionCommand::FlexCounterGroup(params) => V::Pointer(SaiPointer::new(params)),
            ExtensionCommand::FlexCounter(params) => V::Pointer(SaiPointer::new(params)),
        };
        SaiAttribute::new(id, value)
    }
}

/// Error handling of a bulk request. Carried for API compatibility; the
/// remote agent applies its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkOpErrorMode {
    #[default]
    StopOnError,
    IgnoreError,
}

/// Result of a bulk request: the overall status, one status per item and,
/// for bulk create, the allocated handles (null for failed items).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub status: SaiStatus,
    pub object_statuses: Vec<SaiStatus>,
    pub object_ids: Vec<RawSaiObjectId>,
}

impl BulkOutcome {
    /// Folds per-item statuses: success only if every item succeeded.
    pub fn from_statuses(object_statuses: Vec<SaiStatus>) -> Self {
        let status = if object_statuses.iter().all(|s| s.is_success()) {
            SaiStatus::Success
        } else {
            SaiStatus::Failure
        };
        let count = object_statuses.len();
        Self {
            status,
            object_statuses,
            object_ids: vec![0; count],
        }
    }

    pub fn into_result(self) -> SaiResult<Vec<SaiStatus>> {
        self.status.into_result()?;
        Ok(self.object_statuses)
    }
}

/// Which operations an attribute supports on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrCapability {
    pub create_implemented: bool,
    pub set_implemented: bool,
    pub get_implemented: bool,
}

/// One supported statistic and the modes it can be read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatCapability {
    pub stat_enum: u32,
    pub stat_modes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extension_range() {
        assert!(is_extension_attr(SaiObjectType::Switch, redis_switch_attr::FLUSH));
        assert!(!is_extension_attr(SaiObjectType::Port, redis_switch_attr::FLUSH));
        assert!(!is_extension_attr(SaiObjectType::Switch, 3));
    }

    #[test]
    fn test_parse_back_from_attribute() {
        let cmds = [
            ExtensionCommand::Record(true),
            ExtensionCommand::NotifySyncd(NotifySyncd::ApplyView),
            ExtensionCommand::CommunicationMode(CommunicationMode::ZmqSync),
            ExtensionCommand::ResponseTimeout(Duration::from_millis(1500)),
            ExtensionCommand::RecordingFilename(None),
            ExtensionCommand::FlexCounter(FlexCounterParams::new("PORT_STAT_COUNTER:oid:0x1")),
        ];
        for cmd in cmds {
            let attr = cmd.clone().into_attribute();
            assert_eq!(ExtensionCommand::parse(&attr).unwrap(), cmd);
        }
    }

    #[test]
    fn test_wrong_value_type_is_invalid_parameter() {
        let attr = SaiAttribute::new(redis_switch_attr::RECORD, SaiAttributeValue::U32(1));
        let err = ExtensionCommand::parse(&attr).unwrap_err();
        assert_eq!(err.status(), SaiStatus::InvalidParameter);
    }

    #[test]
    fn test_unknown_ids_fail() {
        let attr = SaiAttribute::new(CUSTOM_RANGE_START + 99, SaiAttributeValue::Bool(true));
        assert_eq!(ExtensionCommand::parse(&attr).unwrap_err().status(), SaiStatus::Failure);

        let attr = SaiAttribute::new(redis_switch_attr::NOTIFY_SYNCD, SaiAttributeValue::S32(7));
        assert_eq!(ExtensionCommand::parse(&attr).unwrap_err().status(), SaiStatus::Failure);
    }

    #[test]
    fn test_null_flex_counter_pointer_fails() {
        let attr = SaiAttribute::new(
            redis_switch_attr::FLEX_COUNTER_GROUP,
            SaiAttributeValue::Pointer(SaiPointer::null()),
        );
        assert!(ExtensionCommand::parse(&attr).is_err());
    }

    #[test]
    #[should_panic(expected = "invalid communication mode")]
    fn test_bad_communication_mode_panics() {
        let attr = SaiAttribute::new(
            redis_switch_attr::REDIS_COMMUNICATION_MODE,
            SaiAttributeValue::S32(42),
        );
        let _ = ExtensionCommand::parse(&attr);
    }

    #[test]
    fn test_bulk_outcome_folding() {
        let ok = BulkOutcome::from_statuses(vec![SaiStatus::Success; 3]);
        assert_eq!(ok.status, SaiStatus::Success);
        let mixed = BulkOutcome::from_statuses(vec![SaiStatus::Success, SaiStatus::TableFull]);
        assert_eq!(mixed.status, SaiStatus::Failure);
        assert!(mixed.into_result().is_err());
    }
}
