//! Switch notifications.
//!
//! The remote agent publishes notifications as `(name, payload)` pairs where
//! the payload is JSON. Each is decoded into a [`Notification`], routed to
//! the owning switch through [`Notification::any_object_id`], and delivered
//! to the callback registered on that switch.

use crate::warn_log;
use serde::{Deserialize, Serialize};
use sonic_sai::metadata::switch_attr;
use sonic_sai::types::oid_serde;
use sonic_sai::{FdbEntry, RawSaiObjectId, SaiAttribute, SaiAttributeValue, NULL_OBJECT_ID};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const SWITCH_STATE_CHANGE: &str = "switch_state_change";
pub const SWITCH_SHUTDOWN_REQUEST: &str = "switch_shutdown_request";
pub const FDB_EVENT: &str = "fdb_event";
pub const PORT_STATE_CHANGE: &str = "port_state_change";
pub const QUEUE_PFC_DEADLOCK: &str = "queue_deadlock";
pub const BFD_SESSION_STATE_CHANGE: &str = "bfd_session_state_change";

/// Notification decoding failures.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("unknown notification: {0}")]
    UnknownName(String),

    #[error("malformed {name} payload: {source}")]
    Payload {
        name: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchOperStatus {
    #[serde(rename = "SAI_SWITCH_OPER_STATUS_UNKNOWN")]
    Unknown,
    #[serde(rename = "SAI_SWITCH_OPER_STATUS_UP")]
    Up,
    #[serde(rename = "SAI_SWITCH_OPER_STATUS_DOWN")]
    Down,
    #[serde(rename = "SAI_SWITCH_OPER_STATUS_FAILED")]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FdbEventType {
    #[serde(rename = "SAI_FDB_EVENT_LEARNED")]
    Learned,
    #[serde(rename = "SAI_FDB_EVENT_AGED")]
    Aged,
    #[serde(rename = "SAI_FDB_EVENT_MOVE")]
    Move,
    #[serde(rename = "SAI_FDB_EVENT_FLUSHED")]
    Flushed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortOperStatus {
    #[serde(rename = "SAI_PORT_OPER_STATUS_UNKNOWN")]
    Unknown,
    #[serde(rename = "SAI_PORT_OPER_STATUS_UP")]
    Up,
    #[serde(rename = "SAI_PORT_OPER_STATUS_DOWN")]
    Down,
    #[serde(rename = "SAI_PORT_OPER_STATUS_TESTING")]
    Testing,
    #[serde(rename = "SAI_PORT_OPER_STATUS_NOT_PRESENT")]
    NotPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueuePfcDeadlockEventType {
    #[serde(rename = "SAI_QUEUE_PFC_DEADLOCK_EVENT_TYPE_DETECTED")]
    Detected,
    #[serde(rename = "SAI_QUEUE_PFC_DEADLOCK_EVENT_TYPE_RECOVERED")]
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BfdSessionState {
    #[serde(rename = "SAI_BFD_SESSION_STATE_ADMIN_DOWN")]
    AdminDown,
    #[serde(rename = "SAI_BFD_SESSION_STATE_DOWN")]
    Down,
    #[serde(rename = "SAI_BFD_SESSION_STATE_INIT")]
    Init,
    #[serde(rename = "SAI_BFD_SESSION_STATE_UP")]
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdbEventData {
    pub event_type: FdbEventType,
    pub fdb_entry: FdbEntry,
    #[serde(with = "oid_serde", default)]
    pub bridge_port_id: RawSaiObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOperStatusData {
    #[serde(with = "oid_serde")]
    pub port_id: RawSaiObjectId,
    pub port_state: PortOperStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueDeadlockData {
    #[serde(with = "oid_serde")]
    pub queue_id: RawSaiObjectId,
    pub event: QueuePfcDeadlockEventType,
    #[serde(default)]
    pub app_managed_recovery: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BfdSessionStateData {
    #[serde(with = "oid_serde")]
    pub bfd_session_id: RawSaiObjectId,
    pub session_state: BfdSessionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SwitchStatePayload {
    #[serde(with = "oid_serde")]
    switch_id: RawSaiObjectId,
    switch_oper_status: SwitchOperStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SwitchIdPayload {
    #[serde(with = "oid_serde")]
    switch_id: RawSaiObjectId,
}

pub type SwitchStateChangeFn = Arc<dyn Fn(RawSaiObjectId, SwitchOperStatus) + Send + Sync>;
pub type SwitchShutdownRequestFn = Arc<dyn Fn(RawSaiObjectId) + Send + Sync>;
pub type FdbEventFn = Arc<dyn Fn(&[FdbEventData]) + Send + Sync>;
pub type PortStateChangeFn = Arc<dyn Fn(&[PortOperStatusData]) + Send + Sync>;
pub type QueuePfcDeadlockFn = Arc<dyn Fn(&[QueueDeadlockData]) + Send + Sync>;
pub type BfdSessionStateChangeFn = Arc<dyn Fn(&[BfdSessionStateData]) + Send + Sync>;

/// Callbacks registered on one switch.
///
/// Populated from the pointer-typed `*_NOTIFY` switch attributes passed to
/// create and set. A null pointer unregisters the callback.
#[derive(Clone, Default)]
pub struct SwitchNotifications {
    pub on_switch_state_change: Option<SwitchStateChangeFn>,
    pub on_switch_shutdown_request: Option<SwitchShutdownRequestFn>,
    pub on_fdb_event: Option<FdbEventFn>,
    pub on_port_state_change: Option<PortStateChangeFn>,
    pub on_queue_pfc_deadlock: Option<QueuePfcDeadlockFn>,
    pub on_bfd_session_state_change: Option<BfdSessionStateChangeFn>,
}

impl fmt::Debug for SwitchNotifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchNotifications")
            .field("on_switch_state_change", &self.on_switch_state_change.is_some())
            .field("on_switch_shutdown_request", &self.on_switch_shutdown_request.is_some())
            .field("on_fdb_event", &self.on_fdb_event.is_some())
            .field("on_port_state_change", &self.on_port_state_change.is_some())
            .field("on_queue_pfc_deadlock", &self.on_queue_pfc_deadlock.is_some())
            .field("on_bfd_session_state_change", &self.on_bfd_session_state_change.is_some())
            .finish()
    }
}

fn pointee<F: Clone + 'static>(attr: &SaiAttribute) -> Option<Option<F>> {
    let SaiAttributeValue::Pointer(ptr) = &attr.value else {
        return None;
    };
    if ptr.is_null() {
        return Some(None);
    }
    match ptr.downcast_ref::<F>() {
        Some(f) => Some(Some(f.clone())),
        None => {
            warn_log!(
                "SwitchNotifications",
                attr_id = attr.id,
                "pointer attribute does not hold the expected callback type"
            );
            None
        }
    }
}

impl SwitchNotifications {
    /// Applies one switch attribute; returns false if it is not a
    /// notification pointer this type understands.
    pub fn update(&mut self, attr: &SaiAttribute) -> bool {
        macro_rules! apply {
            ($field:ident, $ty:ty) => {
                match pointee::<$ty>(attr) {
                    Some(cb) => {
                        self.$field = cb;
                        true
                    }
                    None => false,
                }
            };
        }

        match attr.id {
            switch_attr::SWITCH_STATE_CHANGE_NOTIFY => {
                apply!(on_switch_state_change, SwitchStateChangeFn)
            }
            switch_attr::SWITCH_SHUTDOWN_REQUEST_NOTIFY => {
                apply!(on_switch_shutdown_request, SwitchShutdownRequestFn)
            }
            switch_attr::FDB_EVENT_NOTIFY => apply!(on_fdb_event, FdbEventFn),
            switch_attr::PORT_STATE_CHANGE_NOTIFY => {
                apply!(on_port_state_change, PortStateChangeFn)
            }
            switch_attr::QUEUE_PFC_DEADLOCK_NOTIFY => {
                apply!(on_queue_pfc_deadlock, QueuePfcDeadlockFn)
            }
            switch_attr::BFD_SESSION_STATE_CHANGE_NOTIFY => {
                apply!(on_bfd_session_state_change, BfdSessionStateChangeFn)
            }
            _ => false,
        }
    }
}

/// A decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    SwitchStateChange {
        switch_id: RawSaiObjectId,
        status: SwitchOperStatus,
    },
    SwitchShutdownRequest {
        switch_id: RawSaiObjectId,
    },
    FdbEvent(Vec<FdbEventData>),
    PortStateChange(Vec<PortOperStatusData>),
    QueuePfcDeadlock(Vec<QueueDeadlockData>),
    BfdSessionStateChange(Vec<BfdSessionStateData>),
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, payload: &str) -> Result<T, NotificationError> {
    serde_json::from_str(payload).map_err(|source| NotificationError::Payload {
        name: name.to_string(),
        source,
    })
}

impl Notification {
    /// Decodes the payload of the notification called `name`.
    pub fn deserialize(name: &str, payload: &str) -> Result<Self, NotificationError> {
        let n = match name {
            SWITCH_STATE_CHANGE => {
                let p: SwitchStatePayload = parse(name, payload)?;
                Notification::SwitchStateChange {
                    switch_id: p.switch_id,
                    status: p.switch_oper_status,
                }
            }
            SWITCH_SHUTDOWN_REQUEST => {
                let p: SwitchIdPayload = parse(name, payload)?;
                Notification::SwitchShutdownRequest {
                    switch_id: p.switch_id,
                }
            }
            FDB_EVENT => Notification::FdbEvent(parse(name, payload)?),
            PORT_STATE_CHANGE => Notification::PortStateChange(parse(name, payload)?),
            QUEUE_PFC_DEADLOCK => Notification::QueuePfcDeadlock(parse(name, payload)?),
            BFD_SESSION_STATE_CHANGE => {
                Notification::BfdSessionStateChange(parse(name, payload)?)
            }
            other => return Err(NotificationError::UnknownName(other.to_string())),
        };
        Ok(n)
    }

    /// Wire name of the notification.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::SwitchStateChange { .. } => SWITCH_STATE_CHANGE,
            Notification::SwitchShutdownRequest { .. } => SWITCH_SHUTDOWN_REQUEST,
            Notification::FdbEvent(_) => FDB_EVENT,
            Notification::PortStateChange(_) => PORT_STATE_CHANGE,
            Notification::QueuePfcDeadlock(_) => QUEUE_PFC_DEADLOCK,
            Notification::BfdSessionStateChange(_) => BFD_SESSION_STATE_CHANGE,
        }
    }

    /// Some object id carried by the notification, used to find the switch
    /// it belongs to. Null if the notification carries none.
    pub fn any_object_id(&self) -> RawSaiObjectId {
        match self {
            Notification::SwitchStateChange { switch_id, .. }
            | Notification::SwitchShutdownRequest { switch_id } => *switch_id,
            Notification::FdbEvent(data) => data
                .iter()
                .flat_map(|d| [d.fdb_entry.switch_id, d.fdb_entry.bvid, d.bridge_port_id])
                .find(|oid| *oid != NULL_OBJECT_ID)
                .unwrap_or(NULL_OBJECT_ID),
            Notification::PortStateChange(data) => first_non_null(data.iter().map(|d| d.port_id)),
            Notification::QueuePfcDeadlock(data) => first_non_null(data.iter().map(|d| d.queue_id)),
            Notification::BfdSessionStateChange(data) => {
                first_non_null(data.iter().map(|d| d.bfd_session_id))
            }
        }
    }

    /// Invokes the matching callback, if registered.
    pub fn execute_callback(&self, callbacks: &SwitchNotifications) {
        match self {
            Notification::SwitchStateChange { switch_id, status } => {
                if let Some(cb) = &callbacks.on_switch_state_change {
                    cb(*switch_id, *status);
                }
            }
            Notification::SwitchShutdownRequest { switch_id } => {
                if let Some(cb) = &callbacks.on_switch_shutdown_request {
                    cb(*switch_id);
                }
            }
            Notification::FdbEvent(data) => {
                if let Some(cb) = &callbacks.on_fdb_event {
                    cb(data);
                }
            }
            Notification::PortStateChange(data) => {
                if let Some(cb) = &callbacks.on_port_state_change {
                    cb(data);
                }
            }
            Notification::QueuePfcDeadlock(data) => {
                if let Some(cb) = &callbacks.on_queue_pfc_deadlock {
                    cb(data);
                }
            }
            Notification::BfdSessionStateChange(data) => {
                if let Some(cb) = &callbacks.on_bfd_session_state_change {
                    cb(data);
                }
            }
        }
    }
}

fn first_non_null(mut ids: impl Iterator<Item = RawSaiObjectId>) -> RawSaiObjectId {
    ids.find(|oid| *oid != NULL_OBJECT_ID)
        .unwrap_or(NULL_OBJECT_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use sonic_sai::SaiPointer;

    #[test]
    fn test_decode_port_state_change() {
        let payload = r#"[{"port_id":"oid:0x1000000000002","port_state":"SAI_PORT_OPER_STATUS_UP"}]"#;
        let n = Notification::deserialize(PORT_STATE_CHANGE, payload).unwrap();
        assert_eq!(
            n,
            Notification::PortStateChange(vec![PortOperStatusData {
                port_id: 0x1000000000002,
                port_state: PortOperStatus::Up,
            }])
        );
        assert_eq!(n.any_object_id(), 0x1000000000002);
        assert_eq!(n.name(), PORT_STATE_CHANGE);
    }

    #[test]
    fn test_decode_fdb_event_prefers_switch_id() {
        let payload = r#"[{"event_type":"SAI_FDB_EVENT_LEARNED",
            "fdb_entry":{"bvid":"oid:0x26000000000001","mac":"00:11:22:33:44:55","switch_id":"oid:0x21000000000000"},
            "bridge_port_id":"oid:0x3a000000000010"}]"#;
        let n = Notification::deserialize(FDB_EVENT, payload).unwrap();
        assert_eq!(n.any_object_id(), 0x21000000000000);
    }

    #[test]
    fn test_decode_switch_state() {
        let payload = r#"{"switch_id":"oid:0x21000000000000","switch_oper_status":"SAI_SWITCH_OPER_STATUS_DOWN"}"#;
        let n = Notification::deserialize(SWITCH_STATE_CHANGE, payload).unwrap();
        assert_eq!(
            n,
            Notification::SwitchStateChange {
                switch_id: 0x21000000000000,
                status: SwitchOperStatus::Down
            }
        );
    }

    #[test]
    fn test_unknown_and_malformed() {
        assert!(matches!(
            Notification::deserialize("bogus", "{}"),
            Err(NotificationError::UnknownName(_))
        ));
        assert!(matches!(
            Notification::deserialize(PORT_STATE_CHANGE, "not json"),
            Err(NotificationError::Payload { .. })
        ));
    }

    #[test]
    fn test_callback_registration_and_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cb: PortStateChangeFn = Arc::new(move |data: &[PortOperStatusData]| {
            sink.lock().extend(data.iter().map(|d| d.port_id));
        });

        let mut callbacks = SwitchNotifications::default();
        let attr = SaiAttribute::new(
            switch_attr::PORT_STATE_CHANGE_NOTIFY,
            SaiAttributeValue::Pointer(SaiPointer::new(cb)),
        );
        assert!(callbacks.update(&attr));

        let n = Notification::PortStateChange(vec![PortOperStatusData {
            port_id: 7,
            port_state: PortOperStatus::Down,
        }]);
        n.execute_callback(&callbacks);
        assert_eq!(*seen.lock(), vec![7]);

        let clear = SaiAttribute::new(
            switch_attr::PORT_STATE_CHANGE_NOTIFY,
            SaiAttributeValue::Pointer(SaiPointer::null()),
        );
        assert!(callbacks.update(&clear));
        assert!(callbacks.on_port_state_change.is_none());
    }

    #[test]
    fn test_wrong_pointee_is_ignored() {
        let mut callbacks = SwitchNotifications::default();
        let attr = SaiAttribute::new(
            switch_attr::FDB_EVENT_NOTIFY,
            SaiAttributeValue::Pointer(SaiPointer::new(42u32)),
        );
        assert!(!callbacks.update(&attr));
        assert!(callbacks.on_fdb_event.is_none());
    }
}
