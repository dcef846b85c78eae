//! Local registry of switches created or connected through a context.

use crate::notification::SwitchNotifications;
use crate::{debug_log, warn_log};
use sonic_sai::metadata::switch_attr;
use sonic_sai::{serialize_object_id, RawSaiObjectId, SaiAttribute, SaiAttributeValue};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One switch and the callbacks registered on it.
#[derive(Debug, Clone)]
pub struct Switch {
    switch_id: RawSaiObjectId,
    hardware_info: String,
    notifications: SwitchNotifications,
}

impl Switch {
    /// Builds a switch from its create attributes.
    pub fn new(switch_id: RawSaiObjectId, attrs: &[SaiAttribute]) -> Self {
        let mut sw = Self {
            switch_id,
            hardware_info: hardware_info(attrs),
            notifications: SwitchNotifications::default(),
        };
        sw.update_notifications(attrs);
        sw
    }

    pub fn switch_id(&self) -> RawSaiObjectId {
        self.switch_id
    }

    pub fn hardware_info(&self) -> &str {
        &self.hardware_info
    }

    pub fn notifications(&self) -> &SwitchNotifications {
        &self.notifications
    }

    /// Replaces callbacks named by pointer-typed attributes; other
    /// attributes are ignored.
    pub fn update_notifications(&mut self, attrs: &[SaiAttribute]) {
        for attr in attrs {
            if !matches!(attr.value, SaiAttributeValue::Pointer(_)) {
                continue;
            }
            if self.notifications.update(attr) {
                debug_log!(
                    "Switch",
                    switch_id = %serialize_object_id(self.switch_id),
                    attr_id = attr.id,
                    "updated notification callback"
                );
            }
        }
    }
}

/// Hardware info string from `SWITCH_HARDWARE_INFO`, empty if absent.
pub fn hardware_info(attrs: &[SaiAttribute]) -> String {
    attrs
        .iter()
        .find(|a| a.id == switch_attr::SWITCH_HARDWARE_INFO)
        .and_then(|a| match &a.value {
            SaiAttributeValue::Chardata(s) => Some(s.clone()),
            SaiAttributeValue::S32List(l) => Some(
                l.items()
                    .iter()
                    .map(|c| *c as u8 as char)
                    .take_while(|c| *c != '\0')
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

/// Switches of one context keyed by handle.
#[derive(Debug, Default)]
pub struct SwitchContainer {
    switches: BTreeMap<RawSaiObjectId, Arc<parking_lot::Mutex<Switch>>>,
}

impl SwitchContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a switch. An existing entry with the same handle is
    /// replaced, which happens when a process reconnects after restart.
    pub fn insert(&mut self, switch: Switch) {
        let id = switch.switch_id();
        if self.switches.contains_key(&id) {
            warn_log!(
                "SwitchContainer",
                switch_id = %serialize_object_id(id),
                "switch already registered, replacing"
            );
        }
        self.switches.insert(id, Arc::new(parking_lot::Mutex::new(switch)));
    }

    pub fn remove(&mut self, switch_id: RawSaiObjectId) -> Option<Arc<parking_lot::Mutex<Switch>>> {
        self.switches.remove(&switch_id)
    }

    pub fn get(&self, switch_id: RawSaiObjectId) -> Option<Arc<parking_lot::Mutex<Switch>>> {
        self.switches.get(&switch_id).cloned()
    }

    pub fn contains(&self, switch_id: RawSaiObjectId) -> bool {
        self.switches.contains_key(&switch_id)
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    pub fn ids(&self) -> Vec<RawSaiObjectId> {
        self.switches.keys().copied().collect()
    }
}
