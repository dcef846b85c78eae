//! Hooks for a recording collaborator.
//!
//! The remote interface reports every request, response and notification
//! to a [`Recorder`]. The default implementation records nothing; a real
//! recorder (writing `sairedis.rec` style logs) plugs in through
//! [`crate::RemoteInterface::set_recorder`].

use crate::channel::FieldValue;
use sonic_sai::metadata::switch_attr;
use sonic_sai::{SaiAttrId, SaiAttribute, SaiObjectType, SaiResult, SaiStatus};
use std::collections::HashSet;

pub trait Recorder: Send + Sync {
    fn record_request(&self, _command: &str, _key: &str, _values: &[FieldValue]) {}

    fn record_response(&self, _command: &str, _status: SaiStatus, _values: &[FieldValue]) {}

    fn record_notification(&self, _name: &str, _payload: &str, _values: &[FieldValue]) {}

    fn enable_recording(&self, _enabled: bool) {}

    fn enable_stats_recording(&self, _enabled: bool) {}

    fn request_log_rotate(&self) {}

    /// `None` restores the default directory.
    fn set_output_dir(&self, _dir: Option<&str>) -> SaiResult<()> {
        Ok(())
    }

    /// `None` restores the default file name.
    fn set_filename(&self, _filename: Option<&str>) -> SaiResult<()> {
        Ok(())
    }
}

/// Recorder that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {}

/// Attributes whose gets are polled periodically and not worth recording.
#[derive(Debug, Clone)]
pub struct SkipRecordAttrContainer {
    skip: HashSet<(SaiObjectType, SaiAttrId)>,
}

impl Default for SkipRecordAttrContainer {
    fn default() -> Self {
        let skip = [
            switch_attr::AVAILABLE_IPV4_ROUTE_ENTRY,
            switch_attr::AVAILABLE_IPV6_ROUTE_ENTRY,
            switch_attr::AVAILABLE_IPV4_NEXTHOP_ENTRY,
            switch_attr::AVAILABLE_IPV4_NEIGHBOR_ENTRY,
            switch_attr::AVAILABLE_FDB_ENTRY,
        ]
        .into_iter()
        .map(|id| (SaiObjectType::Switch, id))
        .collect();
        Self { skip }
    }
}

impl SkipRecordAttrContainer {
    pub fn add(&mut self, object_type: SaiObjectType, attr_id: SaiAttrId) -> bool {
        self.skip.insert((object_type, attr_id))
    }

    pub fn remove(&mut self, object_type: SaiObjectType, attr_id: SaiAttrId) -> bool {
        self.skip.remove(&(object_type, attr_id))
    }

    /// True if every attribute of a get is on the skip list.
    pub fn can_skip_recording(&self, object_type: SaiObjectType, attrs: &[SaiAttribute]) -> bool {
        !attrs.is_empty()
            && attrs
                .iter()
                .all(|a| self.skip.contains(&(object_type, a.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_sai::metadata::port_attr;
    use sonic_sai::SaiAttributeValue;

    fn attr(id: SaiAttrId) -> SaiAttribute {
        SaiAttribute::new(id, SaiAttributeValue::U32(0))
    }

    #[test]
    fn test_resource_polls_are_skipped() {
        let c = SkipRecordAttrContainer::default();
        assert!(c.can_skip_recording(
            SaiObjectType::Switch,
            &[attr(switch_attr::AVAILABLE_FDB_ENTRY), attr(switch_attr::AVAILABLE_IPV4_ROUTE_ENTRY)]
        ));
        assert!(!c.can_skip_recording(
            SaiObjectType::Switch,
            &[attr(switch_attr::AVAILABLE_FDB_ENTRY), attr(switch_attr::PORT_LIST)]
        ));
        assert!(!c.can_skip_recording(SaiObjectType::Switch, &[]));
    }

    #[test]
    fn test_add_remove() {
        let mut c = SkipRecordAttrContainer::default();
        assert!(c.add(SaiObjectType::Port, port_attr::OPER_STATUS));
        assert!(c.can_skip_recording(SaiObjectType::Port, &[attr(port_attr::OPER_STATUS)]));
        assert!(c.remove(SaiObjectType::Port, port_attr::OPER_STATUS));
        assert!(!c.remove(SaiObjectType::Port, port_attr::OPER_STATUS));
    }
}
