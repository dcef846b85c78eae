//! Statistics, capability and availability queries, and FDB flush.
//!
//! None of these touch the remote object table; they travel on the request
//! queue and always wait for their dedicated response.

use super::{AttrCapability, RemoteInterface, StatCapability};
use crate::channel::{commands, FieldValue};
use crate::codec::serialize_attributes;
use crate::{debug_log, error_log, info_log};
use sonic_sai::metadata::{attr_metadata, stat_name};
use sonic_sai::{
    serialize_object_id, RawSaiObjectId, SaiAttrId, SaiAttribute, SaiError, SaiList,
    SaiObjectType, SaiResult, SaiStatId, SaiStatus,
};

fn counter_fields(object_type: SaiObjectType, counter_ids: &[SaiStatId]) -> Vec<FieldValue> {
    counter_ids
        .iter()
        .map(|id| match stat_name(object_type, *id) {
            Some(name) => (name.to_string(), String::new()),
            None => panic!("unknown {} statistic id {}", object_type, id),
        })
        .collect()
}

fn parse_count(value: &str) -> SaiResult<u32> {
    value.parse().map_err(|_| {
        error_log!("RemoteInterface", value = %value, "invalid count in response");
        SaiError::failure()
    })
}

fn parse_int_list(value: &str) -> SaiResult<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| {
                error_log!("RemoteInterface", value = %s, "invalid list item in response");
                SaiError::failure()
            })
        })
        .collect()
}

fn expect_values(values: &[FieldValue], expected: usize) -> SaiResult<()> {
    if values.len() == expected {
        return Ok(());
    }
    error_log!(
        "RemoteInterface",
        expected = expected,
        received = values.len(),
        "invalid response from remote agent"
    );
    Err(SaiError::failure())
}

impl RemoteInterface {
    /// Reads counters of an object.
    ///
    /// # Panics
    ///
    /// On a counter id with no name for `object_type`, or if the response
    /// does not carry one value per counter.
    pub fn get_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<u64>> {
        self.ensure_initialized()?;
        let fields = counter_fields(object_type, counter_ids);
        let key = format!("{}:{}", object_type.name(), serialize_object_id(object_id));
        debug_log!("RemoteInterface", key = %key, counters = fields.len(), "get stats");

        self.send_set(&key, &fields, commands::GET_STATS)?;
        let response = self.wait_response(commands::GET_STATS, commands::GET_RESPONSE)?;
        response.status.into_result()?;

        if response.values.len() != counter_ids.len() {
            panic!(
                "wrong number of counters, got {}, expected {}",
                response.values.len(),
                counter_ids.len()
            );
        }
        Ok(response
            .values
            .iter()
            .map(|(name, value)| {
                value
                    .parse()
                    .unwrap_or_else(|_| panic!("invalid value {} for counter {}", value, name))
            })
            .collect())
    }

    pub fn get_stats_ext(
        &self,
        object_type: SaiObjectType,
        _object_id: RawSaiObjectId,
        _counter_ids: &[SaiStatId],
        _mode: i32,
    ) -> SaiResult<Vec<u64>> {
        error_log!("RemoteInterface", object_type = %object_type, "get_stats_ext is not implemented");
        Err(SaiError::not_implemented("get_stats_ext"))
    }

    /// Clears counters of an object.
    pub fn clear_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        counter_ids: &[SaiStatId],
    ) -> SaiResult<()> {
        self.ensure_initialized()?;
        let fields = counter_fields(object_type, counter_ids);
        let key = format!("{}:{}", object_type.name(), serialize_object_id(object_id));
        debug_log!("RemoteInterface", key = %key, counters = fields.len(), "clear stats");

        self.send_set(&key, &fields, commands::CLEAR_STATS)?;
        let response = self.wait_response(commands::CLEAR_STATS, commands::GET_RESPONSE)?;
        response.status.into_result()
    }

    pub fn bulk_get_stats(
        &self,
        object_type: SaiObjectType,
        _object_ids: &[RawSaiObjectId],
        _counter_ids: &[SaiStatId],
    ) -> SaiResult<Vec<Vec<u64>>> {
        error_log!("RemoteInterface", object_type = %object_type, "bulk_get_stats is not implemented");
        Err(SaiError::not_implemented("bulk_get_stats"))
    }

    pub fn bulk_clear_stats(
        &self,
        object_type: SaiObjectType,
        _object_ids: &[RawSaiObjectId],
        _counter_ids: &[SaiStatId],
    ) -> SaiResult<()> {
        error_log!("RemoteInterface", object_type = %object_type, "bulk_clear_stats is not implemented");
        Err(SaiError::not_implemented("bulk_clear_stats"))
    }

    /// Flushes FDB entries of a switch matching the flush attributes.
    pub fn flush_fdb_entries(
        &self,
        switch_id: RawSaiObjectId,
        attrs: &[SaiAttribute],
    ) -> SaiResult<()> {
        self.ensure_initialized()?;
        let values = serialize_attributes(SaiObjectType::FdbFlush, attrs, false)?;
        let key = format!(
            "{}:{}",
            SaiObjectType::FdbFlush.name(),
            serialize_object_id(switch_id)
        );
        info_log!("RemoteInterface", key = %key, fields = values.len(), "flush fdb entries");

        self.send_set(&key, &values, commands::FLUSH)?;
        let response = self.wait_response(commands::FLUSH, commands::FLUSH_RESPONSE)?;
        response.status.into_result()
    }

    /// Number of further objects of `object_type` the switch can hold.
    ///
    /// # Panics
    ///
    /// If a successful response does not carry exactly one value.
    pub fn object_type_get_availability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attrs: &[SaiAttribute],
    ) -> SaiResult<u64> {
        self.ensure_initialized()?;
        let mut entry = serialize_attributes(object_type, attrs, false)?;
        entry.push(("OBJECT_TYPE".to_string(), object_type.name().to_string()));
        let key = serialize_object_id(switch_id);
        debug_log!("RemoteInterface", switch_id = %key, object_type = %object_type, "availability query");

        self.send_set(&key, &entry, commands::OBJECT_TYPE_GET_AVAILABILITY_QUERY)?;
        let response = self.wait_response(
            commands::OBJECT_TYPE_GET_AVAILABILITY_QUERY,
            commands::OBJECT_TYPE_GET_AVAILABILITY_RESPONSE,
        )?;
        response.status.into_result()?;

        if response.values.len() != 1 {
            panic!(
                "invalid availability response: expected 1 value, received {}",
                response.values.len()
            );
        }
        let value = &response.values[0].1;
        value
            .parse()
            .map_err(|_| SaiError::internal(format!("invalid availability count {}", value)))
    }

    /// Which of create, set and get the remote side implements for an
    /// attribute.
    pub fn query_attribute_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
    ) -> SaiResult<AttrCapability> {
        let meta = attr_metadata(object_type, attr_id).ok_or_else(|| {
            error_log!("RemoteInterface", object_type = %object_type, attr_id = attr_id, "no attribute metadata");
            SaiError::invalid_parameter(format!("unknown attribute {} of {}", attr_id, object_type))
        })?;
        self.ensure_initialized()?;

        let entry = vec![
            ("OBJECT_TYPE".to_string(), object_type.name().to_string()),
            ("ATTR_ID".to_string(), meta.name.to_string()),
        ];
        let key = serialize_object_id(switch_id);
        self.send_set(&key, &entry, commands::ATTR_CAPABILITY_QUERY)?;
        let response =
            self.wait_response(commands::ATTR_CAPABILITY_QUERY, commands::ATTR_CAPABILITY_RESPONSE)?;
        response.status.into_result()?;

        expect_values(&response.values, 3)?;
        let implemented = |i: usize| response.values[i].1 == "true";
        let capability = AttrCapability {
            create_implemented: implemented(0),
            set_implemented: implemented(1),
            get_implemented: implemented(2),
        };
        debug_log!("RemoteInterface", attr = %meta.name, capability = ?capability, "attribute capability");
        Ok(capability)
    }

    /// Enum values the remote side supports for an attribute.
    ///
    /// `values.list` is the output buffer. If it is too small the result is
    /// `BufferOverflow` and `values.count` holds the required size.
    pub fn query_attribute_enum_values_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        attr_id: SaiAttrId,
        values: &mut SaiList<i32>,
    ) -> SaiResult<()> {
        values.list.iter_mut().for_each(|v| *v = 0);

        let meta = attr_metadata(object_type, attr_id).ok_or_else(|| {
            error_log!("RemoteInterface", object_type = %object_type, attr_id = attr_id, "no attribute metadata");
            SaiError::invalid_parameter(format!("unknown attribute {} of {}", attr_id, object_type))
        })?;
        self.ensure_initialized()?;

        let entry = vec![
            ("OBJECT_TYPE".to_string(), object_type.name().to_string()),
            ("ATTR_ID".to_string(), meta.name.to_string()),
            ("LIST_SIZE".to_string(), values.list.len().to_string()),
        ];
        let key = serialize_object_id(switch_id);
        self.send_set(&key, &entry, commands::ATTR_ENUM_VALUES_CAPABILITY_QUERY)?;
        let response = self.wait_response(
            commands::ATTR_ENUM_VALUES_CAPABILITY_QUERY,
            commands::ATTR_ENUM_VALUES_CAPABILITY_RESPONSE,
        )?;

        match response.status {
            SaiStatus::Success => {
                expect_values(&response.values, 2)?;
                let items = parse_int_list(&response.values[0].1)?;
                let count = parse_count(&response.values[1].1)?;
                values.count = count;
                for (slot, item) in values.list.iter_mut().zip(items.iter().take(count as usize)) {
                    *slot = *item as i32;
                }
            }
            SaiStatus::BufferOverflow => {
                expect_values(&response.values, 1)?;
                values.count = parse_count(&response.values[0].1)?;
            }
            _ => {}
        }
        response.status.into_result()
    }

    /// Statistics the remote side supports for an object type.
    ///
    /// Same buffer convention as
    /// [`RemoteInterface::query_attribute_enum_values_capability`].
    pub fn query_stats_capability(
        &self,
        switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
        capabilities: &mut SaiList<StatCapability>,
    ) -> SaiResult<()> {
        capabilities
            .list
            .iter_mut()
            .for_each(|c| *c = StatCapability::default());
        self.ensure_initialized()?;

        let entry = vec![
            ("OBJECT_TYPE".to_string(), object_type.name().to_string()),
            ("LIST_SIZE".to_string(), capabilities.list.len().to_string()),
        ];
        let key = serialize_object_id(switch_id);
        self.send_set(&key, &entry, commands::STATS_CAPABILITY_QUERY)?;
        let response = self.wait_response(
            commands::STATS_CAPABILITY_QUERY,
            commands::STATS_CAPABILITY_RESPONSE,
        )?;

        match response.status {
            SaiStatus::Success => {
                expect_values(&response.values, 3)?;
                let enums = parse_int_list(&response.values[0].1)?;
                let modes = parse_int_list(&response.values[1].1)?;
                let count = parse_count(&response.values[2].1)?;
                capabilities.count = count;
                for ((slot, stat_enum), stat_modes) in capabilities
                    .list
                    .iter_mut()
                    .zip(enums.iter().take(count as usize))
                    .zip(modes.iter())
                {
                    *slot = StatCapability {
                        stat_enum: *stat_enum as u32,
                        stat_modes: *stat_modes as u32,
                    };
                }
            }
            SaiStatus::BufferOverflow => {
                expect_values(&response.values, 1)?;
                capabilities.count = parse_count(&response.values[0].1)?;
            }
            _ => {}
        }
        response.status.into_result()
    }

    pub fn query_stats_st_capability(
        &self,
        _switch_id: RawSaiObjectId,
        object_type: SaiObjectType,
    ) -> SaiResult<()> {
        error_log!("RemoteInterface", object_type = %object_type, "query_stats_st_capability is not implemented");
        Err(SaiError::not_implemented("query_stats_st_capability"))
    }
}
