//! Communication channels to the remote agent.
//!
//! A channel carries `(key, command, field/values)` requests to the remote
//! side, waits for correlated responses by command kind, and delivers
//! notifications to a handler on a background thread it owns.
//!
//! Two transports exist: [`RedisChannel`] (producer/consumer queues in the
//! ASIC database, supports pipelining) and, with the `zmq` feature,
//! [`ZeroMqChannel`] (request/reply sockets, always synchronous). The
//! [`ChannelFactory`] seam decides which one a context gets.

mod redis_channel;
#[cfg(feature = "zmq")]
mod zmq_channel;

pub use redis_channel::{RedisAsicStateTable, RedisChannel};
#[cfg(feature = "zmq")]
pub use zmq_channel::ZeroMqChannel;

use crate::config::ContextConfig;
use crate::vid_index::{RedisVidIndexGenerator, VidIndexGenerator};
use sonic_sai::{SaiError, SaiResult, SaiStatus};
use std::sync::Arc;
use std::time::Duration;

/// A field/value pair.
pub type FieldValue = (String, String);

/// Default bound on a synchronous wait.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Command kinds tagging requests and responses.
pub mod commands {
    pub const CREATE: &str = "create";
    pub const REMOVE: &str = "remove";
    pub const SET: &str = "set";
    pub const GET: &str = "get";
    pub const GET_RESPONSE: &str = "getresponse";

    pub const BULK_CREATE: &str = "bulkcreate";
    pub const BULK_REMOVE: &str = "bulkremove";
    pub const BULK_SET: &str = "bulkset";
    pub const BULK_GET: &str = "bulkget";

    pub const NOTIFY: &str = "notify";

    pub const GET_STATS: &str = "get_stats";
    pub const CLEAR_STATS: &str = "clear_stats";

    pub const FLUSH: &str = "flush";
    pub const FLUSH_RESPONSE: &str = "flushresponse";

    pub const ATTR_CAPABILITY_QUERY: &str = "attribute_capability_query";
    pub const ATTR_CAPABILITY_RESPONSE: &str = "attribute_capability_response";
    pub const ATTR_ENUM_VALUES_CAPABILITY_QUERY: &str = "attr_enum_values_capability_query";
    pub const ATTR_ENUM_VALUES_CAPABILITY_RESPONSE: &str = "attr_enum_values_capability_response";
    pub const OBJECT_TYPE_GET_AVAILABILITY_QUERY: &str = "object_type_get_availability_query";
    pub const OBJECT_TYPE_GET_AVAILABILITY_RESPONSE: &str =
        "object_type_get_availability_response";
    pub const STATS_CAPABILITY_QUERY: &str = "stats_capability_query";
    pub const STATS_CAPABILITY_RESPONSE: &str = "stats_capability_response";

    pub const FLEX_COUNTER_START_POLL: &str = "start_poll";
    pub const FLEX_COUNTER_STOP_POLL: &str = "stop_poll";
    pub const FLEX_COUNTER_SET_GROUP: &str = "set_counter_group";
    pub const FLEX_COUNTER_DEL_GROUP: &str = "del_counter_group";
}

/// Key, command and field/values of one message.
///
/// On the wire a message is the JSON array `[key, op, f1, v1, f2, v2, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOpFieldsValues {
    pub key: String,
    pub op: String,
    pub fvs: Vec<FieldValue>,
}

impl KeyOpFieldsValues {
    pub fn new(key: impl Into<String>, op: impl Into<String>, fvs: Vec<FieldValue>) -> Self {
        Self {
            key: key.into(),
            op: op.into(),
            fvs,
        }
    }

    /// Returns the value for a field, if present.
    pub fn get_field(&self, field: &str) -> Option<&str> {
        self.fvs
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_json(&self) -> String {
        let mut items = Vec::with_capacity(2 + self.fvs.len() * 2);
        items.push(self.key.as_str());
        items.push(self.op.as_str());
        for (f, v) in &self.fvs {
            items.push(f.as_str());
            items.push(v.as_str());
        }
        serde_json::Value::from(items).to_string()
    }

    pub fn from_json(json: &str) -> SaiResult<Self> {
        let data: Vec<String> = serde_json::from_str(json)
            .map_err(|e| SaiError::transport(format!("malformed message {}: {}", json, e)))?;
        Self::from_parts(&data)
    }

    fn from_parts(data: &[String]) -> SaiResult<Self> {
        if data.len() < 2 || data.len() % 2 != 0 {
            return Err(SaiError::transport(format!(
                "message must have key, operation and field/value pairs, got {} items",
                data.len()
            )));
        }
        let fvs = data[2..]
            .chunks_exact(2)
            .map(|fv| (fv[0].clone(), fv[1].clone()))
            .collect();
        Ok(Self::new(data[0].clone(), data[1].clone(), fvs))
    }
}

/// A decoded response: the remote status and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: SaiStatus,
    pub values: Vec<FieldValue>,
}

impl Response {
    pub fn new(status: SaiStatus, values: Vec<FieldValue>) -> Self {
        Self { status, values }
    }

    /// Decodes a response message whose key is the status name.
    pub fn from_message(msg: KeyOpFieldsValues) -> SaiResult<Self> {
        let status = msg
            .key
            .parse::<SaiStatus>()
            .map_err(|e| SaiError::transport(e.to_string()))?;
        Ok(Self::new(status, msg.fvs))
    }
}

/// Handler invoked on the channel's thread for every notification:
/// `(name, payload, values)`.
pub type NotificationHandler = Arc<dyn Fn(&str, &str, &[FieldValue]) + Send + Sync>;

/// Transport to the remote agent.
///
/// All methods take `&self`; implementations guard their own state.
pub trait Channel: Send + Sync {
    fn set(&self, key: &str, values: &[FieldValue], command: &str) -> SaiResult<()>;

    fn del(&self, key: &str, command: &str) -> SaiResult<()>;

    /// Transmits any buffered requests.
    fn flush(&self) -> SaiResult<()>;

    /// Blocks until a response tagged `command` arrives or the response
    /// timeout expires ([`SaiError::Timeout`]).
    fn wait(&self, command: &str) -> SaiResult<Response>;

    fn set_buffered(&self, buffered: bool);

    fn is_buffered(&self) -> bool;

    fn set_response_timeout(&self, timeout: Duration);

    fn response_timeout(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Redis,
    ZeroMq,
}

/// Snapshot of the remote object table.
pub trait AsicStateTable: Send + Sync {
    /// Returns every object as `("<object type>:<serialized key>", attrs)`.
    fn dump(&self) -> SaiResult<Vec<(String, Vec<FieldValue>)>>;
}

/// Builds the transport-facing collaborators of a context.
pub trait ChannelFactory: Send + Sync {
    fn create_channel(
        &self,
        kind: ChannelKind,
        config: &ContextConfig,
        handler: NotificationHandler,
    ) -> SaiResult<Box<dyn Channel>>;

    fn create_vid_index_generator(
        &self,
        config: &ContextConfig,
    ) -> SaiResult<Arc<dyn VidIndexGenerator>>;

    fn create_table_reader(&self, config: &ContextConfig) -> SaiResult<Box<dyn AsicStateTable>>;
}

/// Production factory: Redis for everything, ZeroMQ when built with the
/// `zmq` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultChannelFactory;

impl ChannelFactory for DefaultChannelFactory {
    fn create_channel(
        &self,
        kind: ChannelKind,
        config: &ContextConfig,
        handler: NotificationHandler,
    ) -> SaiResult<Box<dyn Channel>> {
        match kind {
            ChannelKind::Redis => Ok(Box::new(RedisChannel::connect(config, handler)?)),
            #[cfg(feature = "zmq")]
            ChannelKind::ZeroMq => Ok(Box::new(ZeroMqChannel::connect(config, handler)?)),
            #[cfg(not(feature = "zmq"))]
            ChannelKind::ZeroMq => Err(SaiError::not_supported(
                "ZeroMQ channel (built without the zmq feature)",
            )),
        }
    }

    fn create_vid_index_generator(
        &self,
        config: &ContextConfig,
    ) -> SaiResult<Arc<dyn VidIndexGenerator>> {
        Ok(Arc::new(RedisVidIndexGenerator::connect(&config.redis_url())?))
    }

    fn create_table_reader(&self, config: &ContextConfig) -> SaiResult<Box<dyn AsicStateTable>> {
        Ok(Box::new(RedisAsicStateTable::new(&config.redis_url())?))
    }
}
