//! Client runtime of the SAI-over-Redis remote interface.
//!
//! Every SAI call made through this crate is serialized into a
//! `(key, command, field/values)` request and sent to a remote agent
//! (syncd) that owns the hardware. Object handles are allocated locally and
//! encode the context, switch and object type they belong to, so the caller
//! gets an id back before the remote side has applied anything.
//!
//! # Architecture
//!
//! - [`Sai`]: process-wide facade; routes calls to the owning [`Context`]
//!   under one API lock
//! - [`RemoteInterface`]: one context's client; encodes requests, waits for
//!   responses in synchronous mode, executes extension attributes locally
//! - [`channel`]: Redis and ZeroMQ transports behind the [`Channel`] trait
//! - [`vid`]: handle layout and the [`VirtualObjectIdManager`]
//! - [`config`]: context configuration file
//! - [`notification`]: typed notifications and per-switch callbacks
//!
//! # Example
//!
//! ```ignore
//! use sonic_sairedis::{Sai, SaiInterface};
//! use sonic_sai::{metadata::port_attr, SaiAttribute, SaiAttributeValue, SaiObjectType};
//! use std::collections::HashMap;
//!
//! let sai = Sai::default();
//! sai.api_initialize(0, &HashMap::<String, String>::new())?;
//! let switch_id = sai.create(SaiObjectType::Switch, 0, &switch_attrs)?;
//! let port = sai.create(
//!     SaiObjectType::Port,
//!     switch_id,
//!     &[SaiAttribute::new(port_attr::SPEED, SaiAttributeValue::U32(100_000))],
//! )?;
//! ```

pub mod logging;

pub mod channel;
pub mod codec;
pub mod config;
pub mod context;
pub mod interface;
pub mod notification;
pub mod recorder;
pub mod remote;
pub mod sai;
pub mod switch;
pub mod vid;
pub mod vid_index;

pub use channel::{Channel, ChannelFactory, ChannelKind, DefaultChannelFactory, FieldValue, Response};
pub use config::{ContextConfig, ContextConfigContainer, ServiceMethodTable};
pub use context::Context;
pub use interface::SaiInterface;
pub use notification::{Notification, SwitchNotifications};
pub use recorder::{NoopRecorder, Recorder};
pub use remote::{
    AttrCapability, BulkOpErrorMode, BulkOutcome, CommunicationMode, ExtensionCommand,
    FlexCounterGroupParams, FlexCounterParams, NotifySyncd, RemoteInterface, StatCapability,
};
pub use sai::Sai;
pub use vid::VirtualObjectIdManager;
pub use vid_index::{SimpleVidIndexGenerator, VidIndexGenerator};
