//! Context configuration.
//!
//! A process may host several independent contexts, each talking to its own
//! remote agent. The set of contexts comes from a JSON file named by the
//! `SAI_REDIS_CONTEXT_CONFIG` profile key:
//!
//! ```json
//! {
//!   "CONTEXTS": [
//!     {
//!       "guid": 0,
//!       "name": "syncd",
//!       "dbAsic": "ASIC_DB",
//!       "zmq_enable": false,
//!       "zmq_endpoint": "tcp://127.0.0.1:5555",
//!       "zmq_ntf_endpoint": "tcp://127.0.0.1:5556",
//!       "switches": [ { "index": 0, "hwinfo": "" } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Without a file, a single context (guid 0) with one switch (index 0, empty
//! hardware info) is used.

use crate::{debug_log, info_log};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Profile key naming the context configuration file.
pub const SAI_REDIS_KEY_CONTEXT_CONFIG: &str = "SAI_REDIS_CONTEXT_CONFIG";

/// Largest guid that fits the handle's context field.
pub const MAX_GLOBAL_CONTEXT: u32 = 0xff;

/// Largest switch index that fits the handle's switch field.
pub const MAX_SWITCH_INDEX: u32 = 0xff;

const DEFAULT_ZMQ_ENDPOINT: &str = "tcp://127.0.0.1:5555";
const DEFAULT_ZMQ_NTF_ENDPOINT: &str = "tcp://127.0.0.1:5556";
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_ASIC_DB_INDEX: u8 = 1;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse context config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid context config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Accessor for the service profile handed to `api_initialize`.
pub trait ServiceMethodTable: Send + Sync {
    /// Returns the value of a profile variable.
    fn profile_get_value(&self, profile_id: u32, variable: &str) -> Option<String>;
}

impl ServiceMethodTable for HashMap<String, String> {
    fn profile_get_value(&self, _profile_id: u32, variable: &str) -> Option<String> {
        self.get(variable).cloned()
    }
}

/// One switch a context may create or connect to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwitchConfig {
    pub index: u32,
    #[serde(default)]
    pub hwinfo: String,
}

impl SwitchConfig {
    pub fn new(index: u32, hwinfo: impl Into<String>) -> Self {
        Self {
            index,
            hwinfo: hwinfo.into(),
        }
    }
}

/// Switch configurations of one context, indexed by index and hardware info.
#[derive(Debug, Clone, Default)]
pub struct SwitchConfigContainer {
    by_index: BTreeMap<u32, SwitchConfig>,
    by_hwinfo: HashMap<String, u32>,
}

impl SwitchConfigContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a switch, rejecting duplicate indexes and hardware info.
    pub fn insert(&mut self, config: SwitchConfig) -> Result<()> {
        if config.index > MAX_SWITCH_INDEX {
            return Err(ConfigError::Invalid(format!(
                "switch index {} exceeds {}",
                config.index, MAX_SWITCH_INDEX
            )));
        }
        if self.by_index.contains_key(&config.index) {
            return Err(ConfigError::Invalid(format!(
                "switch index {} defined twice",
                config.index
            )));
        }
        if self.by_hwinfo.contains_key(&config.hwinfo) {
            return Err(ConfigError::Invalid(format!(
                "switch hwinfo '{}' defined twice",
                config.hwinfo
            )));
        }
        self.by_hwinfo.insert(config.hwinfo.clone(), config.index);
        self.by_index.insert(config.index, config);
        Ok(())
    }

    pub fn get_by_hwinfo(&self, hwinfo: &str) -> Option<&SwitchConfig> {
        self.by_hwinfo
            .get(hwinfo)
            .and_then(|index| self.by_index.get(index))
    }

    pub fn get_by_index(&self, index: u32) -> Option<&SwitchConfig> {
        self.by_index.get(&index)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SwitchConfig> {
        self.by_index.values()
    }
}

/// Configuration of one context.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub guid: u32,
    pub name: String,
    pub db_asic: String,
    pub zmq_enable: bool,
    pub zmq_endpoint: String,
    pub zmq_ntf_endpoint: String,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u8,
    pub switches: SwitchConfigContainer,
}

impl ContextConfig {
    /// A context with no switches and default endpoints.
    pub fn new(guid: u32, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            db_asic: "ASIC_DB".to_string(),
            zmq_enable: false,
            zmq_endpoint: DEFAULT_ZMQ_ENDPOINT.to_string(),
            zmq_ntf_endpoint: DEFAULT_ZMQ_NTF_ENDPOINT.to_string(),
            redis_host: DEFAULT_REDIS_HOST.to_string(),
            redis_port: DEFAULT_REDIS_PORT,
            redis_db: DEFAULT_ASIC_DB_INDEX,
            switches: SwitchConfigContainer::new(),
        }
    }

    /// Adds a switch (builder style).
    pub fn with_switch(mut self, index: u32, hwinfo: impl Into<String>) -> Result<Self> {
        self.switches.insert(SwitchConfig::new(index, hwinfo))?;
        Ok(self)
    }

    pub fn with_zmq(mut self, enable: bool) -> Self {
        self.zmq_enable = enable;
        self
    }

    /// Redis connection URL of the ASIC database.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }
}

#[derive(Debug, Deserialize)]
struct ContextConfigFile {
    #[serde(rename = "CONTEXTS")]
    contexts: Vec<ContextConfigEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextConfigEntry {
    guid: u32,
    name: String,
    #[serde(rename = "dbAsic")]
    db_asic: String,
    #[serde(default)]
    zmq_enable: bool,
    #[serde(default = "default_zmq_endpoint")]
    zmq_endpoint: String,
    #[serde(default = "default_zmq_ntf_endpoint")]
    zmq_ntf_endpoint: String,
    #[serde(default = "default_redis_host")]
    redis_host: String,
    #[serde(default = "default_redis_port")]
    redis_port: u16,
    #[serde(default = "default_redis_db")]
    redis_db: u8,
    #[serde(default)]
    switches: Vec<SwitchConfig>,
}

fn default_zmq_endpoint() -> String {
    DEFAULT_ZMQ_ENDPOINT.to_string()
}

fn default_zmq_ntf_endpoint() -> String {
    DEFAULT_ZMQ_NTF_ENDPOINT.to_string()
}

fn default_redis_host() -> String {
    DEFAULT_REDIS_HOST.to_string()
}

fn default_redis_port() -> u16 {
    DEFAULT_REDIS_PORT
}

fn default_redis_db() -> u8 {
    DEFAULT_ASIC_DB_INDEX
}

impl TryFrom<ContextConfigEntry> for ContextConfig {
    type Error = ConfigError;

    fn try_from(entry: ContextConfigEntry) -> Result<Self> {
        if entry.guid > MAX_GLOBAL_CONTEXT {
            return Err(ConfigError::Invalid(format!(
                "context guid {} exceeds {}",
                entry.guid, MAX_GLOBAL_CONTEXT
            )));
        }
        let mut switches = SwitchConfigContainer::new();
        for sw in entry.switches {
            switches.insert(sw)?;
        }
        Ok(ContextConfig {
            guid: entry.guid,
            name: entry.name,
            db_asic: entry.db_asic,
            zmq_enable: entry.zmq_enable,
            zmq_endpoint: entry.zmq_endpoint,
            zmq_ntf_endpoint: entry.zmq_ntf_endpoint,
            redis_host: entry.redis_host,
            redis_port: entry.redis_port,
            redis_db: entry.redis_db,
            switches,
        })
    }
}

/// All contexts of the process, keyed by guid.
#[derive(Debug, Clone)]
pub struct ContextConfigContainer {
    contexts: BTreeMap<u32, Arc<ContextConfig>>,
}

impl Default for ContextConfigContainer {
    fn default() -> Self {
        let mut switches = SwitchConfigContainer::new();
        // a single switch on a fresh container cannot collide
        let _ = switches.insert(SwitchConfig::new(0, ""));
        let mut config = ContextConfig::new(0, "syncd");
        config.switches = switches;

        let mut contexts = BTreeMap::new();
        contexts.insert(0, Arc::new(config));
        Self { contexts }
    }
}

impl ContextConfigContainer {
    /// An empty container; use [`ContextConfigContainer::insert`] to fill it.
    pub fn empty() -> Self {
        Self {
            contexts: BTreeMap::new(),
        }
    }

    /// Adds a context, rejecting duplicate guids.
    pub fn insert(&mut self, config: ContextConfig) -> Result<()> {
        if self.contexts.contains_key(&config.guid) {
            return Err(ConfigError::Invalid(format!(
                "context guid {} defined twice",
                config.guid
            )));
        }
        self.contexts.insert(config.guid, Arc::new(config));
        Ok(())
    }

    /// Parses the JSON configuration format.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ContextConfigFile = serde_json::from_str(json)?;
        let mut container = Self::empty();
        for entry in file.contexts {
            let config = ContextConfig::try_from(entry)?;
            debug_log!(
                "ContextConfig",
                guid = config.guid,
                name = %config.name,
                switches = config.switches.len(),
                "loaded context"
            );
            container.insert(config)?;
        }
        if container.contexts.is_empty() {
            return Err(ConfigError::Invalid("no contexts defined".to_string()));
        }
        Ok(container)
    }

    /// Loads the configuration file, or the default when no path is given.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info_log!("ContextConfig", "no context config file given, using default");
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let container = Self::from_json(&json)?;
        info_log!(
            "ContextConfig",
            path = %path.display(),
            contexts = container.len(),
            "loaded context config"
        );
        Ok(container)
    }

    pub fn get(&self, guid: u32) -> Option<&Arc<ContextConfig>> {
        self.contexts.get(&guid)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ContextConfig>> {
        self.contexts.values()
    }
}
