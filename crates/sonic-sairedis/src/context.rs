//! One context: a configuration and the remote interface serving it.

use crate::channel::ChannelFactory;
use crate::config::ContextConfig;
use crate::recorder::Recorder;
use crate::remote::{NotificationCallback, RemoteInterface};
use crate::{error_log, info_log};
use sonic_sai::SaiResult;
use std::sync::Arc;

/// A context is initialized on construction and uninitialized on drop.
pub struct Context {
    config: Arc<ContextConfig>,
    remote: Arc<RemoteInterface>,
}

impl Context {
    pub fn new(
        config: Arc<ContextConfig>,
        factory: Arc<dyn ChannelFactory>,
        recorder: Arc<dyn Recorder>,
        callback: NotificationCallback,
    ) -> SaiResult<Self> {
        let remote = RemoteInterface::with_notification_callback(config.clone(), factory, callback);
        remote.set_recorder(recorder);
        remote.api_initialize()?;
        info_log!("Context", guid = config.guid, name = %config.name, "context initialized");
        Ok(Self { config, remote })
    }

    pub fn guid(&self) -> u32 {
        self.config.guid
    }

    pub fn config(&self) -> &Arc<ContextConfig> {
        &self.config
    }

    pub fn remote(&self) -> &Arc<RemoteInterface> {
        &self.remote
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !self.remote.is_initialized() {
            return;
        }
        if let Err(e) = self.remote.api_uninitialize() {
            error_log!("Context", guid = self.config.guid, error = %e, "failed to uninitialize");
        }
    }
}
