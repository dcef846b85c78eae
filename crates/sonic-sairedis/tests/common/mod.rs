//! In-memory channel factory for driving a context without a remote agent.
//!
//! Requests are recorded, responses are scripted ahead of the call that
//! waits for them and notifications are injected through the handler the
//! interface registered on its channel.

#![allow(dead_code)]

use parking_lot::Mutex;
use sonic_sai::{SaiError, SaiResult, SaiStatus};
use sonic_sairedis::channel::{
    AsicStateTable, Channel, ChannelFactory, ChannelKind, FieldValue, KeyOpFieldsValues,
    NotificationHandler, Response, DEFAULT_RESPONSE_TIMEOUT,
};
use sonic_sairedis::config::ContextConfig;
use sonic_sairedis::vid_index::{SimpleVidIndexGenerator, VidIndexGenerator};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub fn fv(field: &str, value: &str) -> FieldValue {
    (field.to_string(), value.to_string())
}

/// Everything the mock channels saw, plus what they will answer.
pub struct MockState {
    pub requests: Vec<KeyOpFieldsValues>,
    pub waits: Vec<String>,
    pub flushes: usize,
    pub channels: Vec<ChannelKind>,
    pub buffered: bool,
    pub response_timeout: Duration,
    pub handler: Option<NotificationHandler>,
    pub responses: VecDeque<(String, Response)>,
    pub response_delay: Option<Duration>,
    pub table: Vec<(String, Vec<FieldValue>)>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            waits: Vec::new(),
            flushes: 0,
            channels: Vec::new(),
            buffered: false,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            handler: None,
            responses: VecDeque::new(),
            response_delay: None,
            table: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct MockChannelFactory {
    pub state: Arc<Mutex<MockState>>,
    pub generator: Arc<SimpleVidIndexGenerator>,
}

impl Default for MockChannelFactory {
    fn default() -> Self {
        Self::with_generator(SimpleVidIndexGenerator::new())
    }
}

impl MockChannelFactory {
    pub fn with_generator(generator: SimpleVidIndexGenerator) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            generator: Arc::new(generator),
        }
    }

    /// Queues a response for the next wait on `command`.
    pub fn respond(&self, command: &str, status: SaiStatus, values: Vec<FieldValue>) {
        self.state
            .lock()
            .responses
            .push_back((command.to_string(), Response::new(status, values)));
    }

    /// Every wait sleeps this long before looking for its response.
    pub fn delay_responses(&self, delay: Duration) {
        self.state.lock().response_delay = Some(delay);
    }

    pub fn set_table(&self, table: Vec<(String, Vec<FieldValue>)>) {
        self.state.lock().table = table;
    }

    pub fn requests(&self) -> Vec<KeyOpFieldsValues> {
        self.state.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<KeyOpFieldsValues> {
        self.state.lock().requests.last().cloned()
    }

    pub fn pending_responses(&self) -> usize {
        self.state.lock().responses.len()
    }

    pub fn waits(&self) -> Vec<String> {
        self.state.lock().waits.clone()
    }

    pub fn channels(&self) -> Vec<ChannelKind> {
        self.state.lock().channels.clone()
    }

    pub fn is_buffered(&self) -> bool {
        self.state.lock().buffered
    }

    /// Delivers a notification on the calling thread, as the channel's
    /// listener would.
    pub fn notify(&self, name: &str, payload: &str) {
        let handler = self.state.lock().handler.clone();
        if let Some(handler) = handler {
            handler(name, payload, &[]);
        }
    }
}

pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl Channel for MockChannel {
    fn set(&self, key: &str, values: &[FieldValue], command: &str) -> SaiResult<()> {
        self.state
            .lock()
            .requests
            .push(KeyOpFieldsValues::new(key, command, values.to_vec()));
        Ok(())
    }

    fn del(&self, key: &str, command: &str) -> SaiResult<()> {
        self.state
            .lock()
            .requests
            .push(KeyOpFieldsValues::new(key, command, Vec::new()));
        Ok(())
    }

    fn flush(&self) -> SaiResult<()> {
        self.state.lock().flushes += 1;
        Ok(())
    }

    fn wait(&self, command: &str) -> SaiResult<Response> {
        let delay = self.state.lock().response_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut state = self.state.lock();
        state.waits.push(command.to_string());
        let pos = state.responses.iter().position(|(c, _)| c == command);
        match pos.and_then(|i| state.responses.remove(i)) {
            Some((_, response)) => Ok(response),
            None => Err(SaiError::Timeout {
                command: command.to_string(),
                timeout_ms: state.response_timeout.as_millis() as u64,
            }),
        }
    }

    fn set_buffered(&self, buffered: bool) {
        self.state.lock().buffered = buffered;
    }

    fn is_buffered(&self) -> bool {
        self.state.lock().buffered
    }

    fn set_response_timeout(&self, timeout: Duration) {
        self.state.lock().response_timeout = timeout;
    }

    fn response_timeout(&self) -> Duration {
        self.state.lock().response_timeout
    }
}

pub struct MockTable {
    state: Arc<Mutex<MockState>>,
}

impl AsicStateTable for MockTable {
    fn dump(&self) -> SaiResult<Vec<(String, Vec<FieldValue>)>> {
        Ok(self.state.lock().table.clone())
    }
}

impl ChannelFactory for MockChannelFactory {
    fn create_channel(
        &self,
        kind: ChannelKind,
        _config: &ContextConfig,
        handler: NotificationHandler,
    ) -> SaiResult<Box<dyn Channel>> {
        let mut state = self.state.lock();
        state.channels.push(kind);
        state.buffered = false;
        state.response_timeout = DEFAULT_RESPONSE_TIMEOUT;
        state.handler = Some(handler);
        Ok(Box::new(MockChannel {
            state: self.state.clone(),
        }))
    }

    fn create_vid_index_generator(
        &self,
        _config: &ContextConfig,
    ) -> SaiResult<Arc<dyn VidIndexGenerator>> {
        Ok(self.generator.clone())
    }

    fn create_table_reader(&self, _config: &ContextConfig) -> SaiResult<Box<dyn AsicStateTable>> {
        Ok(Box::new(MockTable {
            state: self.state.clone(),
        }))
    }
}
